use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Sampling gave up after {attempts} attempts in {stage}")]
    SamplingExhausted { attempts: u64, stage: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;
