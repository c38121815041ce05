// ─────────────────────────────────────────────────────────────────────
// SCPN Particle Source — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{SourceError, SourceResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key-value options of one particle source.
///
/// Values are kept as whitespace-delimited strings and parsed on demand.
/// Relative file paths (`STLfile`) resolve against `base_dir`, the directory
/// of the configuration file, never against the process working directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceConfig {
    entries: BTreeMap<String, String>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl SourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used heavily by tests and programmatic setups.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Parse a JSON object. Numbers, booleans and arrays are flattened to the
    /// string form the key-value interface expects.
    pub fn from_json_str(text: &str, base_dir: impl Into<PathBuf>) -> SourceResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(SourceError::ConfigError(
                "source configuration must be a JSON object".to_string(),
            ));
        };
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            let text = value_to_string(&key, &value)?;
            entries.insert(key, text);
        }
        Ok(SourceConfig {
            entries,
            base_dir: base_dir.into(),
        })
    }

    /// Load from a JSON file; `base_dir` becomes the file's parent directory.
    pub fn from_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json_str(&contents, base_dir)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// First token of `key` as a number, or `default` when absent/blank.
    pub fn f64_or(&self, key: &str, default: f64) -> SourceResult<f64> {
        match self.first_token(key) {
            None => Ok(default),
            Some(token) => parse_number(key, token),
        }
    }

    pub fn u64_or(&self, key: &str, default: u64) -> SourceResult<u64> {
        match self.first_token(key) {
            None => Ok(default),
            Some(token) => token.parse::<u64>().map_err(|_| {
                SourceError::ConfigError(format!(
                    "{key}: expected a non-negative integer, got '{token}'"
                ))
            }),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> SourceResult<bool> {
        let Some(token) = self.first_token(key) else {
            return Ok(default);
        };
        match token.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(SourceError::ConfigError(format!(
                "{key}: expected a boolean, got '{token}'"
            ))),
        }
    }

    /// All whitespace-delimited numbers of `key`; empty when absent.
    pub fn numbers(&self, key: &str) -> SourceResult<Vec<f64>> {
        self.get(key)
            .map(|text| {
                text.split_whitespace()
                    .map(|token| parse_number(key, token))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// The first `count` values of the shape-specific `parameters` list.
    pub fn parameters(&self, count: usize) -> SourceResult<Vec<f64>> {
        let values = self.numbers("parameters")?;
        if values.len() < count {
            return Err(SourceError::ConfigError(format!(
                "parameters: expected {count} numbers, found {}",
                values.len()
            )));
        }
        Ok(values[..count].to_vec())
    }

    /// Resolve a file path option relative to the configuration directory.
    pub fn resolve_path(&self, key: &str) -> SourceResult<PathBuf> {
        let token = self
            .first_token(key)
            .ok_or_else(|| SourceError::ConfigError(format!("{key} is not set")))?;
        let path = self.base_dir.join(token);
        if !path.is_file() {
            return Err(SourceError::ConfigError(format!(
                "{key}: file {} not found",
                path.display()
            )));
        }
        Ok(path)
    }

    fn first_token(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|text| text.split_whitespace().next())
    }
}

fn parse_number(key: &str, token: &str) -> SourceResult<f64> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SourceError::ConfigError(format!(
            "{key}: malformed number '{token}'"
        ))),
    }
}

fn value_to_string(key: &str, value: &Value) -> SourceResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| value_to_string(key, item))
                .collect::<SourceResult<Vec<_>>>()?;
            Ok(parts.join(" "))
        }
        Value::Object(_) => Err(SourceError::ConfigError(format!(
            "{key}: nested objects are not supported"
        ))),
    }
}
