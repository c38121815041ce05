//! Configuration-driven construction of particle sources.

use crate::source::{ParticleSource, SourceKind, SurfaceRegion, SurfaceSource, VolumeSource};
use crate::volume::{Cuboid, CylindricalVolume, StlVolume, VolumeShape};
use source_geometry::stl::read_stl;
use source_geometry::Geometry;
use source_types::config::SourceConfig;
use source_types::error::{SourceError, SourceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    CuboidVolume,
    CylindricalVolume,
    CylindricalSurface,
    StlVolume,
    StlSurface,
}

impl SourceTag {
    /// Case-insensitive; accepts both the short config names and the long
    /// class-style names.
    pub fn parse(tag: &str) -> SourceResult<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "boxvolume" | "cuboidvolumesource" => Ok(SourceTag::CuboidVolume),
            "cylvolume" | "cylindricalvolumesource" => Ok(SourceTag::CylindricalVolume),
            "cylsurface" | "cylindricalsurfacesource" => Ok(SourceTag::CylindricalSurface),
            "stlvolume" | "stlvolumesource" => Ok(SourceTag::StlVolume),
            "stlsurface" | "stlsurfacesource" => Ok(SourceTag::StlSurface),
            _ => Err(SourceError::ConfigError(format!(
                "unknown source type '{tag}'"
            ))),
        }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, SourceTag::CylindricalSurface | SourceTag::StlSurface)
    }
}

/// Build the source named by `tag` from its configuration block.
///
/// `geometry` is only read by surface sources, which select their emitting
/// triangles from it once here.
pub fn create_particle_source<G: Geometry + ?Sized>(
    tag: &str,
    config: &SourceConfig,
    geometry: &G,
) -> SourceResult<ParticleSource> {
    let tag = SourceTag::parse(tag)?;
    let kind = match tag {
        SourceTag::CuboidVolume => volume(VolumeShape::Cuboid(Cuboid::from_config(config)?), config)?,
        SourceTag::CylindricalVolume => volume(
            VolumeShape::Cylindrical(CylindricalVolume::from_config(config)?),
            config,
        )?,
        SourceTag::StlVolume => {
            let mesh = read_stl(config.resolve_path("STLfile")?)?;
            volume(VolumeShape::Stl(StlVolume::new(mesh)?), config)?
        }
        SourceTag::CylindricalSurface => {
            surface(SurfaceRegion::cylindrical_from_config(config)?, config, geometry)?
        }
        SourceTag::StlSurface => {
            let mesh = read_stl(config.resolve_path("STLfile")?)?;
            surface(SurfaceRegion::Stl(mesh), config, geometry)?
        }
    };
    log::debug!("constructed {tag:?} source");
    ParticleSource::with_kind(config, kind)
}

fn volume(shape: VolumeShape, config: &SourceConfig) -> SourceResult<SourceKind> {
    Ok(SourceKind::Volume(VolumeSource::from_config(shape, config)?))
}

fn surface<G: Geometry + ?Sized>(
    region: SurfaceRegion,
    config: &SourceConfig,
    geometry: &G,
) -> SourceResult<SourceKind> {
    let enormal = config.f64_or("Enormal", 0.0)?;
    Ok(SourceKind::Surface(SurfaceSource::new(region, enormal, geometry)?))
}

impl ParticleSource {
    /// Build from a configuration block whose `sourcemode` key names the type.
    pub fn from_config<G: Geometry + ?Sized>(
        config: &SourceConfig,
        geometry: &G,
    ) -> SourceResult<Self> {
        let tag = config
            .get("sourcemode")
            .ok_or_else(|| SourceError::ConfigError("sourcemode is not set".to_string()))?;
        create_particle_source(tag, config, geometry)
    }
}
