//! Dependency extraction
//!
//! One extractor per manifest format. Extractors are shallow and best-effort:
//! a missing manifest yields an empty list, a malformed line is skipped, and
//! only content that cannot be read at all (invalid JSON, broken XML) fails.

use crate::build_systems::BuildSystemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub mod cargo;
pub mod cmake;
pub mod go_mod;
pub mod maven;
pub mod meson;
pub mod npm;
pub mod python;

pub use cargo::CargoExtractor;
pub use cmake::CMakeExtractor;
pub use go_mod::GoModExtractor;
pub use maven::MavenExtractor;
pub use meson::MesonExtractor;
pub use npm::NpmExtractor;
pub use python::PythonExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Runtime,
    Dev,
    Build,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DependencyType::Runtime => "runtime",
            DependencyType::Dev => "dev",
            DependencyType::Build => "build",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(rename = "type")]
    pub dep_type: DependencyType,
    /// Exact version, range expression, or empty when unspecified
    pub version: String,
    /// Native library found through the compiler toolchain rather than a
    /// language package registry
    pub system: bool,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>, dep_type: DependencyType) -> Self {
        Self {
            name: name.into(),
            dep_type,
            version: version.into(),
            system: false,
        }
    }

    pub fn runtime(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, DependencyType::Runtime)
    }

    pub fn dev(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, DependencyType::Dev)
    }

    pub fn build(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, DependencyType::Build)
    }

    pub fn system_library(name: impl Into<String>) -> Self {
        Self {
            system: true,
            ..Self::build(name, "")
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Malformed manifest {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

pub trait DependencyExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Dependencies declared by the manifests under `repo_root`
    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError>;
}

/// Extractor for a build system, if one exists
pub fn extractor_for(build_system: BuildSystemId) -> Option<Box<dyn DependencyExtractor>> {
    let extractor: Box<dyn DependencyExtractor> = match build_system {
        BuildSystemId::Npm | BuildSystemId::Yarn => Box::new(NpmExtractor),
        BuildSystemId::Cargo => Box::new(CargoExtractor),
        BuildSystemId::GoModules => Box::new(GoModExtractor),
        BuildSystemId::Pip | BuildSystemId::Pyproject => Box::new(PythonExtractor),
        BuildSystemId::Cmake => Box::new(CMakeExtractor),
        BuildSystemId::Meson => Box::new(MesonExtractor),
        BuildSystemId::Maven => Box::new(MavenExtractor),
        BuildSystemId::Autotools
        | BuildSystemId::Make
        | BuildSystemId::Gradle
        | BuildSystemId::Unknown => return None,
    };
    Some(extractor)
}

pub fn extract_dependencies(
    repo_root: &Path,
    build_system: BuildSystemId,
) -> Result<Vec<Dependency>, ExtractError> {
    let Some(extractor) = extractor_for(build_system) else {
        debug!(build_system = %build_system, "No dependency extractor for build system");
        return Ok(Vec::new());
    };

    let dependencies = extractor.extract(repo_root)?;
    debug!(
        extractor = extractor.name(),
        count = dependencies.len(),
        "Extracted dependencies"
    );
    Ok(dependencies)
}

/// Reads a manifest, mapping a missing file to `None`
pub(crate) fn read_manifest(path: &Path) -> Result<Option<String>, ExtractError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ExtractError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
