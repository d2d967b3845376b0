//! Build system definitions
//!
//! Each build system is a unit struct describing its marker files, the native
//! tools a derivation needs to drive it, its test invocation and the
//! documentation topics worth consulting when refining a derivation for it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildSystemId {
    Cmake,
    Meson,
    Autotools,
    Make,
    Cargo,
    Npm,
    Yarn,
    Pip,
    Pyproject,
    GoModules,
    Gradle,
    Maven,
    Unknown,
}

impl BuildSystemId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildSystemId::Cmake => "cmake",
            BuildSystemId::Meson => "meson",
            BuildSystemId::Autotools => "autotools",
            BuildSystemId::Make => "make",
            BuildSystemId::Cargo => "cargo",
            BuildSystemId::Npm => "npm",
            BuildSystemId::Yarn => "yarn",
            BuildSystemId::Pip => "pip",
            BuildSystemId::Pyproject => "pyproject",
            BuildSystemId::GoModules => "go-modules",
            BuildSystemId::Gradle => "gradle",
            BuildSystemId::Maven => "maven",
            BuildSystemId::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let id = match name.to_ascii_lowercase().as_str() {
            "cmake" => BuildSystemId::Cmake,
            "meson" => BuildSystemId::Meson,
            "autotools" => BuildSystemId::Autotools,
            "make" => BuildSystemId::Make,
            "cargo" => BuildSystemId::Cargo,
            "npm" => BuildSystemId::Npm,
            "yarn" => BuildSystemId::Yarn,
            "pip" => BuildSystemId::Pip,
            "pyproject" => BuildSystemId::Pyproject,
            "go-modules" | "go" => BuildSystemId::GoModules,
            "gradle" => BuildSystemId::Gradle,
            "maven" => BuildSystemId::Maven,
            "unknown" => BuildSystemId::Unknown,
            _ => return None,
        };
        Some(id)
    }
}

impl fmt::Display for BuildSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker file name and the priority it carries during classification
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    pub filename: &'static str,
    pub priority: u8,
}

/// Build system trait
pub trait BuildSystem: Send + Sync {
    fn id(&self) -> BuildSystemId;

    /// Marker files (e.g., "Cargo.toml", "go.mod")
    fn markers(&self) -> &[MarkerPattern];

    /// Tools the builder needs on the build host
    fn native_build_inputs(&self) -> &[&'static str] {
        &[]
    }

    /// Command used for the check phase when the project has tests
    fn check_command(&self) -> Option<&'static str> {
        None
    }

    /// Documentation topics for derivations built with this system
    fn documentation_queries(&self) -> &[&'static str] {
        &["mkDerivation standard build"]
    }
}

pub mod autotools;
pub mod cargo;
pub mod cmake;
pub mod go_mod;
pub mod gradle;
pub mod make;
pub mod maven;
pub mod meson;
pub mod npm;
pub mod pip;
pub mod pyproject;
pub mod registry;

pub use autotools::AutotoolsBuildSystem;
pub use cargo::CargoBuildSystem;
pub use cmake::CMakeBuildSystem;
pub use go_mod::GoModulesBuildSystem;
pub use gradle::GradleBuildSystem;
pub use make::MakeBuildSystem;
pub use maven::MavenBuildSystem;
pub use meson::MesonBuildSystem;
pub use npm::{NpmBuildSystem, YarnBuildSystem};
pub use pip::PipBuildSystem;
pub use pyproject::PyprojectBuildSystem;
pub use registry::{BuildSystemRegistry, Classification};
