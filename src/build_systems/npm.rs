//! npm and Yarn build systems (JavaScript/TypeScript)

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct NpmBuildSystem;

impl BuildSystem for NpmBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Npm
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "package.json",
            priority: 6,
        }]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["nodejs"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("npm test")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["nodejs npm derivation", "buildNpmPackage npmDepsHash"]
    }
}

/// Yarn shares the npm manifest; its lockfile is the marker
pub struct YarnBuildSystem;

impl BuildSystem for YarnBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Yarn
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "yarn.lock",
            priority: 5,
        }]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["nodejs", "yarn"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("npm test")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["nodejs yarn derivation", "fetchYarnDeps yarnConfigHook"]
    }
}
