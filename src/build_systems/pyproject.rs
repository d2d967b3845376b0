//! PEP 517 projects described by pyproject.toml

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct PyprojectBuildSystem;

impl BuildSystem for PyprojectBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Pyproject
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "pyproject.toml",
            priority: 4,
        }]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("python -m pytest")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["python derivation examples", "buildPythonPackage pyproject"]
    }
}
