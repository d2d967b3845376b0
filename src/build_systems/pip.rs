//! pip build system (setup.py / requirements.txt)

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct PipBuildSystem;

impl BuildSystem for PipBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Pip
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[
            MarkerPattern {
                filename: "setup.py",
                priority: 4,
            },
            MarkerPattern {
                filename: "requirements.txt",
                priority: 4,
            },
        ]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("python -m pytest")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["python derivation examples", "buildPythonApplication setuptools"]
    }
}
