//! GNU Autotools build system

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct AutotoolsBuildSystem;

impl BuildSystem for AutotoolsBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Autotools
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[
            MarkerPattern {
                filename: "configure.ac",
                priority: 7,
            },
            MarkerPattern {
                filename: "configure.in",
                priority: 7,
            },
        ]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["autoreconfHook"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("make check")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["autotools derivation", "autoreconfHook configureFlags"]
    }
}
