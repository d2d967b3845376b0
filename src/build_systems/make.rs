//! Plain Makefile projects

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct MakeBuildSystem;

impl BuildSystem for MakeBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Make
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[
            MarkerPattern {
                filename: "Makefile",
                priority: 1,
            },
            MarkerPattern {
                filename: "makefile",
                priority: 1,
            },
            MarkerPattern {
                filename: "GNUmakefile",
                priority: 1,
            },
        ]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("make test")
    }
}
