//! Go modules build system

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct GoModulesBuildSystem;

impl BuildSystem for GoModulesBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::GoModules
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "go.mod",
            priority: 10,
        }]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("go test ./...")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["go derivation examples", "buildGoModule vendorHash"]
    }
}
