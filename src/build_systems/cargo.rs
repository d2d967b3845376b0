//! Cargo build system (Rust)

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct CargoBuildSystem;

impl BuildSystem for CargoBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Cargo
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "Cargo.toml",
            priority: 10,
        }]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("cargo test")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["rust cargo derivation", "buildRustPackage cargoHash"]
    }
}
