//! Meson build system

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct MesonBuildSystem;

impl BuildSystem for MesonBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Meson
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "meson.build",
            priority: 9,
        }]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["meson", "ninja", "pkg-config"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("meson test")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["meson derivation examples", "mesonFlags buildInputs"]
    }
}
