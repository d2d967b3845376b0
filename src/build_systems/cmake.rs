//! CMake build system (C/C++)

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct CMakeBuildSystem;

impl BuildSystem for CMakeBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Cmake
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "CMakeLists.txt",
            priority: 8,
        }]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["cmake"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("make test")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["cmake derivation examples", "mkDerivation cmake"]
    }
}
