//! Gradle build system (Java/Kotlin)

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct GradleBuildSystem;

impl BuildSystem for GradleBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Gradle
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[
            MarkerPattern {
                filename: "build.gradle",
                priority: 3,
            },
            MarkerPattern {
                filename: "build.gradle.kts",
                priority: 3,
            },
        ]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["gradle"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("gradle test")
    }
}
