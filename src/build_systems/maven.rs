//! Maven build system (Java)

use super::{BuildSystem, BuildSystemId, MarkerPattern};

pub struct MavenBuildSystem;

impl BuildSystem for MavenBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Maven
    }

    fn markers(&self) -> &[MarkerPattern] {
        &[MarkerPattern {
            filename: "pom.xml",
            priority: 2,
        }]
    }

    fn native_build_inputs(&self) -> &[&'static str] {
        &["maven"]
    }

    fn check_command(&self) -> Option<&'static str> {
        Some("mvn test")
    }

    fn documentation_queries(&self) -> &[&'static str] {
        &["maven derivation", "maven.buildMavenPackage mvnHash"]
    }
}
