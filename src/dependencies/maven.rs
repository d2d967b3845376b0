//! pom.xml `<dependencies>` of the project element

use super::{read_manifest, Dependency, DependencyExtractor, DependencyType, ExtractError};
use roxmltree::{Document, Node};
use std::path::Path;

pub struct MavenExtractor;

impl DependencyExtractor for MavenExtractor {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        let path = repo_root.join("pom.xml");
        let Some(content) = read_manifest(&path)? else {
            return Ok(Vec::new());
        };

        parse_pom(&content).map_err(|err| ExtractError::Malformed {
            path,
            message: err.to_string(),
        })
    }
}

/// Only `<project><dependencies>` is read; managed versions and plugin
/// dependencies are not declarations of the project itself.
pub fn parse_pom(content: &str) -> Result<Vec<Dependency>, roxmltree::Error> {
    let doc = Document::parse(content)?;
    let root = doc.root_element();

    let deps = root
        .children()
        .filter(|node| node.has_tag_name("dependencies"))
        .flat_map(|node| node.children())
        .filter(|node| node.has_tag_name("dependency"))
        .filter_map(|node| dependency(&node))
        .collect();

    Ok(deps)
}

fn dependency(node: &Node) -> Option<Dependency> {
    let field = |name: &str| {
        node.children()
            .find(|child| child.has_tag_name(name))
            .and_then(|child| child.text())
            .map(|text| text.trim().to_string())
    };

    let artifact_id = field("artifactId")?;
    let name = match field("groupId") {
        Some(group_id) => format!("{}:{}", group_id, artifact_id),
        None => artifact_id,
    };
    let dep_type = match field("scope").as_deref() {
        Some("test") => DependencyType::Dev,
        Some("provided") => DependencyType::Build,
        _ => DependencyType::Runtime,
    };

    Some(Dependency::new(name, field("version").unwrap_or_default(), dep_type))
}
