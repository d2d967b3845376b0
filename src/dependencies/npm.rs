//! package.json dependencies (npm, Yarn)

use super::{read_manifest, Dependency, DependencyExtractor, DependencyType, ExtractError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub struct NpmExtractor;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, String>,
}

impl DependencyExtractor for NpmExtractor {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        let path = repo_root.join("package.json");
        let Some(content) = read_manifest(&path)? else {
            return Ok(Vec::new());
        };

        parse_package_json(&content).map_err(|err| ExtractError::Malformed {
            path,
            message: err.to_string(),
        })
    }
}

pub fn parse_package_json(content: &str) -> Result<Vec<Dependency>, serde_json::Error> {
    let manifest: PackageJson = serde_json::from_str(content)?;

    let sections = [
        (manifest.dependencies, DependencyType::Runtime),
        (manifest.optional_dependencies, DependencyType::Runtime),
        (manifest.dev_dependencies, DependencyType::Dev),
    ];

    Ok(sections
        .into_iter()
        .flat_map(|(deps, dep_type)| {
            deps.into_iter()
                .map(move |(name, version)| Dependency::new(name, version, dep_type))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sections() {
        let deps = parse_package_json(
            r#"{
                "name": "app",
                "dependencies": {"express": "^4.18.0", "cors": "2.8.5"},
                "devDependencies": {"jest": "^29.0.0"},
                "optionalDependencies": {"fsevents": "*"}
            }"#,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec![
                Dependency::runtime("cors", "2.8.5"),
                Dependency::runtime("express", "^4.18.0"),
                Dependency::runtime("fsevents", "*"),
                Dependency::dev("jest", "^29.0.0"),
            ]
        );
    }

    #[test]
    fn test_manifest_without_dependencies() {
        assert!(parse_package_json(r#"{"name": "empty"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = TempDir::new().unwrap();
        let deps = NpmExtractor.extract(dir.path()).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ \"dependencies\": ").unwrap();
        let result = NpmExtractor.extract(dir.path());
        assert!(matches!(result, Err(ExtractError::Malformed { .. })));
    }
}
