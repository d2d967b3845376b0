//! Cargo.toml dependencies
//!
//! Line and section aware rather than a full TOML decode, so a manifest with a
//! broken table elsewhere still yields the dependencies that are readable.

use super::{read_manifest, Dependency, DependencyExtractor, DependencyType, ExtractError};
use std::path::Path;

pub struct CargoExtractor;

impl DependencyExtractor for CargoExtractor {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        Ok(read_manifest(&repo_root.join("Cargo.toml"))?
            .map(|content| parse_cargo_toml(&content))
            .unwrap_or_default())
    }
}

enum Section {
    Other,
    /// `[dependencies]` style table: one dependency per line
    Table(DependencyType),
    /// `[dependencies.name]` style table: a single dependency's fields
    Single(usize),
}

pub fn parse_cargo_toml(content: &str) -> Vec<Dependency> {
    let mut deps: Vec<Dependency> = Vec::new();
    let mut section = Section::Other;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = match parse_header(line) {
                Some((dep_type, None)) => Section::Table(dep_type),
                Some((dep_type, Some(name))) => {
                    deps.push(Dependency::new(name, "", dep_type));
                    Section::Single(deps.len() - 1)
                }
                None => Section::Other,
            };
            continue;
        }

        match section {
            Section::Other => {}
            Section::Table(dep_type) => {
                if let Some((name, version)) = parse_entry(line) {
                    deps.push(Dependency::new(name, version, dep_type));
                }
            }
            Section::Single(idx) => {
                if let Ok(table) = line.parse::<toml::Table>() {
                    if let Some(version) = table.get("version").and_then(|v| v.as_str()) {
                        deps[idx].version = version.to_string();
                    }
                }
            }
        }
    }

    deps
}

/// Classifies a table header. Returns the dependency type and, for
/// `[dependencies.<name>]` headers, the dependency name.
fn parse_header(line: &str) -> Option<(DependencyType, Option<String>)> {
    let inner = line.trim_start_matches('[').split(']').next()?.trim();

    // [target.'cfg(unix)'.dependencies] shares the plain section semantics
    let inner = match inner.strip_prefix("target.") {
        Some(rest) => rest
            .rsplit_once("'.")
            .or_else(|| rest.rsplit_once("\"."))
            .or_else(|| rest.split_once('.'))
            .map(|(_, tail)| tail)?,
        None => inner,
    };

    let (table, name) = match inner.split_once('.') {
        Some((table, name)) => (table, Some(name.trim_matches('"').to_string())),
        None => (inner, None),
    };

    let dep_type = match table {
        "dependencies" => DependencyType::Runtime,
        "dev-dependencies" => DependencyType::Dev,
        "build-dependencies" => DependencyType::Build,
        _ => return None,
    };
    Some((dep_type, name))
}

/// `name = "1.0"` or `name = { version = "1.0", ... }`; anything else is skipped
fn parse_entry(line: &str) -> Option<(String, String)> {
    let table = line.parse::<toml::Table>().ok()?;
    let (name, value) = table.into_iter().next()?;
    let version = match value {
        toml::Value::String(version) => version,
        toml::Value::Table(fields) => fields
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => return None,
    };
    Some((name, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_map_to_types() {
        let content = r#"
[package]
name = "demo"
version = "0.1.0"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
anyhow = "1.0"
local = { path = "../local" }

[dev-dependencies]
tempfile = "3.8"

[build-dependencies]
cc = "1.0"
"#;
        let deps = parse_cargo_toml(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("serde", "1.0"),
                Dependency::runtime("anyhow", "1.0"),
                Dependency::runtime("local", ""),
                Dependency::dev("tempfile", "3.8"),
                Dependency::build("cc", "1.0"),
            ]
        );
    }

    #[test]
    fn test_package_fields_are_not_dependencies() {
        let deps = parse_cargo_toml("[package]\nname = \"demo\"\nversion = \"1.0.0\"\n");
        assert!(deps.is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let content = "[dependencies]\nserde = \"1.0\nregex = \"1.10\"\ntokio = { version = \"1\",\n";
        let deps = parse_cargo_toml(content);
        assert_eq!(deps, vec![Dependency::runtime("regex", "1.10")]);
    }

    #[test]
    fn test_named_dependency_tables() {
        let content = "[dependencies.tokio]\nversion = \"1.35\"\nfeatures = [\"full\"]\n\n[dev-dependencies.proptest]\nversion = \"1\"\n";
        let deps = parse_cargo_toml(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("tokio", "1.35"),
                Dependency::dev("proptest", "1"),
            ]
        );
    }

    #[test]
    fn test_target_specific_dependencies() {
        let content = "[target.'cfg(unix)'.dependencies]\nlibc = \"0.2\"\n\n[target.x86_64-pc-windows-msvc.dev-dependencies]\nwinapi = \"0.3\"\n";
        let deps = parse_cargo_toml(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("libc", "0.2"),
                Dependency::dev("winapi", "0.3"),
            ]
        );
    }
}
