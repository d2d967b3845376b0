use std::path::Path;

/// Project version declared by the first manifest that has one:
/// package.json, then Cargo.toml `[package]`, then pyproject.toml
/// `[project]` or `[tool.poetry]`.
pub fn probe_version(root: &Path) -> Option<String> {
    package_json_version(root)
        .or_else(|| cargo_version(root))
        .or_else(|| pyproject_version(root))
}

fn package_json_version(root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(root.join("package.json")).ok()?;
    let manifest: serde_json::Value = serde_json::from_str(&content).ok()?;
    non_empty(manifest.get("version")?.as_str()?)
}

fn cargo_version(root: &Path) -> Option<String> {
    let manifest = read_toml(&root.join("Cargo.toml"))?;
    // `version.workspace = true` is a table, not a version
    non_empty(manifest.get("package")?.get("version")?.as_str()?)
}

fn pyproject_version(root: &Path) -> Option<String> {
    let manifest = read_toml(&root.join("pyproject.toml"))?;
    let project = manifest
        .get("project")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str());
    let poetry = || {
        manifest
            .get("tool")?
            .get("poetry")?
            .get("version")?
            .as_str()
    };
    non_empty(project.or_else(poetry)?)
}

fn read_toml(path: &Path) -> Option<toml::Table> {
    std::fs::read_to_string(path).ok()?.parse().ok()
}

fn non_empty(version: &str) -> Option<String> {
    let version = version.trim();
    (!version.is_empty()).then(|| version.to_string())
}
