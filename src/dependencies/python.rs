//! Python dependencies from requirements.txt, setup.py and pyproject.toml
//!
//! All three files are read when present. The same package named in more
//! than one of them is reported once per file.

use super::{read_manifest, Dependency, DependencyExtractor, DependencyType, ExtractError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*([<>=~!].*)?$")
        .expect("valid regex")
});

// quoted items may carry extras brackets, so only an unquoted `]` closes the list
static INSTALL_REQUIRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"install_requires\s*=\s*\[((?:"[^"]*"|'[^']*'|[^\]"'])*)\]"#)
        .expect("valid regex")
});

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("valid regex"));

pub struct PythonExtractor;

impl DependencyExtractor for PythonExtractor {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        let mut deps = Vec::new();

        if let Some(content) = read_manifest(&repo_root.join("requirements.txt"))? {
            deps.extend(parse_requirements(&content));
        }
        if let Some(content) = read_manifest(&repo_root.join("setup.py"))? {
            deps.extend(parse_setup_py(&content));
        }
        if let Some(content) = read_manifest(&repo_root.join("pyproject.toml"))? {
            deps.extend(parse_pyproject(&content));
        }

        Ok(deps)
    }
}

/// Splits a PEP 508 requirement into name and version specifier
fn requirement(spec: &str, dep_type: DependencyType) -> Option<Dependency> {
    let spec = spec.split(';').next()?.trim();
    let caps = REQUIREMENT_RE.captures(spec)?;
    let name = caps.get(1)?.as_str();
    let version = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    Some(Dependency::new(name, version, dep_type))
}

pub fn parse_requirements(content: &str) -> Vec<Dependency> {
    content
        .lines()
        .map(|line| line.split(" #").next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| requirement(line, DependencyType::Runtime))
        .collect()
}

pub fn parse_setup_py(content: &str) -> Vec<Dependency> {
    let Some(caps) = INSTALL_REQUIRES_RE.captures(content) else {
        return Vec::new();
    };
    let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    QUOTED_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .filter_map(|m| requirement(m.as_str(), DependencyType::Runtime))
        .collect()
}

/// Reads `[project] dependencies` (single or multi-line array) and poetry's
/// dependency tables.
pub fn parse_pyproject(content: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut section = String::new();
    let mut in_array = false;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if in_array {
            deps.extend(quoted_requirements(line, DependencyType::Runtime));
            if closes_array(line) {
                in_array = false;
            }
            continue;
        }

        if line.starts_with('[') {
            section = line.trim_matches(|c| c == '[' || c == ']').trim().to_string();
            continue;
        }

        match section.as_str() {
            "project" => {
                if let Some(rest) = line.strip_prefix("dependencies") {
                    let rest = rest.trim_start();
                    if let Some(array) = rest.strip_prefix('=') {
                        deps.extend(quoted_requirements(array, DependencyType::Runtime));
                        in_array = array.contains('[') && !closes_array(array);
                    }
                }
            }
            "tool.poetry.dependencies" => deps.extend(poetry_entry(line, DependencyType::Runtime)),
            "tool.poetry.dev-dependencies" | "tool.poetry.group.dev.dependencies" => {
                deps.extend(poetry_entry(line, DependencyType::Dev))
            }
            _ => {}
        }
    }

    deps
}

// extras like "uvicorn[standard]" put brackets inside the quotes
fn closes_array(line: &str) -> bool {
    let line = line.trim_end().trim_end_matches(',');
    line.starts_with(']') || line.ends_with(']')
}

fn quoted_requirements(fragment: &str, dep_type: DependencyType) -> Vec<Dependency> {
    QUOTED_RE
        .captures_iter(fragment)
        .filter_map(|c| c.get(1))
        .filter_map(|m| requirement(m.as_str(), dep_type))
        .collect()
}

fn poetry_entry(line: &str, dep_type: DependencyType) -> Option<Dependency> {
    let table = line.parse::<toml::Table>().ok()?;
    let (name, value) = table.into_iter().next()?;
    if name == "python" {
        return None;
    }
    let version = match value {
        toml::Value::String(version) => version,
        toml::Value::Table(fields) => fields
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };
    Some(Dependency::new(name, version, dep_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_requirements_txt() {
        let content = "# web\nflask==2.3.0\nrequests>=2.28,<3  # http\n-r dev.txt\n\nuvicorn[standard]~=0.23\nclick\n";
        let deps = parse_requirements(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("flask", "==2.3.0"),
                Dependency::runtime("requests", ">=2.28,<3"),
                Dependency::runtime("uvicorn", "~=0.23"),
                Dependency::runtime("click", ""),
            ]
        );
    }

    #[test]
    fn test_requirements_skips_urls() {
        let deps = parse_requirements("git+https://github.com/a/b.git\nnumpy\n");
        assert_eq!(deps, vec![Dependency::runtime("numpy", "")]);
    }

    #[test]
    fn test_setup_py_install_requires() {
        let content = r#"
from setuptools import setup

setup(
    name="demo",
    install_requires=[
        "numpy>=1.20",
        'pandas',
    ],
)
"#;
        let deps = parse_setup_py(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("numpy", ">=1.20"),
                Dependency::runtime("pandas", ""),
            ]
        );
    }

    #[test]
    fn test_setup_py_extras_inside_list() {
        let content = r#"
setup(
    install_requires=["uvicorn[standard]>=0.20", 'requests[socks]', "click"],
    extras_require={"dev": ["pytest"]},
)
"#;
        let deps = parse_setup_py(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("uvicorn", ">=0.20"),
                Dependency::runtime("requests", ""),
                Dependency::runtime("click", ""),
            ]
        );
    }

    #[test]
    fn test_pyproject_multiline_dependencies() {
        let content = r#"
[project]
name = "demo"
dependencies = [
    "httpx>=0.24",
    "rich",
]

[project.optional-dependencies]
dev = ["pytest"]
"#;
        let deps = parse_pyproject(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("httpx", ">=0.24"),
                Dependency::runtime("rich", ""),
            ]
        );
    }

    #[test]
    fn test_pyproject_single_line_dependencies() {
        let deps = parse_pyproject("[project]\ndependencies = [\"attrs\", \"cattrs>=23\"]\n");
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("attrs", ""),
                Dependency::runtime("cattrs", ">=23"),
            ]
        );
    }

    #[test]
    fn test_poetry_tables() {
        let content = r#"
[tool.poetry]
name = "demo"
version = "0.2.0"

[tool.poetry.dependencies]
python = "^3.11"
fastapi = "^0.100"
sqlalchemy = { version = "^2.0", extras = ["asyncio"] }

[tool.poetry.group.dev.dependencies]
pytest = "^7.4"
"#;
        let deps = parse_pyproject(content);
        assert_eq!(
            deps,
            vec![
                Dependency::runtime("fastapi", "^0.100"),
                Dependency::runtime("sqlalchemy", "^2.0"),
                Dependency::dev("pytest", "^7.4"),
            ]
        );
    }

    #[test]
    fn test_duplicates_across_files_are_preserved() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("requirements.txt"), "requests==2.31.0\n").unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\ndependencies = [\"requests>=2\"]\n",
        )
        .unwrap();

        let deps = PythonExtractor.extract(dir.path()).unwrap();
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "requests"]);
    }

    #[test]
    fn test_no_manifests_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(PythonExtractor.extract(dir.path()).unwrap().is_empty());
    }
}
