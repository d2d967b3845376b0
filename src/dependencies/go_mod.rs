//! go.mod requirements

use super::{read_manifest, Dependency, DependencyExtractor, ExtractError};
use std::path::Path;

pub struct GoModExtractor;

impl DependencyExtractor for GoModExtractor {
    fn name(&self) -> &'static str {
        "go-modules"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        Ok(read_manifest(&repo_root.join("go.mod"))?
            .map(|content| parse_go_mod(&content))
            .unwrap_or_default())
    }
}

/// Parses `require` directives, both single-line and parenthesized blocks
pub fn parse_go_mod(content: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut in_require = false;

    for raw in content.lines() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if in_require {
            if line == ")" {
                in_require = false;
                continue;
            }
            if let Some(dep) = requirement(line) {
                deps.push(dep);
            }
            continue;
        }

        if let Some(rest) = line
            .strip_prefix("require")
            .filter(|r| r.starts_with(|c: char| c.is_whitespace() || c == '('))
        {
            let rest = rest.trim();
            if rest == "(" {
                in_require = true;
            } else if let Some(dep) = requirement(rest) {
                deps.push(dep);
            }
        }
    }

    deps
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn requirement(spec: &str) -> Option<Dependency> {
    let mut parts = spec.split_whitespace();
    let name = parts.next()?;
    let version = parts.next()?;
    Some(Dependency::runtime(name, version))
}
