//! meson.build `dependency('name')` calls

use super::{read_manifest, Dependency, DependencyExtractor, ExtractError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdependency\s*\(\s*['"]([^'"]+)['"]"#).expect("valid regex")
});

pub struct MesonExtractor;

impl DependencyExtractor for MesonExtractor {
    fn name(&self) -> &'static str {
        "meson"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        Ok(read_manifest(&repo_root.join("meson.build"))?
            .map(|content| parse_meson_build(&content))
            .unwrap_or_default())
    }
}

pub fn parse_meson_build(content: &str) -> Vec<Dependency> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| {
            DEPENDENCY_RE
                .captures_iter(line)
                .filter_map(|c| c.get(1))
                .map(|m| Dependency::system_library(m.as_str()))
                .collect::<Vec<_>>()
        })
        .collect()
}
