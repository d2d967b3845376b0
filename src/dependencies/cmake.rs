//! CMake `find_package` and `pkg_check_modules` calls

use super::{read_manifest, Dependency, DependencyExtractor, ExtractError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

const CMAKE_FILES: &[&str] = &["CMakeLists.txt", "cmake/CMakeLists.txt"];

const PKG_CONFIG_KEYWORDS: &[&str] = &[
    "REQUIRED",
    "QUIET",
    "IMPORTED_TARGET",
    "GLOBAL",
    "NO_CMAKE_PATH",
    "NO_CMAKE_ENVIRONMENT_PATH",
];

static FIND_PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfind_package\s*\(\s*([A-Za-z0-9_]+)").expect("valid regex")
});

static PKG_CHECK_MODULES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpkg_check_modules\s*\(([^)]*)\)").expect("valid regex")
});

pub struct CMakeExtractor;

impl DependencyExtractor for CMakeExtractor {
    fn name(&self) -> &'static str {
        "cmake"
    }

    fn extract(&self, repo_root: &Path) -> Result<Vec<Dependency>, ExtractError> {
        let mut deps = Vec::new();
        for file in CMAKE_FILES {
            if let Some(content) = read_manifest(&repo_root.join(file))? {
                deps.extend(parse_cmake_lists(&content));
            }
        }
        Ok(deps)
    }
}

pub fn parse_cmake_lists(content: &str) -> Vec<Dependency> {
    let content = strip_comments(content);
    let mut deps: Vec<Dependency> = FIND_PACKAGE_RE
        .captures_iter(&content)
        .filter_map(|c| c.get(1))
        .map(|m| Dependency::system_library(m.as_str().to_lowercase()))
        .collect();

    for caps in PKG_CHECK_MODULES_RE.captures_iter(&content) {
        let Some(args) = caps.get(1) else { continue };
        // first argument is the variable prefix
        let modules = args
            .as_str()
            .split_whitespace()
            .skip(1)
            .filter(|arg| !PKG_CONFIG_KEYWORDS.contains(arg))
            .filter_map(module_name);
        deps.extend(modules.map(Dependency::system_library));
    }

    deps
}

/// `glib-2.0>=2.56` → `glib-2.0`. Bare operator or version tokens from a
/// spaced constraint (`gtk+-3.0 >= 3.22`) yield nothing.
fn module_name(arg: &str) -> Option<&str> {
    let name = match arg.find(|c| matches!(c, '<' | '>' | '=')) {
        Some(idx) => &arg[..idx],
        None => arg,
    };
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(name)
}

fn strip_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::DependencyType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_package_lowercased_system() {
        let deps = parse_cmake_lists(
            "cmake_minimum_required(VERSION 3.16)\nfind_package(OpenSSL REQUIRED)\nfind_package( ZLIB )\n",
        );
        assert_eq!(
            deps.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["openssl", "zlib"]
        );
        assert!(deps.iter().all(|d| d.system && d.dep_type == DependencyType::Build));
    }

    #[test]
    fn test_pkg_check_modules_lists_every_module() {
        let deps = parse_cmake_lists(
            "pkg_check_modules(DEPS REQUIRED IMPORTED_TARGET glib-2.0>=2.56 libcurl)\npkg_check_modules(GTK gtk+-3.0 >= 3.22)\n",
        );
        assert_eq!(
            deps.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["glib-2.0", "libcurl", "gtk+-3.0"]
        );
    }

    #[test]
    fn test_commented_calls_ignored() {
        let deps = parse_cmake_lists("# find_package(Boost)\nfind_package(Threads)\n");
        assert_eq!(deps, vec![Dependency::system_library("threads")]);
    }

    #[test]
    fn test_reads_nested_cmake_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("cmake")).unwrap();
        fs::write(dir.path().join("CMakeLists.txt"), "find_package(PNG)\n").unwrap();
        fs::write(dir.path().join("cmake/CMakeLists.txt"), "find_package(JPEG)\n").unwrap();

        let deps = CMakeExtractor.extract(dir.path()).unwrap();
        assert_eq!(
            deps,
            vec![
                Dependency::system_library("png"),
                Dependency::system_library("jpeg"),
            ]
        );
    }
}
