//! Language detection rules
//!
//! A [`LanguageRules`] registry is an immutable table of weighted rules keyed
//! by language id. The analyzer receives it explicitly, so tests can run with a
//! handful of local rules instead of the built-in table.

use globset::{Glob, GlobMatcher};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid file pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },
    #[error("Invalid content pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        source: regex::Error,
    },
}

/// A weighted rule matching either a file name or file content
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pub name: String,
    pub file_pattern: Option<String>,
    file_glob: Option<GlobMatcher>,
    pub content_pattern: Option<Regex>,
    pub confidence: f64,
    pub priority: i32,
}

impl DetectionRule {
    pub fn file(
        name: impl Into<String>,
        pattern: &str,
        confidence: f64,
        priority: i32,
    ) -> Result<Self, RuleError> {
        let glob = Glob::new(pattern).map_err(|source| RuleError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.into(),
            file_pattern: Some(pattern.to_string()),
            file_glob: Some(glob.compile_matcher()),
            content_pattern: None,
            confidence,
            priority,
        })
    }

    pub fn content(
        name: impl Into<String>,
        pattern: &str,
        confidence: f64,
        priority: i32,
    ) -> Result<Self, RuleError> {
        let regex = Regex::new(pattern).map_err(|source| RuleError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.into(),
            file_pattern: None,
            file_glob: None,
            content_pattern: Some(regex),
            confidence,
            priority,
        })
    }

    pub fn matches_file_name(&self, name: &str) -> bool {
        self.file_glob.as_ref().is_some_and(|g| g.is_match(name))
    }

    pub fn matches_content(&self, excerpt: &str) -> bool {
        self.content_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(excerpt))
    }
}

/// Rules for one language
#[derive(Debug, Clone)]
pub struct LanguageRuleSet {
    pub language: String,
    pub rules: Vec<DetectionRule>,
}

#[derive(Debug, Clone, Default)]
pub struct LanguageRules {
    sets: Vec<LanguageRuleSet>,
}

impl LanguageRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        DEFAULT_RULES.clone()
    }

    /// Adds rules for a language, appending to any rules it already has
    pub fn register(&mut self, language: impl Into<String>, rules: Vec<DetectionRule>) {
        let language = language.into();
        match self.sets.iter_mut().find(|s| s.language == language) {
            Some(set) => set.rules.extend(rules),
            None => self.sets.push(LanguageRuleSet { language, rules }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageRuleSet> {
        self.sets.iter()
    }

    pub fn get(&self, language: &str) -> Option<&LanguageRuleSet> {
        self.sets.iter().find(|s| s.language == language)
    }

    pub fn languages(&self) -> Vec<&str> {
        self.sets.iter().map(|s| s.language.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

enum Spec {
    File(&'static str, &'static str, f64, i32),
    Content(&'static str, &'static str, f64, i32),
}

use Spec::{Content, File};

const BUILTIN_RULES: &[(&str, &[Spec])] = &[
    (
        "javascript",
        &[
            File("JavaScript files", "*.js", 0.9, 1),
            File("ES modules", "*.mjs", 0.95, 1),
            File("ES6 files", "*.es6", 0.9, 1),
            File("Package manifest", "package.json", 0.95, 3),
            Content("Node.js shebang", r"\A#!.*\bnode\b", 0.8, 2),
            Content("CommonJS require", r#"require\s*\(\s*['"]"#, 0.7, 2),
            Content("ES6 import", r#"(?m)^\s*import\s+.+\s+from\s+['"]"#, 0.8, 2),
        ],
    ),
    (
        "typescript",
        &[
            File("TypeScript files", "*.ts", 0.95, 1),
            File("TypeScript React files", "*.tsx", 0.95, 1),
            File("TypeScript config", "tsconfig.json", 0.9, 3),
            File("Type declarations", "*.d.ts", 0.9, 1),
            Content(
                "Type annotations",
                r":\s*(string|number|boolean|any|void)\b",
                0.7,
                2,
            ),
            Content("Interface declaration", r"interface\s+\w+\s*\{", 0.8, 2),
        ],
    ),
    (
        "python",
        &[
            File("Python files", "*.py", 0.95, 1),
            File("Python GUI files", "*.pyw", 0.9, 1),
            File("Requirements file", "requirements.txt", 0.9, 3),
            File("Setup script", "setup.py", 0.95, 3),
            File("Pipfile", "Pipfile", 0.9, 3),
            File("Project config", "pyproject.toml", 0.9, 3),
            Content("Python shebang", r"\A#!.*\bpython\b", 0.8, 2),
            Content("Python 3 shebang", r"\A#!.*\bpython3\b", 0.85, 2),
            Content("Python imports", r"(?m)^\s*(import|from)\s+\w+", 0.7, 2),
            Content("Function definition", r"(?m)^\s*def\s+\w+\s*\(", 0.6, 2),
        ],
    ),
    (
        "rust",
        &[
            File("Rust files", "*.rs", 0.95, 1),
            File("Cargo manifest", "Cargo.toml", 0.95, 3),
            File("Cargo lockfile", "Cargo.lock", 0.9, 3),
            Content("Attributes", r"#\[\w+(\(.*\))?\]", 0.8, 2),
            Content("Use declarations", r"(?m)^\s*use\s+\w+(::\w+)*", 0.7, 2),
            Content("Function definition", r"(?m)^\s*(pub\s+)?fn\s+\w+", 0.6, 2),
        ],
    ),
    (
        "go",
        &[
            File("Go files", "*.go", 0.95, 1),
            File("Go module", "go.mod", 0.95, 3),
            File("Go checksums", "go.sum", 0.9, 3),
            Content("Package clause", r"(?m)^package\s+\w+\s*$", 0.8, 2),
            Content("Import block", r"(?m)^import\s+\(", 0.7, 2),
            Content("Function definition", r"(?m)^func\s+", 0.6, 2),
        ],
    ),
    (
        "java",
        &[
            File("Java files", "*.java", 0.95, 1),
            File("Class files", "*.class", 0.8, 1),
            File("Maven POM", "pom.xml", 0.9, 3),
            File("Gradle build", "build.gradle", 0.9, 3),
            File("Gradle Kotlin build", "build.gradle.kts", 0.9, 3),
            Content("Package declaration", r"(?m)^package\s+[\w.]+;", 0.8, 2),
            Content("Import statement", r"(?m)^import\s+[\w.]+(\.\*)?;", 0.7, 2),
            Content("Public class", r"public\s+class\s+\w+", 0.8, 2),
        ],
    ),
    (
        "csharp",
        &[
            File("C# files", "*.cs", 0.95, 1),
            File("Project file", "*.csproj", 0.9, 3),
            File("Solution file", "*.sln", 0.85, 3),
            Content("Using directive", r"(?m)^using\s+[\w.]+;", 0.7, 2),
            Content("Namespace", r"(?m)^\s*namespace\s+[\w.]+", 0.8, 2),
        ],
    ),
    (
        "php",
        &[
            File("PHP files", "*.php", 0.95, 1),
            File("Composer manifest", "composer.json", 0.9, 3),
            Content("PHP open tag", r"<\?php", 0.9, 2),
        ],
    ),
    (
        "ruby",
        &[
            File("Ruby files", "*.rb", 0.95, 1),
            File("Gemfile", "Gemfile", 0.9, 3),
            Content("Ruby shebang", r"\A#!.*\bruby\b", 0.8, 2),
            Content("Require", r#"(?m)^\s*require\s+['"]"#, 0.7, 2),
        ],
    ),
    (
        "cpp",
        &[
            File("C++ files", "*.cpp", 0.95, 1),
            File("C++ files", "*.cc", 0.9, 1),
            File("C++ files", "*.cxx", 0.9, 1),
            File("C++ headers", "*.hpp", 0.9, 1),
            File("CMake lists", "CMakeLists.txt", 0.8, 3),
            Content("System include", r"#include\s*<\w+>", 0.7, 2),
        ],
    ),
    (
        "c",
        &[
            File("C files", "*.c", 0.95, 1),
            File("C headers", "*.h", 0.8, 1),
            File("Makefile", "Makefile", 0.7, 3),
        ],
    ),
];

static DEFAULT_RULES: LazyLock<LanguageRules> = LazyLock::new(|| {
    let mut registry = LanguageRules::new();
    for (language, specs) in BUILTIN_RULES {
        let rules = specs
            .iter()
            .map(|spec| match spec {
                File(name, pattern, confidence, priority) => {
                    DetectionRule::file(*name, pattern, *confidence, *priority)
                }
                Content(name, pattern, confidence, priority) => {
                    DetectionRule::content(*name, pattern, *confidence, *priority)
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .expect("valid built-in rule");
        registry.register(*language, rules);
    }
    registry
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtin_languages() {
        let rules = LanguageRules::with_defaults();
        assert_eq!(rules.len(), 11);
        for language in ["javascript", "typescript", "python", "rust", "go", "c", "cpp"] {
            assert!(rules.get(language).is_some(), "missing {}", language);
        }
    }

    #[test]
    fn test_file_rule_matches_basename() {
        let rule = DetectionRule::file("Rust files", "*.rs", 0.95, 1).unwrap();
        assert!(rule.matches_file_name("main.rs"));
        assert!(!rule.matches_file_name("main.rsx"));
        assert!(!rule.matches_content("fn main() {}"));
    }

    #[test]
    fn test_content_rule_is_line_anchored() {
        let rule = DetectionRule::content("Go package", r"(?m)^package\s+\w+\s*$", 0.8, 2).unwrap();
        assert!(rule.matches_content("// comment\npackage main\n"));
        assert!(!rule.matches_content("package com.example;"));
    }

    #[test]
    fn test_shebang_only_matches_first_line() {
        let rules = LanguageRules::with_defaults();
        let python = rules.get("python").unwrap();
        let shebang = python
            .rules
            .iter()
            .find(|r| r.name == "Python shebang")
            .unwrap();
        assert!(shebang.matches_content("#!/usr/bin/env python\nprint(1)"));
        assert!(!shebang.matches_content("echo\n#!/usr/bin/env python"));
    }

    #[test]
    fn test_register_appends_to_existing_language() {
        let mut rules = LanguageRules::new();
        rules.register("zig", vec![DetectionRule::file("Zig", "*.zig", 0.9, 1).unwrap()]);
        rules.register(
            "zig",
            vec![DetectionRule::file("Build", "build.zig", 0.95, 3).unwrap()],
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("zig").unwrap().rules.len(), 2);
    }

    #[test]
    fn test_invalid_patterns_are_errors() {
        assert!(matches!(
            DetectionRule::file("bad", "a[", 0.5, 1),
            Err(RuleError::Glob { .. })
        ));
        assert!(matches!(
            DetectionRule::content("bad", "(", 0.5, 1),
            Err(RuleError::Regex { .. })
        ));
    }
}
