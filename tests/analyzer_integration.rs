//! Integration tests for the repository analyzer
//!
//! These tests run complete analyses over temporary repositories and the
//! checked-in fixtures, covering build system classification, dependency
//! extraction and the confidence contract of language detection.

use nixpack::detection::{AnalysisError, RepositoryAnalyzer};
use nixpack::{BuildSystemId, DependencyType};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn create_go_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "go.mod",
        "module demo\n\ngo 1.20\n\nrequire example.com/foo/bar v1.0.0\n",
    );
    dir
}

fn create_polyglot_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "package.json",
        r#"{
  "name": "web",
  "version": "1.4.0",
  "dependencies": { "express": "^4.18.0" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
    );
    write(root, "index.js", "const express = require('express');\n");
    write(root, "requirements.txt", "flask==2.3.0\nrequests>=2.31\n");
    write(root, "app.py", "import flask\n\ndef main():\n    pass\n");
    dir
}

#[test]
fn test_go_module_repository() {
    let repo = create_go_repo();
    let analysis = RepositoryAnalyzer::default().analyze(repo.path()).unwrap();

    assert_eq!(analysis.build_system, BuildSystemId::GoModules);
    assert_eq!(analysis.build_system.to_string(), "go-modules");
    assert_eq!(analysis.dependencies.len(), 1);

    let dep = &analysis.dependencies[0];
    assert_eq!(dep.name, "example.com/foo/bar");
    assert_eq!(dep.version, "v1.0.0");
    assert_eq!(dep.dep_type, DependencyType::Runtime);
    assert!(!dep.system);
}

#[test]
fn test_npm_and_python_repository() {
    let repo = create_polyglot_repo();
    let analysis = RepositoryAnalyzer::default().analyze(repo.path()).unwrap();

    let languages: BTreeSet<&str> = analysis
        .languages
        .iter()
        .map(|l| l.language.as_str())
        .collect();
    assert!(analysis.languages.len() >= 2);
    assert!(languages.contains("javascript"), "languages: {:?}", languages);
    assert!(languages.contains("python"), "languages: {:?}", languages);

    // dependencies come from the manifest of the classified build system
    let names: Vec<&str> = analysis.dependencies.iter().map(|d| d.name.as_str()).collect();
    match analysis.build_system {
        BuildSystemId::Npm => {
            assert!(names.contains(&"express"));
            assert!(analysis
                .dependencies
                .iter()
                .any(|d| d.name == "jest" && d.dep_type == DependencyType::Dev));
        }
        BuildSystemId::Pip => {
            assert!(names.contains(&"flask"));
            assert!(names.contains(&"requests"));
        }
        other => panic!("unexpected build system {}", other),
    }
}

#[test]
fn test_confidence_bounds() {
    let repo = create_polyglot_repo();
    let analysis = RepositoryAnalyzer::default().analyze(repo.path()).unwrap();

    assert!(!analysis.languages.is_empty());
    for result in &analysis.languages {
        assert!(
            (0.0..=1.0).contains(&result.confidence),
            "{} has confidence {}",
            result.language,
            result.confidence
        );
    }

    let max = analysis
        .languages
        .iter()
        .map(|l| l.confidence)
        .fold(f64::MIN, f64::max);
    assert!((max - 1.0).abs() < 1e-9);
}

#[test]
fn test_analysis_is_idempotent() {
    let repo = create_polyglot_repo();
    let analyzer = RepositoryAnalyzer::default();

    let first = analyzer.analyze(repo.path()).unwrap();
    for _ in 0..3 {
        let again = analyzer.analyze(repo.path()).unwrap();
        assert_eq!(again.build_system, first.build_system);

        let first_languages: BTreeSet<_> = first.languages.iter().map(|l| &l.language).collect();
        let again_languages: BTreeSet<_> = again.languages.iter().map(|l| &l.language).collect();
        assert_eq!(again_languages, first_languages);
        assert_eq!(again.language, first.language);
    }
}

#[test]
fn test_rust_fixture() {
    let analysis = RepositoryAnalyzer::default()
        .analyze(&fixture("rust-project"))
        .unwrap();

    assert_eq!(analysis.project_name, "rust-project");
    assert_eq!(analysis.build_system, BuildSystemId::Cargo);
    assert_eq!(analysis.language, "rust");
    assert_eq!(analysis.version.as_deref(), Some("0.1.0"));

    let runtime: Vec<&str> = analysis
        .dependencies
        .iter()
        .filter(|d| d.dep_type == DependencyType::Runtime)
        .map(|d| d.name.as_str())
        .collect();
    assert!(runtime.contains(&"serde"));
    assert!(runtime.contains(&"tokio"));
    assert!(analysis
        .dependencies
        .iter()
        .any(|d| d.name == "tempfile" && d.dep_type == DependencyType::Dev));
}

#[test]
fn test_excluded_directories_are_ignored() {
    let repo = create_go_repo();
    write(repo.path(), "node_modules/left-pad/index.js", "module.exports = 1;\n");
    write(repo.path(), "node_modules/left-pad/package.json", "{}");

    let analysis = RepositoryAnalyzer::default().analyze(repo.path()).unwrap();
    assert!(analysis.languages.iter().all(|l| l.language != "javascript"));
    assert_eq!(analysis.build_system, BuildSystemId::GoModules);
}

#[test]
fn test_missing_repository() {
    let result = RepositoryAnalyzer::default().analyze(Path::new("/nonexistent/nixpack/repo"));
    assert!(matches!(result, Err(AnalysisError::PathNotFound(_))));
}
