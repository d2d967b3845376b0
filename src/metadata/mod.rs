//! Metadata probes
//!
//! Cheap, best-effort facts about a repository that are not language or
//! build-system detection: name, license, description, version and whether
//! tests exist. None of these fail; an unreadable file just yields nothing.

mod license;
mod readme;
mod version;

pub use license::detect_license;
pub use readme::extract_description;
pub use version::probe_version;

use crate::detection::FileRecord;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

const TEST_DIR_NAMES: &[&str] = &["test", "tests", "spec", "specs", "__tests__"];

const TEST_FILE_PATTERNS: &[&str] = &[
    "*_test.go",
    "*_test.py",
    "test_*.py",
    "*.test.js",
    "*.spec.js",
    "*.test.ts",
    "*.spec.ts",
    "*_test.rs",
];

static TEST_FILES: LazyLock<GlobSet> = LazyLock::new(|| {
    let mut builder = GlobSetBuilder::new();
    for pattern in TEST_FILE_PATTERNS {
        builder.add(Glob::new(pattern).expect("valid glob"));
    }
    builder.build().expect("valid glob set")
});

/// Source extensions counted when no detection rule produced a result
const SOURCE_EXTENSIONS: &[(&str, &str)] = &[
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("rs", "rust"),
    ("go", "go"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("sh", "shell"),
    ("rb", "ruby"),
    ("php", "php"),
    ("cs", "csharp"),
    ("fs", "fsharp"),
    ("ml", "ocaml"),
    ("hs", "haskell"),
    ("nim", "nim"),
    ("zig", "zig"),
];

/// Basename of the repository root
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown-project".to_string())
}

pub fn has_tests(files: &[FileRecord]) -> bool {
    files.iter().any(|record| {
        let Some(name) = record.file_name() else {
            return false;
        };
        let lower = name.to_lowercase();
        TEST_DIR_NAMES.contains(&lower.as_str())
            || (!record.is_dir && TEST_FILES.is_match(&lower))
    })
}

/// Most common source extension's language. Ties go to the language id
/// that sorts first so the answer does not depend on walk order.
pub fn fallback_language(files: &[FileRecord]) -> Option<String> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for record in files.iter().filter(|r| !r.is_dir) {
        let Some(ext) = record.extension() else {
            continue;
        };
        if let Some((_, language)) = SOURCE_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
            *counts.entry(*language).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then_with(|| lb.cmp(la)))
        .map(|(language, _)| language.to_string())
}
