use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const LICENSE_FILES: &[&str] = &["LICENSE", "LICENSE.txt", "LICENSE.md", "COPYING", "COPYRIGHT"];

// Whole words only: "SUBMITTED" in the Apache text must not read as MIT.
static MIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bMIT\b").expect("valid regex"));
static APACHE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAPACHE\b").expect("valid regex"));
static GPL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bGPL\b").expect("valid regex"));
static BSD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bBSD\b").expect("valid regex"));

/// SPDX-style identifier from the first license file with a recognizable
/// keyword, or an empty string.
pub fn detect_license(root: &Path) -> String {
    for name in LICENSE_FILES {
        let Ok(content) = std::fs::read_to_string(root.join(name)) else {
            continue;
        };
        if let Some(license) = classify(&content.to_uppercase()) {
            debug!(file = *name, license, "License detected");
            return license.to_string();
        }
    }
    String::new()
}

fn classify(upper: &str) -> Option<&'static str> {
    if MIT_RE.is_match(upper) {
        Some("MIT")
    } else if APACHE_RE.is_match(upper) {
        Some("Apache-2.0")
    } else if GPL_RE.is_match(upper) || upper.contains("GENERAL PUBLIC LICENSE") {
        if upper.contains("VERSION 3") {
            Some("GPL-3.0")
        } else if upper.contains("VERSION 2") {
            Some("GPL-2.0")
        } else {
            Some("GPL")
        }
    } else if BSD_RE.is_match(upper) {
        Some("BSD")
    } else {
        None
    }
}
