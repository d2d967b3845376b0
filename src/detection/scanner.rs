//! Per-file evidence scanning
//!
//! [`EvidenceScanner::scan_file`] is a pure function of one file: it returns
//! the (language, evidence) findings for that file and touches no shared state.

use super::rules::LanguageRules;
use super::types::{Evidence, EvidenceKind, FileRecord};
use std::fs::File;
use std::io::{self, Read};
use std::sync::Arc;

/// Files at or above this size are never content-scanned
pub const MAX_CONTENT_SCAN_BYTES: u64 = 1024 * 1024;

/// Size of the content excerpt matched against content rules
pub const EXCERPT_BYTES: u64 = 8 * 1024;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt",
    "md",
    "json",
    "yaml",
    "yml",
    "toml",
    "ini",
    "cfg",
    "conf",
    "js",
    "ts",
    "py",
    "go",
    "rs",
    "java",
    "cpp",
    "c",
    "h",
    "hpp",
    "cs",
    "php",
    "rb",
    "sh",
    "bash",
    "dockerfile",
    "gitignore",
    "gitattributes",
];

/// One observation attributed to a language
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub language: String,
    pub evidence: Evidence,
}

#[derive(Debug, Clone)]
pub struct EvidenceScanner {
    rules: Arc<LanguageRules>,
}

impl EvidenceScanner {
    pub fn new(rules: Arc<LanguageRules>) -> Self {
        Self { rules }
    }

    /// Text files are recognized by extension; files without one count as text
    pub fn is_text_file(record: &FileRecord) -> bool {
        match record.extension() {
            None => true,
            Some(ext) => TEXT_EXTENSIONS.contains(&ext.as_str()),
        }
    }

    pub fn scan_file(&self, record: &FileRecord) -> io::Result<Vec<Finding>> {
        let mut findings = Vec::new();
        if record.is_dir {
            return Ok(findings);
        }

        let source = record.relative_str();
        let name = record.file_name().unwrap_or_default();

        for set in self.rules.iter() {
            for rule in &set.rules {
                if rule.matches_file_name(name) {
                    findings.push(Finding {
                        language: set.language.clone(),
                        evidence: Evidence {
                            kind: EvidenceKind::FileExtension,
                            source: source.clone(),
                            confidence: rule.confidence,
                            detail: format!(
                                "File matches pattern: {}",
                                rule.file_pattern.as_deref().unwrap_or_default()
                            ),
                        },
                    });
                }
            }
        }

        if Self::is_text_file(record) && record.size < MAX_CONTENT_SCAN_BYTES {
            let excerpt = read_excerpt(record)?;
            for set in self.rules.iter() {
                for rule in &set.rules {
                    if rule.matches_content(&excerpt) {
                        findings.push(Finding {
                            language: set.language.clone(),
                            evidence: Evidence {
                                kind: EvidenceKind::ContentPattern,
                                source: source.clone(),
                                confidence: rule.confidence,
                                detail: format!("Content matches pattern: {}", rule.name),
                            },
                        });
                    }
                }
            }
        }

        Ok(findings)
    }
}

fn read_excerpt(record: &FileRecord) -> io::Result<String> {
    let mut buf = Vec::with_capacity(EXCERPT_BYTES as usize);
    File::open(&record.path)?
        .take(EXCERPT_BYTES)
        .read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
