//! Core types shared by the collector, scanner and analyzer

use crate::build_systems::BuildSystemId;
use crate::dependencies::Dependency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_MAX_FILES: usize = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;

/// A single entry produced by the file collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the repository root
    pub relative_path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

impl FileRecord {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Lowercased extension without the leading dot
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Relative path with forward slashes, stable across platforms
    pub fn relative_str(&self) -> String {
        normalize_separators(&self.relative_path)
    }
}

pub(crate) fn normalize_separators(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Kind of observation that produced a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    FileExtension,
    ContentPattern,
    ConfigFile,
    PackageManager,
    Shebang,
    ImportStatement,
    BuildFile,
    Documentation,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::FileExtension => "file_extension",
            EvidenceKind::ContentPattern => "content_pattern",
            EvidenceKind::ConfigFile => "config_file",
            EvidenceKind::PackageManager => "package_manager",
            EvidenceKind::Shebang => "shebang",
            EvidenceKind::ImportStatement => "import_statement",
            EvidenceKind::BuildFile => "build_file",
            EvidenceKind::Documentation => "documentation",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weighted observation linking a file to a candidate language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    /// Relative path of the file the observation was made on
    pub source: String,
    pub confidence: f64,
    pub detail: String,
}

/// Per-language detection outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageResult {
    pub language: String,
    /// Score normalized against the strongest language of the run
    pub confidence: f64,
    /// Sum of all evidence contributions before normalization
    pub raw_score: f64,
    pub evidence: Vec<Evidence>,
    pub files: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Options controlling a single analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub max_files: usize,
    pub max_depth: Option<usize>,
    pub timeout: Duration,
    pub include_hidden: bool,
    pub min_confidence: f64,
    pub exclude_patterns: Vec<String>,
    /// When non-empty, only files matching one of these globs are collected
    pub include_patterns: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_depth: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            include_hidden: false,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            exclude_patterns: Self::default_excludes(),
            include_patterns: Vec::new(),
        }
    }
}

impl AnalysisOptions {
    pub fn default_excludes() -> Vec<String> {
        [
            "node_modules",
            "vendor",
            "target",
            ".git",
            "build",
            "dist",
            "__pycache__",
            ".next",
            ".nuxt",
        ]
        .iter()
        .map(|dir| format!("**/{}", dir))
        .collect()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }
}

/// Time budget for one analysis call, shared by the collector and the scanner
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Marks the deadline as expired for every clone sharing it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn expired(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.started.elapsed() >= self.limit
    }
}

/// Everything learned about a repository in one analysis call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoAnalysis {
    pub project_name: String,
    pub build_system: BuildSystemId,
    pub language: String,
    pub languages: Vec<LanguageResult>,
    pub dependencies: Vec<Dependency>,
    pub build_files: Vec<String>,
    pub has_tests: bool,
    pub license: String,
    pub description: String,
    pub version: Option<String>,
    pub source_url: Option<String>,
    pub local_path: PathBuf,
}

impl RepoAnalysis {
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn system_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.system)
    }
}
