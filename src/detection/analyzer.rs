//! Repository analyzer
//!
//! Runs one complete analysis: collect files, detect languages, classify the
//! build system, extract dependencies and probe metadata. The whole call shares
//! a single [`Deadline`]; if it expires the call fails without a partial result.

use super::collector::FileCollector;
use super::detector::LanguageDetector;
use super::rules::LanguageRules;
use super::types::{AnalysisOptions, Deadline, FileRecord, LanguageResult, RepoAnalysis};
use crate::build_systems::BuildSystemRegistry;
use crate::dependencies::{self, ExtractError};
use crate::metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: ignore::Error,
    },
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
    #[error("Dependency extraction failed: {0}")]
    Dependencies(#[from] ExtractError),
}

pub struct RepositoryAnalyzer {
    options: AnalysisOptions,
    rules: Arc<LanguageRules>,
    build_systems: Arc<BuildSystemRegistry>,
}

impl RepositoryAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self::with_registries(
            options,
            Arc::new(LanguageRules::with_defaults()),
            Arc::new(BuildSystemRegistry::with_defaults()),
        )
    }

    pub fn with_registries(
        options: AnalysisOptions,
        rules: Arc<LanguageRules>,
        build_systems: Arc<BuildSystemRegistry>,
    ) -> Self {
        Self {
            options,
            rules,
            build_systems,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn build_systems(&self) -> &Arc<BuildSystemRegistry> {
        &self.build_systems
    }

    /// Ranked language results for the repository at `path`
    pub fn detect_languages(&self, path: &Path) -> Result<Vec<LanguageResult>, AnalysisError> {
        let root = validate_root(path)?;
        let deadline = Deadline::new(self.options.timeout);
        let files = self.collect(&root, &deadline)?;
        self.detect(&files, &deadline)
    }

    pub fn analyze(&self, path: &Path) -> Result<RepoAnalysis, AnalysisError> {
        self.analyze_with_deadline(path, &Deadline::new(self.options.timeout))
    }

    /// Same as [`analyze`](Self::analyze) with a caller-owned deadline, which
    /// lets the caller cancel the run from another thread.
    pub fn analyze_with_deadline(
        &self,
        path: &Path,
        deadline: &Deadline,
    ) -> Result<RepoAnalysis, AnalysisError> {
        let start = Instant::now();
        let root = validate_root(path)?;

        info!(repo = %root.display(), "Analyzing repository");

        let files = self.collect(&root, deadline)?;
        let languages = self.detect(&files, deadline)?;

        let classification = self.build_systems.classify(&files);
        debug!(
            build_system = %classification.build_system,
            build_files = classification.build_files.len(),
            "Build system classified"
        );

        let dependencies = dependencies::extract_dependencies(&root, classification.build_system)?;

        let language = languages
            .first()
            .map(|r| r.language.clone())
            .or_else(|| metadata::fallback_language(&files))
            .unwrap_or_else(|| "unknown".to_string());

        let analysis = RepoAnalysis {
            project_name: metadata::project_name(&root),
            build_system: classification.build_system,
            language,
            languages,
            dependencies,
            build_files: classification.build_files,
            has_tests: metadata::has_tests(&files),
            license: metadata::detect_license(&root),
            description: metadata::extract_description(&root),
            version: metadata::probe_version(&root),
            source_url: None,
            local_path: root.clone(),
        };

        if deadline.expired() {
            return Err(AnalysisError::Timeout(deadline.limit()));
        }

        info!(
            repo = %root.display(),
            files = files.len(),
            language = %analysis.language,
            build_system = %analysis.build_system,
            dependencies = analysis.dependencies.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Repository analysis complete"
        );

        Ok(analysis)
    }

    fn collect(&self, root: &Path, deadline: &Deadline) -> Result<Vec<FileRecord>, AnalysisError> {
        FileCollector::new(&self.options)?.collect(root, deadline)
    }

    fn detect(
        &self,
        files: &[FileRecord],
        deadline: &Deadline,
    ) -> Result<Vec<LanguageResult>, AnalysisError> {
        LanguageDetector::new(Arc::clone(&self.rules)).detect(
            files,
            self.options.min_confidence,
            deadline,
        )
    }
}

impl Default for RepositoryAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

fn validate_root(path: &Path) -> Result<PathBuf, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(AnalysisError::NotADirectory(path.to_path_buf()));
    }
    path.canonicalize().map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })
}
