//! Repository file collection
//!
//! Walks a repository once and produces a flat, deterministically ordered list
//! of [`FileRecord`]s. Excluded directories are pruned before descent, hidden
//! entries are skipped unless requested, and the walk honors both a file cap
//! and the run's [`Deadline`].

use super::analyzer::AnalysisError;
use super::types::{normalize_separators, AnalysisOptions, Deadline, FileRecord};
use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::Path;
use tracing::{debug, warn};

/// Compiled exclude/include matchers
#[derive(Debug, Clone)]
pub struct PathFilter {
    excludes: GlobSet,
    includes: Option<GlobSet>,
}

impl PathFilter {
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self, AnalysisError> {
        let excludes = build_globset(exclude)?;
        let includes = if include.is_empty() {
            None
        } else {
            Some(build_globset(include)?)
        };
        Ok(Self { excludes, includes })
    }

    /// Patterns are matched against both the relative path and the bare name,
    /// so `*.md` and `docs/**` behave the way gitignore users expect.
    pub fn is_excluded(&self, relative: &str) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        self.excludes.is_match(relative) || self.excludes.is_match(name)
    }

    pub fn is_included(&self, relative: &str) -> bool {
        match &self.includes {
            None => true,
            Some(set) => {
                let name = relative.rsplit('/').next().unwrap_or(relative);
                set.is_match(relative) || set.is_match(name)
            }
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, AnalysisError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| AnalysisError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| AnalysisError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

pub struct FileCollector {
    filter: PathFilter,
    max_files: usize,
    max_depth: Option<usize>,
    include_hidden: bool,
}

impl FileCollector {
    pub fn new(options: &AnalysisOptions) -> Result<Self, AnalysisError> {
        Ok(Self {
            filter: PathFilter::new(&options.exclude_patterns, &options.include_patterns)?,
            max_files: options.max_files,
            max_depth: options.max_depth,
            include_hidden: options.include_hidden,
        })
    }

    /// Collects records under `root`, sorted by relative path.
    ///
    /// Directory and file records both count toward the cap. Reaching the cap
    /// ends the walk early; an expired deadline or a traversal failure aborts
    /// it with an error.
    pub fn collect(&self, root: &Path, deadline: &Deadline) -> Result<Vec<FileRecord>, AnalysisError> {
        let prune_filter = self.filter.clone();
        let prune_root = root.to_path_buf();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .hidden(!self.include_hidden)
            .follow_links(false)
            .max_depth(self.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                match entry.path().strip_prefix(&prune_root) {
                    Ok(rel) => !prune_filter.is_excluded(&normalize_separators(rel)),
                    Err(_) => true,
                }
            })
            .build();

        let mut records = Vec::new();

        for result in walker {
            if deadline.expired() {
                warn!(
                    repo = %root.display(),
                    collected = records.len(),
                    "Deadline reached during file collection"
                );
                return Err(AnalysisError::Timeout(deadline.limit()));
            }

            let entry = result.map_err(|source| AnalysisError::Walk {
                path: root.to_path_buf(),
                source,
            })?;

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if !is_dir && !self.filter.is_included(&normalize_separators(&relative_path)) {
                continue;
            }

            if records.len() >= self.max_files {
                warn!(
                    repo = %root.display(),
                    max_files = self.max_files,
                    "Reached file limit, stopping collection"
                );
                break;
            }

            let metadata = entry.metadata().map_err(|source| AnalysisError::Walk {
                path: path.to_path_buf(),
                source,
            })?;

            records.push(FileRecord {
                path: path.to_path_buf(),
                relative_path,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                is_dir,
            });
        }

        records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        debug!(
            repo = %root.display(),
            records = records.len(),
            elapsed_ms = deadline.elapsed().as_millis() as u64,
            "File collection finished"
        );

        Ok(records)
    }
}
