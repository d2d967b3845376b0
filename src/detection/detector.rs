//! Parallel language detection over a collected file set

use super::aggregator::ConfidenceAggregator;
use super::analyzer::AnalysisError;
use super::rules::LanguageRules;
use super::scanner::EvidenceScanner;
use super::types::{Deadline, FileRecord, LanguageResult};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LanguageDetector {
    scanner: EvidenceScanner,
}

impl LanguageDetector {
    pub fn new(rules: Arc<LanguageRules>) -> Self {
        Self {
            scanner: EvidenceScanner::new(rules),
        }
    }

    /// Scans `files` in parallel and folds the findings into ranked results.
    ///
    /// Each worker builds its own partial aggregator; partials are merged in
    /// file order. Unreadable files are logged and skipped.
    pub fn detect(
        &self,
        files: &[FileRecord],
        min_confidence: f64,
        deadline: &Deadline,
    ) -> Result<Vec<LanguageResult>, AnalysisError> {
        let aggregator = files
            .par_iter()
            .try_fold(ConfidenceAggregator::new, |mut agg, record| {
                if deadline.expired() {
                    return Err(AnalysisError::Timeout(deadline.limit()));
                }
                match self.scanner.scan_file(record) {
                    Ok(findings) => agg.absorb(findings),
                    Err(err) => {
                        warn!(
                            path = %record.path.display(),
                            error = %err,
                            "Failed to scan file, skipping"
                        );
                    }
                }
                Ok(agg)
            })
            .try_reduce(ConfidenceAggregator::new, |a, b| Ok(a.merge(b)))?;

        let results = aggregator.finalize(min_confidence);

        debug!(
            files = files.len(),
            languages = results.len(),
            top = results.first().map(|r| r.language.as_str()).unwrap_or("none"),
            "Language detection finished"
        );

        Ok(results)
    }
}
