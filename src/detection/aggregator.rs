//! Confidence aggregation
//!
//! Partial aggregators are built per worker and merged. Merging concatenates
//! evidence per language in order, so the merge is associative and the final
//! totals are computed once, in file order, during [`ConfidenceAggregator::finalize`].

use super::scanner::Finding;
use super::types::{Evidence, LanguageResult};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ConfidenceAggregator {
    evidence: BTreeMap<String, Vec<Evidence>>,
}

impl ConfidenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, findings: Vec<Finding>) {
        for finding in findings {
            self.evidence
                .entry(finding.language)
                .or_default()
                .push(finding.evidence);
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (language, evidence) in other.evidence {
            self.evidence.entry(language).or_default().extend(evidence);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty()
    }

    /// Raw additive score for a language
    pub fn total(&self, language: &str) -> f64 {
        self.evidence
            .get(language)
            .map(|ev| ev.iter().map(|e| e.confidence).sum())
            .unwrap_or(0.0)
    }

    /// Normalizes by the strongest language, drops results under
    /// `min_confidence` and sorts by confidence, then language id.
    pub fn finalize(self, min_confidence: f64) -> Vec<LanguageResult> {
        let totals: Vec<(String, f64)> = self
            .evidence
            .keys()
            .map(|language| (language.clone(), self.total(language)))
            .collect();

        let max = totals.iter().map(|(_, t)| *t).fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return Vec::new();
        }

        let mut evidence = self.evidence;
        let mut results: Vec<LanguageResult> = totals
            .into_iter()
            .filter_map(|(language, total)| {
                let confidence = total / max;
                if confidence < min_confidence {
                    return None;
                }

                let evidence = evidence.remove(&language).unwrap_or_default();
                let mut seen = HashSet::new();
                let files: Vec<String> = evidence
                    .iter()
                    .filter(|e| seen.insert(e.source.clone()))
                    .map(|e| e.source.clone())
                    .collect();

                let mut metadata = BTreeMap::new();
                metadata.insert("file_count".to_string(), files.len().into());
                metadata.insert("evidence_count".to_string(), evidence.len().into());

                Some(LanguageResult {
                    language,
                    confidence,
                    raw_score: total,
                    evidence,
                    files,
                    metadata,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.language.cmp(&b.language))
        });
        results
    }
}
