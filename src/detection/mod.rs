pub mod aggregator;
pub mod analyzer;
pub mod collector;
pub mod detector;
pub mod rules;
pub mod scanner;
pub mod types;

pub use aggregator::ConfidenceAggregator;
pub use analyzer::{AnalysisError, RepositoryAnalyzer};
pub use collector::{FileCollector, PathFilter};
pub use detector::LanguageDetector;
pub use rules::{DetectionRule, LanguageRuleSet, LanguageRules, RuleError};
pub use scanner::{EvidenceScanner, Finding};
pub use types::{
    AnalysisOptions, Deadline, Evidence, EvidenceKind, FileRecord, LanguageResult, RepoAnalysis,
};
