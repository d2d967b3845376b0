//! nixpack - repository analysis and Nix derivation synthesis
//!
//! Scans a source repository to detect its languages, build system,
//! declared dependencies and project metadata, then produces a Nix
//! derivation for it. Derivations come from built-in templates, from a
//! completion model, or from a template refined by a model (hybrid mode).
//!
//! # Example Usage
//!
//! ```no_run
//! use nixpack::{AnalysisOptions, PackageRequest, PackagingService};
//!
//! # async fn run() -> Result<(), nixpack::GenerationError> {
//! let service = PackagingService::new(AnalysisOptions::default());
//! let result = service
//!     .package(&PackageRequest::new("/path/to/repo").with_output_dir("nix"))
//!     .await?;
//!
//! println!("{}", result.derivation);
//! for warning in &result.validation_warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detection`]: file collection, language detection and repository analysis
//! - [`build_systems`]: build system classification and per-system properties
//! - [`dependencies`]: manifest parsers producing [`Dependency`] lists
//! - [`metadata`]: license, description and version extraction
//! - [`templates`]: built-in derivation templates and rendering
//! - [`validation`]: heuristic checks on generated derivations
//! - [`llm`]: completion clients
//! - [`generation`]: template, AI and hybrid generation pipelines

pub mod build_systems;
pub mod cli;
pub mod config;
pub mod dependencies;
pub mod detection;
pub mod generation;
pub mod llm;
pub mod metadata;
pub mod templates;
pub mod util;
pub mod validation;

pub use build_systems::{BuildSystemId, BuildSystemRegistry};
pub use config::{ConfigError, NixpackConfig};
pub use dependencies::{Dependency, DependencyType};
pub use detection::{
    AnalysisError, AnalysisOptions, LanguageResult, RepoAnalysis, RepositoryAnalyzer,
};
pub use generation::{
    GenerationError, GenerationMode, HybridEnhancer, PackageRequest, PackageResult,
    PackagingService,
};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient, MockResponse};
pub use templates::{DerivationTemplate, TemplateRegistry, TemplateRenderer};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use validation::DerivationValidator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
