//! Derivation generation
//!
//! Turns a [`RepoAnalysis`](crate::detection::RepoAnalysis) into Nix text in
//! one of three modes: template rendering, full AI generation, or template
//! output refined by a completion client with fallback to the template.

mod docs;
mod enhancer;
mod mappings;
mod prompt;
mod service;

pub use docs::{
    documentation_queries, gather_documentation, DocumentationSource, StaticDocumentation,
};
pub use enhancer::HybridEnhancer;
pub use mappings::{suggest_mappings, COMMON_MAPPINGS};
pub(crate) use mappings::{lookup as nixpkgs_attribute, BUILD_TOOLS, TOOLCHAIN_PROVIDED};
pub use prompt::{enhancement_prompt, extract_derivation, generation_prompt};
pub use service::{
    GenerationError, GenerationMode, PackageRequest, PackageResult, PackagingService,
};
