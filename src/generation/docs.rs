//! Auxiliary packaging documentation for prompts

use crate::build_systems::{BuildSystemId, BuildSystemRegistry};
use crate::llm::BackendError;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Answers free-text documentation queries about nixpkgs conventions
#[async_trait]
pub trait DocumentationSource: Send + Sync {
    async fn query(&self, query: &str) -> Result<String, BackendError>;
}

/// Fixed answers keyed by query text. Unknown queries answer empty.
#[derive(Debug, Clone, Default)]
pub struct StaticDocumentation {
    entries: HashMap<String, String>,
}

impl StaticDocumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, query: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(query.into(), text.into());
        self
    }
}

#[async_trait]
impl DocumentationSource for StaticDocumentation {
    async fn query(&self, query: &str) -> Result<String, BackendError> {
        Ok(self.entries.get(query).cloned().unwrap_or_default())
    }
}

/// Build-system topics first, then one language topic when the language has one
pub fn documentation_queries(
    build_system: BuildSystemId,
    registry: &BuildSystemRegistry,
    language: &str,
) -> Vec<String> {
    let mut queries: Vec<String> = match registry.get(build_system) {
        Some(system) => system
            .documentation_queries()
            .iter()
            .map(|q| q.to_string())
            .collect(),
        None => vec!["mkDerivation standard build".to_string()],
    };

    let language_query = match language {
        "c" | "cpp" => Some("c cpp build inputs stdenv.cc"),
        "rust" => Some("rust buildRustPackage examples"),
        "go" => Some("golang buildGoModule examples"),
        "python" => Some("python buildPythonPackage setuptools"),
        "javascript" | "typescript" => Some("nodejs javascript typescript derivation"),
        _ => None,
    };
    queries.extend(language_query.map(str::to_string));

    queries
}

/// Runs each query against `source` and joins the non-empty answers into
/// `=== query ===` sections. Failed queries are skipped.
pub async fn gather_documentation(source: &dyn DocumentationSource, queries: &[String]) -> String {
    let mut sections = String::new();

    for query in queries {
        match source.query(query).await {
            Ok(text) if !text.trim().is_empty() => {
                sections.push_str(&format!("=== {} ===\n{}\n\n", query, text.trim_end()));
            }
            Ok(_) => debug!(query = %query, "Documentation query returned nothing"),
            Err(e) => debug!(query = %query, error = %e, "Documentation query failed"),
        }
    }

    sections
}
