//! Template refinement through a completion client
//!
//! The enhancer never fails: any client error or an empty extraction returns
//! the template output unchanged.

use super::docs::{documentation_queries, gather_documentation, DocumentationSource};
use super::prompt::{enhancement_prompt, extract_derivation};
use crate::build_systems::BuildSystemRegistry;
use crate::detection::RepoAnalysis;
use crate::llm::LLMClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct HybridEnhancer {
    client: Arc<dyn LLMClient>,
    documentation: Option<Arc<dyn DocumentationSource>>,
    build_systems: Arc<BuildSystemRegistry>,
}

impl HybridEnhancer {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            documentation: None,
            build_systems: Arc::new(BuildSystemRegistry::with_defaults()),
        }
    }

    pub fn with_documentation(mut self, documentation: Arc<dyn DocumentationSource>) -> Self {
        self.documentation = Some(documentation);
        self
    }

    pub fn with_build_systems(mut self, build_systems: Arc<BuildSystemRegistry>) -> Self {
        self.build_systems = build_systems;
        self
    }

    /// Documentation sections for the analysis, empty without a source
    pub async fn documentation(&self, analysis: &RepoAnalysis) -> String {
        let Some(source) = self.documentation.as_deref() else {
            return String::new();
        };

        let queries =
            documentation_queries(analysis.build_system, &self.build_systems, &analysis.language);
        gather_documentation(source, &queries).await
    }

    pub async fn enhance(&self, analysis: &RepoAnalysis, template_output: &str) -> String {
        let documentation = self.documentation(analysis).await;
        let prompt = enhancement_prompt(analysis, template_output, &documentation);

        debug!(
            client = self.client.name(),
            prompt_chars = prompt.len(),
            has_documentation = !documentation.is_empty(),
            "Requesting derivation enhancement"
        );

        let response = match self.client.complete(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    client = self.client.name(),
                    error = %e,
                    transient = e.is_transient(),
                    "Enhancement failed, using template output"
                );
                return template_output.to_string();
            }
        };

        let derivation = extract_derivation(&response);
        if derivation.is_empty() {
            warn!(
                client = self.client.name(),
                "Enhancement returned no derivation, using template output"
            );
            return template_output.to_string();
        }

        info!(
            project = %analysis.project_name,
            chars = derivation.len(),
            "Derivation enhanced"
        );
        derivation
    }
}

impl std::fmt::Debug for HybridEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridEnhancer")
            .field("client", &self.client.name())
            .field("has_documentation", &self.documentation.is_some())
            .finish()
    }
}
