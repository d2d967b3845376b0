//! Packaging service
//!
//! Orchestrates one packaging run: analyze the repository on the blocking
//! pool, generate the derivation in the requested mode, validate it, suggest
//! nixpkgs names for the dependencies and optionally write `<name>.nix`.

use super::docs::{documentation_queries, gather_documentation, DocumentationSource};
use super::enhancer::HybridEnhancer;
use super::mappings::suggest_mappings;
use super::prompt::{extract_derivation, generation_prompt};
use crate::build_systems::BuildSystemRegistry;
use crate::detection::{
    AnalysisError, AnalysisOptions, Deadline, LanguageRules, RepoAnalysis, RepositoryAnalyzer,
};
use crate::llm::{BackendError, LLMClient};
use crate::templates::{
    ContextBuilder, RenderError, TemplateError, TemplateRegistry, TemplateRenderer,
};
use crate::validation::DerivationValidator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Render the best matching built-in template
    #[default]
    Template,
    /// Ask the completion client for the whole derivation
    Ai,
    /// Render the template, then let the completion client refine it
    Hybrid,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Template => "template",
            GenerationMode::Ai => "ai",
            GenerationMode::Hybrid => "hybrid",
        }
    }

    pub fn needs_client(&self) -> bool {
        !matches!(self, GenerationMode::Template)
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "template" => Ok(GenerationMode::Template),
            "ai" => Ok(GenerationMode::Ai),
            "hybrid" => Ok(GenerationMode::Hybrid),
            other => Err(format!(
                "Unknown generation mode '{}'. Valid options: template, ai, hybrid",
                other
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Completion failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Generation mode '{0}' requires a completion client")]
    MissingClient(GenerationMode),
    #[error("Completion client returned no derivation")]
    EmptyResponse,
    #[error("Analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct PackageRequest {
    pub local_path: PathBuf,
    /// Directory receiving `<name>.nix`; nothing is written when unset
    pub output_dir: Option<PathBuf>,
    /// Overrides the directory-derived project name
    pub package_name: Option<String>,
    pub source_url: Option<String>,
    pub mode: GenerationMode,
}

impl PackageRequest {
    pub fn new(local_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            output_dir: None,
            package_name: None,
            source_url: None,
            mode: GenerationMode::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageResult {
    pub analysis: RepoAnalysis,
    pub derivation: String,
    /// Mode that actually produced the derivation
    pub mode: GenerationMode,
    pub template: Option<String>,
    pub validation_warnings: Vec<String>,
    pub nixpkgs_mappings: BTreeMap<String, String>,
    pub output_file: Option<PathBuf>,
}

pub struct PackagingService {
    options: AnalysisOptions,
    rules: Arc<LanguageRules>,
    build_systems: Arc<BuildSystemRegistry>,
    templates: Arc<TemplateRegistry>,
    renderer: TemplateRenderer,
    validator: DerivationValidator,
    client: Option<Arc<dyn LLMClient>>,
    documentation: Option<Arc<dyn DocumentationSource>>,
}

impl PackagingService {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            rules: Arc::new(LanguageRules::with_defaults()),
            build_systems: Arc::new(BuildSystemRegistry::with_defaults()),
            templates: Arc::new(TemplateRegistry::with_defaults()),
            renderer: TemplateRenderer::new(),
            validator: DerivationValidator::new(),
            client: None,
            documentation: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn LLMClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_documentation(mut self, documentation: Arc<dyn DocumentationSource>) -> Self {
        self.documentation = Some(documentation);
        self
    }

    pub fn with_templates(mut self, templates: Arc<TemplateRegistry>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_validator(mut self, validator: DerivationValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Analyzes `path` on the blocking pool. The run is cancelled and a
    /// timeout returned once the analysis timeout elapses.
    pub async fn analyze(&self, path: &Path) -> Result<RepoAnalysis, GenerationError> {
        let limit = self.options.timeout;
        let deadline = Deadline::new(limit);
        let analyzer = RepositoryAnalyzer::with_registries(
            self.options.clone(),
            Arc::clone(&self.rules),
            Arc::clone(&self.build_systems),
        );

        let path = path.to_path_buf();
        let worker_deadline = deadline.clone();
        let task = tokio::task::spawn_blocking(move || {
            analyzer.analyze_with_deadline(&path, &worker_deadline)
        });

        match tokio::time::timeout(limit, task).await {
            Ok(joined) => Ok(joined??),
            Err(_) => {
                deadline.cancel();
                Err(GenerationError::Timeout(limit))
            }
        }
    }

    pub async fn package(&self, request: &PackageRequest) -> Result<PackageResult, GenerationError> {
        let start = Instant::now();
        info!(
            repo = %request.local_path.display(),
            mode = %request.mode,
            "Packaging repository"
        );

        let mut analysis = self.analyze(&request.local_path).await?;
        if let Some(url) = &request.source_url {
            analysis = analysis.with_source_url(url.clone());
        }
        if let Some(name) = request.package_name.as_deref().filter(|n| !n.trim().is_empty()) {
            analysis = analysis.with_project_name(name);
        }

        let mut result = self.generate(analysis, request.mode).await?;

        if let Some(dir) = &request.output_dir {
            match write_derivation(dir, &result.analysis.project_name, &result.derivation) {
                Ok(path) => {
                    info!(path = %path.display(), "Derivation written");
                    result.output_file = Some(path);
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Failed to write derivation");
                }
            }
        }

        info!(
            project = %result.analysis.project_name,
            mode = %result.mode,
            warnings = result.validation_warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Packaging complete"
        );

        Ok(result)
    }

    /// Generates, validates and maps dependencies for an existing analysis
    pub async fn generate(
        &self,
        analysis: RepoAnalysis,
        mode: GenerationMode,
    ) -> Result<PackageResult, GenerationError> {
        let (derivation, effective_mode, template) = match (mode, self.client.as_ref()) {
            (GenerationMode::Template, _) => {
                let (text, key) = self.render_template(&analysis)?;
                (text, GenerationMode::Template, Some(key))
            }
            (GenerationMode::Ai, Some(client)) => {
                let text = self.generate_with_client(client.as_ref(), &analysis).await?;
                (text, GenerationMode::Ai, None)
            }
            (GenerationMode::Hybrid, Some(client)) => {
                let (text, key) = self.render_template(&analysis)?;
                let text = self.enhancer(Arc::clone(client)).enhance(&analysis, &text).await;
                (text, GenerationMode::Hybrid, Some(key))
            }
            (GenerationMode::Hybrid, None) => {
                warn!("No completion client configured, falling back to template generation");
                let (text, key) = self.render_template(&analysis)?;
                (text, GenerationMode::Template, Some(key))
            }
            (GenerationMode::Ai, None) => {
                return Err(GenerationError::MissingClient(GenerationMode::Ai));
            }
        };

        let validation_warnings = self.validator.validate(&derivation);
        if !validation_warnings.is_empty() {
            warn!(warnings = ?validation_warnings, "Derivation validation issues found");
        }

        let mut nixpkgs_mappings = suggest_mappings(&analysis.dependencies);
        self.probe_system_mappings(&analysis, &mut nixpkgs_mappings).await;

        Ok(PackageResult {
            analysis,
            derivation,
            mode: effective_mode,
            template,
            validation_warnings,
            nixpkgs_mappings,
            output_file: None,
        })
    }

    /// Renders the best matching template, returning the text and the key
    /// of the template used
    pub fn render_template(&self, analysis: &RepoAnalysis) -> Result<(String, String), GenerationError> {
        let template = self
            .templates
            .lookup(&analysis.language, analysis.build_system.as_str())?;
        let context = ContextBuilder::new(Arc::clone(&self.build_systems)).build(analysis);
        let text = self.renderer.render(&template, &context)?;
        Ok((text, template.key.clone()))
    }

    async fn generate_with_client(
        &self,
        client: &dyn LLMClient,
        analysis: &RepoAnalysis,
    ) -> Result<String, GenerationError> {
        let documentation = match self.documentation.as_deref() {
            Some(source) => {
                let queries = documentation_queries(
                    analysis.build_system,
                    &self.build_systems,
                    &analysis.language,
                );
                gather_documentation(source, &queries).await
            }
            None => String::new(),
        };

        let prompt = generation_prompt(analysis, &documentation);
        debug!(client = client.name(), prompt_chars = prompt.len(), "Requesting derivation");

        let response = client.complete(&prompt).await?;
        let derivation = extract_derivation(&response);
        if derivation.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(derivation)
    }

    fn enhancer(&self, client: Arc<dyn LLMClient>) -> HybridEnhancer {
        let enhancer = HybridEnhancer::new(client).with_build_systems(Arc::clone(&self.build_systems));
        match &self.documentation {
            Some(docs) => enhancer.with_documentation(Arc::clone(docs)),
            None => enhancer,
        }
    }

    /// System libraries missing from the common table are looked up in the
    /// documentation source; a mention of the name suggests it unchanged.
    async fn probe_system_mappings(
        &self,
        analysis: &RepoAnalysis,
        mappings: &mut BTreeMap<String, String>,
    ) {
        let Some(source) = self.documentation.as_deref() else {
            return;
        };

        for dep in analysis.system_dependencies() {
            if mappings.contains_key(&dep.name) {
                continue;
            }
            let query = format!("nixpkgs package {} library", dep.name);
            match source.query(&query).await {
                Ok(text) if text.to_lowercase().contains(&dep.name.to_lowercase()) => {
                    mappings.insert(dep.name.clone(), dep.name.clone());
                }
                Ok(_) => {}
                Err(e) => debug!(dependency = %dep.name, error = %e, "Mapping lookup failed"),
            }
        }
    }
}

impl Default for PackagingService {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

fn write_derivation(dir: &Path, project_name: &str, derivation: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let file_name = project_name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
    let path = dir.join(format!("{}.nix", file_name));
    std::fs::write(&path, derivation)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::templates::DerivationTemplate;
    use crate::generation::StaticDocumentation;
    use std::fs;
    use tempfile::TempDir;

    fn go_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("go.mod"),
            "module demo\n\ngo 1.20\n\nrequire example.com/foo/bar v1.0.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
        dir
    }

    #[test]
    fn test_generation_mode_parsing() {
        assert_eq!("hybrid".parse::<GenerationMode>().unwrap(), GenerationMode::Hybrid);
        assert_eq!("AI".parse::<GenerationMode>().unwrap(), GenerationMode::Ai);
        assert!("magic".parse::<GenerationMode>().is_err());
        assert_eq!(GenerationMode::default().to_string(), "template");
    }

    #[tokio::test]
    async fn test_template_mode_writes_file() {
        let repo = go_repo();
        let out = TempDir::new().unwrap();
        let request = PackageRequest::new(repo.path())
            .with_package_name("demo-tool")
            .with_source_url("https://github.com/acme/demo-tool")
            .with_output_dir(out.path().join("nix"));

        let result = PackagingService::default().package(&request).await.unwrap();

        assert_eq!(result.mode, GenerationMode::Template);
        assert_eq!(result.template.as_deref(), Some("go-go-modules"));
        assert!(result.derivation.contains("buildGoModule"));
        assert!(result.derivation.contains("owner = \"acme\";"));
        let written = out.path().join("nix").join("demo-tool.nix");
        assert_eq!(result.output_file.as_deref(), Some(written.as_path()));
        assert_eq!(fs::read_to_string(written).unwrap(), result.derivation);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_result() {
        let repo = go_repo();
        let blocker = repo.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let request = PackageRequest::new(repo.path()).with_output_dir(&blocker);
        let result = PackagingService::default().package(&request).await.unwrap();

        assert!(result.output_file.is_none());
        assert!(!result.derivation.is_empty());
    }

    #[tokio::test]
    async fn test_hybrid_error_returns_template_output() {
        let repo = go_repo();
        let template_only = PackagingService::default()
            .package(&PackageRequest::new(repo.path()))
            .await
            .unwrap();

        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::TimeoutError { seconds: 1 }));
        let service = PackagingService::default().with_client(client);
        let hybrid = service
            .package(&PackageRequest::new(repo.path()).with_mode(GenerationMode::Hybrid))
            .await
            .unwrap();

        assert_eq!(hybrid.mode, GenerationMode::Hybrid);
        assert_eq!(hybrid.derivation, template_only.derivation);
    }

    #[tokio::test]
    async fn test_hybrid_without_client_degrades_to_template() {
        let repo = go_repo();
        let result = PackagingService::default()
            .package(&PackageRequest::new(repo.path()).with_mode(GenerationMode::Hybrid))
            .await
            .unwrap();
        assert_eq!(result.mode, GenerationMode::Template);
    }

    #[tokio::test]
    async fn test_ai_mode_without_client_is_error() {
        let repo = go_repo();
        let result = PackagingService::default()
            .package(&PackageRequest::new(repo.path()).with_mode(GenerationMode::Ai))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::MissingClient(GenerationMode::Ai))
        ));
    }

    #[tokio::test]
    async fn test_ai_mode_uses_response() {
        let repo = go_repo();
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text(
            "```nix\n{ lib, buildGoModule }:\nbuildGoModule { pname = \"demo\"; }\n```",
        ));

        let result = PackagingService::default()
            .with_client(client.clone())
            .package(&PackageRequest::new(repo.path()).with_mode(GenerationMode::Ai))
            .await
            .unwrap();

        assert_eq!(result.mode, GenerationMode::Ai);
        assert!(result.template.is_none());
        assert!(result.derivation.starts_with("{ lib, buildGoModule }:"));
        assert!(result
            .validation_warnings
            .contains(&"Missing required attribute: src".to_string()));
        assert!(client.prompts()[0].contains("example.com/foo/bar (v1.0.0)"));
    }

    #[tokio::test]
    async fn test_ai_mode_error_surfaces() {
        let repo = go_repo();
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::NetworkError {
            message: "refused".to_string(),
        }));

        let result = PackagingService::default()
            .with_client(client)
            .package(&PackageRequest::new(repo.path()).with_mode(GenerationMode::Ai))
            .await;
        assert!(matches!(result, Err(GenerationError::Backend(_))));
    }

    #[tokio::test]
    async fn test_ai_mode_empty_response() {
        let repo = go_repo();
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("   "));

        let result = PackagingService::default()
            .with_client(client)
            .package(&PackageRequest::new(repo.path()).with_mode(GenerationMode::Ai))
            .await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_missing_path_is_analysis_error() {
        let result = PackagingService::default()
            .analyze(Path::new("/definitely/not/here"))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::Analysis(AnalysisError::PathNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_custom_template_registry() {
        let repo = go_repo();
        let mut registry = TemplateRegistry::new();
        registry.register(DerivationTemplate::new(
            "default",
            "",
            "",
            "{ }: { pname = \"{{ project_name }}\"; }",
        ));

        let service = PackagingService::default().with_templates(Arc::new(registry));
        let result = service.package(&PackageRequest::new(repo.path())).await.unwrap();

        assert_eq!(result.template.as_deref(), Some("default"));
        assert!(result.derivation.contains(&result.analysis.project_name));
    }

    #[tokio::test]
    async fn test_system_mappings_from_documentation() {
        let repo = TempDir::new().unwrap();
        fs::write(
            repo.path().join("CMakeLists.txt"),
            "project(demo C)\nfind_package(OpenSSL REQUIRED)\nfind_package(Foo)\n",
        )
        .unwrap();
        fs::write(repo.path().join("main.c"), "int main(void) { return 0; }\n").unwrap();

        let docs = StaticDocumentation::new()
            .with_entry("nixpkgs package foo library", "pkgs.foo provides libfoo");
        let result = PackagingService::default()
            .with_documentation(Arc::new(docs))
            .package(&PackageRequest::new(repo.path()))
            .await
            .unwrap();

        assert_eq!(result.nixpkgs_mappings.get("openssl").map(String::as_str), Some("openssl"));
        assert_eq!(result.nixpkgs_mappings.get("foo").map(String::as_str), Some("foo"));
    }
}
