//! Command handlers. Each returns the process exit code: 0 on success,
//! 1 when the command failed and 2 when the configuration is invalid.

use super::commands::{AnalyzeArgs, ConfigArgs, GenerateArgs, GenerateFormatArg, TemplatesArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::{ConfigError, NixpackConfig};
use crate::generation::{PackageRequest, PackagingService};
use crate::llm::LLMClient;
use crate::templates::TemplateRegistry;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 2;

pub async fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let config = match analyze_config(args) {
        Ok(config) => config,
        Err(e) => return config_failure(e),
    };

    match run_analyze(args, &config).await {
        Ok(output) => {
            println!("{}", output);
            EXIT_OK
        }
        Err(e) => command_failure("Analysis", e),
    }
}

pub async fn handle_generate(args: &GenerateArgs) -> i32 {
    let config = match generate_config(args) {
        Ok(config) => config,
        Err(e) => return config_failure(e),
    };

    match run_generate(args, &config).await {
        Ok(output) => {
            println!("{}", output);
            EXIT_OK
        }
        Err(e) => command_failure("Generation", e),
    }
}

pub fn handle_templates(args: &TemplatesArgs) -> i32 {
    let registry = TemplateRegistry::with_defaults();
    match OutputFormatter::new(args.format.into()).format_templates(&registry) {
        Ok(output) => {
            println!("{}", output);
            EXIT_OK
        }
        Err(e) => command_failure("Listing templates", e),
    }
}

/// Prints the configuration the other commands would start from. Invalid
/// values are reported but the configuration is still shown.
pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = NixpackConfig::default();
    let valid = match config.validate() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Warning: {}", e);
            false
        }
    };

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(output) => {
            println!("{}", output);
            if valid {
                EXIT_OK
            } else {
                EXIT_CONFIG
            }
        }
        Err(e) => command_failure("Showing configuration", e),
    }
}

fn analyze_config(args: &AnalyzeArgs) -> Result<NixpackConfig, ConfigError> {
    let mut config = NixpackConfig::default();
    if let Some(max_files) = args.max_files {
        config.max_files = max_files;
    }
    if let Some(timeout) = args.timeout {
        config.analysis_timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn generate_config(args: &GenerateArgs) -> Result<NixpackConfig, ConfigError> {
    let mut config = NixpackConfig::default();
    if let Some(provider) = &args.provider {
        config.set_provider(provider)?;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    config.validate()?;
    debug!("Effective configuration:\n{}", config);
    Ok(config)
}

fn repository_path(path: Option<&PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => env::current_dir().context("Failed to resolve current directory"),
    }
}

async fn run_analyze(args: &AnalyzeArgs, config: &NixpackConfig) -> Result<String> {
    let path = repository_path(args.repository_path.as_ref())?;
    info!(path = %path.display(), "Analyzing repository");

    let service = PackagingService::new(config.analysis_options());
    let analysis = service
        .analyze(&path)
        .await
        .with_context(|| format!("Failed to analyze {}", path.display()))?;

    OutputFormatter::new(args.format.into()).format_analysis(&analysis)
}

async fn run_generate(args: &GenerateArgs, config: &NixpackConfig) -> Result<String> {
    let path = repository_path(args.repository_path.as_ref())?;

    let mut service = PackagingService::new(config.analysis_options());
    if config.mode.needs_client() {
        match config.create_client().await {
            Ok(client) => {
                info!(
                    provider = client.name(),
                    model = %config.model,
                    "Completion client ready"
                );
                service = service.with_client(client);
            }
            Err(e) if config.mode == crate::generation::GenerationMode::Ai => {
                return Err(e).context("Failed to create completion client");
            }
            Err(e) => warn!(error = %e, "Completion client unavailable, using templates only"),
        }
    }

    let mut request = PackageRequest::new(&path).with_mode(config.mode);
    if let Some(dir) = &config.output_dir {
        request = request.with_output_dir(dir);
    }
    if let Some(name) = &args.name {
        request = request.with_package_name(name);
    }
    if let Some(url) = &args.source_url {
        request = request.with_source_url(url);
    }

    let result = service
        .package(&request)
        .await
        .with_context(|| format!("Failed to generate a derivation for {}", path.display()))?;

    for warning in &result.validation_warnings {
        warn!("{}", warning);
    }
    if let Some(file) = &result.output_file {
        info!(file = %file.display(), "Derivation written");
    }

    let format = match args.format {
        GenerateFormatArg::Nix => return Ok(result.derivation.trim_end().to_string()),
        GenerateFormatArg::Json => OutputFormat::Json,
        GenerateFormatArg::Yaml => OutputFormat::Yaml,
        GenerateFormatArg::Human => OutputFormat::Human,
    };
    OutputFormatter::new(format).format_result(&result)
}

fn config_failure(e: ConfigError) -> i32 {
    error!("Configuration error: {}", e);
    eprintln!("Error: {}", e);
    EXIT_CONFIG
}

fn command_failure(what: &str, e: anyhow::Error) -> i32 {
    error!("{} failed: {:#}", what, e);
    eprintln!("Error: {:#}", e);
    EXIT_FAILURE
}
