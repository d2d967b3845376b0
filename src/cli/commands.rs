use crate::generation::GenerationMode;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Repository analysis and Nix derivation synthesis
#[derive(Parser, Debug)]
#[command(
    name = "nixpack",
    about = "Analyze a repository and synthesize a Nix derivation for it",
    version,
    long_about = "nixpack detects the languages and build system of a source repository, \
                  extracts its declared dependencies and renders a Nix derivation from a \
                  built-in template, optionally refined by a completion model \
                  (Ollama, OpenAI, Anthropic, Gemini, xAI, Groq)."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a repository",
        long_about = "Detects languages, the build system, dependencies and project metadata.\n\n\
                      Examples:\n  \
                      nixpack analyze\n  \
                      nixpack analyze /path/to/repo --format json"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Generate a Nix derivation",
        long_about = "Analyzes a repository and generates a derivation for it.\n\n\
                      Examples:\n  \
                      nixpack generate /path/to/repo\n  \
                      nixpack generate . --mode hybrid --provider ollama --output-dir nix/\n  \
                      nixpack generate . --name mytool --source-url https://github.com/acme/mytool"
    )]
    Generate(GenerateArgs),

    #[command(about = "List built-in derivation templates")]
    Templates(TemplatesArgs),

    #[command(about = "Show the effective configuration from NIXPACK_* variables")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "N", help = "Maximum number of files to collect")]
    pub max_files: Option<usize>,

    #[arg(long, value_name = "SECONDS", help = "Analysis timeout in seconds")]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(long, value_enum, help = "Generation mode (defaults to NIXPACK_MODE or template)")]
    pub mode: Option<GenerationMode>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Write <name>.nix into this directory"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(short = 'n', long, value_name = "NAME", help = "Package name override")]
    pub name: Option<String>,

    #[arg(long, value_name = "URL", help = "Upstream repository URL (sets owner and homepage)")]
    pub source_url: Option<String>,

    #[arg(
        short = 'p',
        long,
        value_name = "PROVIDER",
        help = "Completion provider: ollama, openai, anthropic, gemini, xai, groq"
    )]
    pub provider: Option<String>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name (provider-specific)")]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Completion request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "nix",
        help = "Output format"
    )]
    pub format: GenerateFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct TemplatesArgs {
    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

/// `nix` prints only the derivation; the others print the full result
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateFormatArg {
    Nix,
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
