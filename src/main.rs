use nixpack::cli::commands::{CliArgs, Commands};
use nixpack::cli::handlers::{handle_analyze, handle_config, handle_generate, handle_templates};
use nixpack::util::logging::{config_from_env, init_logging, parse_level};
use nixpack::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("nixpack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args).await,
        Commands::Generate(generate_args) => handle_generate(generate_args).await,
        Commands::Templates(templates_args) => handle_templates(templates_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}

/// `--log-level`, `-v` and `-q` override `NIXPACK_LOG_LEVEL`; everything
/// else comes from the environment.
fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        Some(parse_level(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    };

    init_logging(config_from_env().override_level(level));
}
