pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ConfigArgs, GenerateArgs, TemplatesArgs};
pub use output::{OutputFormat, OutputFormatter};
