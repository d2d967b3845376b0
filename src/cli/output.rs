//! Output formatting for analysis results, generation results and the
//! template listing in JSON, YAML or human-readable text.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

use crate::config::NixpackConfig;
use crate::detection::RepoAnalysis;
use crate::generation::PackageResult;
use crate::templates::{DerivationTemplate, TemplateRegistry};

const RULE_WIDTH: usize = 42;
const BRANCH: &str = "\u{251C}\u{2500}";
const LAST: &str = "\u{2514}\u{2500}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// One row of the template listing. For aliases `template` names the
/// registered template the key resolves to.
#[derive(Debug, Serialize)]
struct TemplateRow<'a> {
    key: &'a str,
    template: &'a str,
    language: &'a str,
    build_system: &'a str,
    description: &'a str,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_analysis(&self, analysis: &RepoAnalysis) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(analysis, "analysis"),
            OutputFormat::Yaml => to_yaml(analysis, "analysis"),
            OutputFormat::Human => Ok(human_analysis(analysis)),
        }
    }

    pub fn format_result(&self, result: &PackageResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(result, "generation result"),
            OutputFormat::Yaml => to_yaml(result, "generation result"),
            OutputFormat::Human => Ok(human_result(result)),
        }
    }

    pub fn format_templates(&self, registry: &TemplateRegistry) -> Result<String> {
        let entries: Vec<(&str, Arc<DerivationTemplate>)> = registry
            .keys()
            .into_iter()
            .filter_map(|key| registry.get(key).map(|template| (key, template)))
            .collect();

        let rows: Vec<TemplateRow<'_>> = entries
            .iter()
            .map(|(key, template)| TemplateRow {
                key: *key,
                template: &template.key,
                language: &template.language,
                build_system: &template.build_system,
                description: &template.description,
            })
            .collect();

        match self.format {
            OutputFormat::Json => to_json(&rows, "template listing"),
            OutputFormat::Yaml => to_yaml(&rows, "template listing"),
            OutputFormat::Human => Ok(human_templates(&rows)),
        }
    }

    pub fn format_config(&self, config: &NixpackConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&config.to_display_map(), "config"),
            OutputFormat::Yaml => to_yaml(&config.to_display_map(), "config"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn rule() -> String {
    "\u{2501}".repeat(RULE_WIDTH)
}

fn confidence_bar(confidence: f64) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * 10.0).round() as usize;
    "\u{2588}".repeat(filled) + &"\u{2591}".repeat(10 - filled)
}

fn human_analysis(analysis: &RepoAnalysis) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Repository Analysis: {}", analysis.project_name);
    let _ = writeln!(out, "{}\n", rule());

    let _ = writeln!(out, "Path:          {}", analysis.local_path.display());
    let _ = writeln!(out, "Build System:  {}", analysis.build_system);
    let _ = writeln!(out, "Language:      {}", analysis.language);
    if let Some(version) = &analysis.version {
        let _ = writeln!(out, "Version:       {}", version);
    }
    if !analysis.license.is_empty() {
        let _ = writeln!(out, "License:       {}", analysis.license);
    }
    if !analysis.description.is_empty() {
        let _ = writeln!(out, "Description:   {}", analysis.description);
    }
    let _ = writeln!(out, "Has Tests:     {}", if analysis.has_tests { "yes" } else { "no" });

    if !analysis.languages.is_empty() {
        out.push_str("\nLanguages:\n");
        for (i, result) in analysis.languages.iter().enumerate() {
            let connector = if i + 1 == analysis.languages.len() { LAST } else { BRANCH };
            let _ = writeln!(
                out,
                "{} {:<12} {} {:>3}% ({} files)",
                connector,
                result.language,
                confidence_bar(result.confidence),
                (result.confidence * 100.0).round() as u32,
                result.files.len()
            );
        }
    }

    if !analysis.build_files.is_empty() {
        let _ = writeln!(out, "\nBuild Files: {}", analysis.build_files.join(", "));
    }

    if analysis.dependencies.is_empty() {
        out.push_str("\nDependencies: (none found)\n");
    } else {
        let _ = writeln!(out, "\nDependencies ({}):", analysis.dependencies.len());
        for (i, dep) in analysis.dependencies.iter().enumerate() {
            let connector = if i + 1 == analysis.dependencies.len() { LAST } else { BRANCH };
            let _ = write!(out, "{} {} [{}]", connector, dep.name, dep.dep_type);
            if !dep.version.is_empty() {
                let _ = write!(out, " {}", dep.version);
            }
            if dep.system {
                out.push_str(" (system)");
            }
            out.push('\n');
        }
    }

    out
}

fn human_result(result: &PackageResult) -> String {
    let mut out = human_analysis(&result.analysis);

    let _ = writeln!(out, "\n{}", rule());
    let _ = write!(out, "Generated Derivation (mode: {}", result.mode);
    if let Some(template) = &result.template {
        let _ = write!(out, ", template: {}", template);
    }
    out.push_str(")\n");
    let _ = writeln!(out, "{}\n", rule());
    out.push_str(result.derivation.trim_end());
    out.push('\n');

    if !result.nixpkgs_mappings.is_empty() {
        out.push_str("\nSuggested nixpkgs attributes:\n");
        for (name, attr) in &result.nixpkgs_mappings {
            let _ = writeln!(out, "  {} -> {}", name, attr);
        }
    }

    if !result.validation_warnings.is_empty() {
        out.push_str("\n\u{26A0} Warnings:\n");
        for warning in &result.validation_warnings {
            let _ = writeln!(out, "  - {}", warning);
        }
    }

    if let Some(path) = &result.output_file {
        let _ = writeln!(out, "\nWritten to {}", path.display());
    }

    out
}

fn human_templates(rows: &[TemplateRow<'_>]) -> String {
    let mut out = String::from("Built-in Templates\n");
    let _ = writeln!(out, "{}", rule());

    for row in rows {
        if row.key == row.template {
            let _ = writeln!(out, "{:<20} {}", row.key, row.description);
        } else {
            let _ = writeln!(out, "{:<20} alias of {}", row.key, row.template);
        }
    }

    out
}
