//! Derivation templates
//!
//! Built-in Nix templates keyed by `<language>-<buildSystem>`, a context
//! builder that maps a [`RepoAnalysis`](crate::detection::RepoAnalysis) into
//! substitution variables, and a Tera-backed renderer.

pub mod builtin;
mod context;
mod registry;
mod renderer;

pub use context::{ContextBuilder, TemplateContext};
pub use registry::{TemplateError, TemplateRegistry};
pub use renderer::{fill_missing_required, RenderError, TemplateRenderer};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Bool,
    List,
    Map,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    pub required: bool,
}

impl TemplateVariable {
    pub fn required(name: &str, description: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            var_type: VariableType::String,
            description: description.to_string(),
            default: Some(serde_json::Value::String(default.to_string())),
            required: true,
        }
    }

    pub fn optional(name: &str, var_type: VariableType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            var_type,
            description: description.to_string(),
            default: None,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivationTemplate {
    pub key: String,
    pub language: String,
    pub build_system: String,
    pub description: String,
    #[serde(skip)]
    pub text: String,
    pub variables: Vec<TemplateVariable>,
}

impl DerivationTemplate {
    pub fn new(
        key: impl Into<String>,
        language: impl Into<String>,
        build_system: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            description: format!("Template for {} projects", key),
            key,
            language: language.into(),
            build_system: build_system.into(),
            text: text.into(),
            variables: default_variables(),
        }
    }
}

/// Variables every built-in template understands. The required ones carry
/// the placeholder used when the analysis could not supply a value.
pub fn default_variables() -> Vec<TemplateVariable> {
    use VariableType::{List, Map};
    let text = VariableType::String;

    vec![
        TemplateVariable::required("project_name", "Name of the project", "unknown-project"),
        TemplateVariable::required("version", "Version of the project", "0.1.0"),
        TemplateVariable::required("owner", "Source hosting owner or organization", "unknown"),
        TemplateVariable::optional("description", text, "Project description"),
        TemplateVariable::optional("homepage", text, "Project homepage URL"),
        TemplateVariable::optional("license", text, "Project license"),
        TemplateVariable::required("language", "Primary programming language", "unknown"),
        TemplateVariable::required("build_system", "Build system used", "unknown"),
        TemplateVariable::optional("build_inputs", List, "Build dependencies"),
        TemplateVariable::optional("native_build_inputs", List, "Native build dependencies"),
        TemplateVariable::optional("dependencies", Map, "Runtime dependencies"),
        TemplateVariable::optional("dev_dependencies", Map, "Development dependencies"),
        TemplateVariable::optional("build_phase", text, "Custom build phase"),
        TemplateVariable::optional("install_phase", text, "Custom install phase"),
        TemplateVariable::optional("check_phase", text, "Custom check phase"),
        TemplateVariable::optional("configure_flags", List, "Configure flags"),
        TemplateVariable::optional("make_flags", List, "Make flags"),
    ]
}
