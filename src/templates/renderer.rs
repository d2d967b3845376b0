use super::{DerivationTemplate, TemplateContext};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tera::{Tera, Value};
use thiserror::Error;
use tracing::{debug, warn};

static CUSTOM_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcustom\.([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex")
});

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template '{key}' has a syntax error: {source}")]
    Syntax { key: String, source: tera::Error },
    #[error("Failed to build template context: {0}")]
    Context(tera::Error),
    #[error("Failed to render template '{key}': {source}")]
    Render { key: String, source: tera::Error },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `template` with `context`. Required variables missing from
    /// the context are filled with their declared placeholders first.
    pub fn render(
        &self,
        template: &DerivationTemplate,
        context: &TemplateContext,
    ) -> Result<String, RenderError> {
        let mut context = context.clone();
        let filled = fill_missing_required(template, &mut context);
        default_missing_custom(template, &mut context);
        if !filled.is_empty() {
            warn!(
                template = %template.key,
                filled = ?filled,
                "Filled missing required template variables with placeholders"
            );
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("nix_string", nix_string);
        tera.register_filter("nix_license", nix_license);
        tera.add_raw_template(&template.key, &template.text)
            .map_err(|source| RenderError::Syntax {
                key: template.key.clone(),
                source,
            })?;

        let tera_context = tera::Context::from_serialize(&context).map_err(RenderError::Context)?;
        let rendered = tera
            .render(&template.key, &tera_context)
            .map_err(|source| RenderError::Render {
                key: template.key.clone(),
                source,
            })?;

        debug!(template = %template.key, bytes = rendered.len(), "Template rendered");
        Ok(rendered)
    }
}

/// Fills required variables that have no value with the template's declared
/// default. Returns the names that were filled.
pub fn fill_missing_required(
    template: &DerivationTemplate,
    context: &mut TemplateContext,
) -> Vec<String> {
    let mut filled = Vec::new();

    for variable in template.variables.iter().filter(|v| v.required) {
        let Some(default) = variable.default.as_ref() else {
            continue;
        };
        let default_text = default.as_str().unwrap_or_default();

        let slot = match variable.name.as_str() {
            "project_name" => Some(&mut context.project_name),
            "version" => Some(&mut context.version),
            "owner" => Some(&mut context.owner),
            "language" => Some(&mut context.language),
            "build_system" => Some(&mut context.build_system),
            "description" => Some(&mut context.description),
            "homepage" => Some(&mut context.homepage),
            "license" => Some(&mut context.license),
            _ => None,
        };

        match slot {
            Some(value) if value.trim().is_empty() => {
                *value = default_text.to_string();
                filled.push(variable.name.clone());
            }
            Some(_) => {}
            None => {
                if !context.custom.contains_key(&variable.name) {
                    context.custom.insert(variable.name.clone(), default.clone());
                    filled.push(variable.name.clone());
                }
            }
        }
    }

    filled
}

/// Optional variables kept in `custom`, and every `custom.<name>` the
/// template text refers to, default to null so they render empty.
fn default_missing_custom(template: &DerivationTemplate, context: &mut TemplateContext) {
    let declared = template
        .variables
        .iter()
        .filter(|v| !v.required && !is_context_field(&v.name))
        .map(|v| v.name.clone());
    let referenced = CUSTOM_REF_RE
        .captures_iter(&template.text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    for name in declared.chain(referenced) {
        context.custom.entry(name).or_insert(Value::Null);
    }
}

fn is_context_field(name: &str) -> bool {
    matches!(
        name,
        "project_name"
            | "version"
            | "owner"
            | "description"
            | "homepage"
            | "license"
            | "language"
            | "build_system"
            | "build_inputs"
            | "native_build_inputs"
            | "dependencies"
            | "dev_dependencies"
            | "build_phase"
            | "install_phase"
            | "check_phase"
            | "configure_flags"
            | "make_flags"
    )
}

/// Escapes a value for a double-quoted Nix string
fn nix_string(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("${", "\\${");
    Ok(Value::String(escaped))
}

/// Detected license identifier to a nixpkgs `licenses.*` attribute
fn nix_license(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let attr = match value.as_str().unwrap_or_default() {
        "MIT" => "licenses.mit",
        "Apache-2.0" => "licenses.asl20",
        "GPL-3.0" => "licenses.gpl3Only",
        "GPL-2.0" => "licenses.gpl2Only",
        "GPL" => "licenses.gpl3Plus",
        "BSD" => "licenses.bsd3",
        "" => "licenses.unfree",
        _ => "licenses.free",
    };
    Ok(Value::String(attr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{TemplateRegistry, TemplateVariable, VariableType};

    fn context() -> TemplateContext {
        TemplateContext {
            project_name: "foo".to_string(),
            version: "1.2.3".to_string(),
            owner: "bar".to_string(),
            language: "rust".to_string(),
            build_system: "cargo".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_substitutes_project_values() {
        let registry = TemplateRegistry::with_defaults();
        for key in registry.keys() {
            let template = registry.get(key).unwrap();
            let rendered = TemplateRenderer::new().render(&template, &context()).unwrap();
            assert!(rendered.contains("foo"), "{} missing project name", key);
            assert!(rendered.contains("1.2.3"), "{} missing version", key);
            assert!(rendered.contains("bar"), "{} missing owner", key);
        }
    }

    #[test]
    fn test_missing_required_filled_with_placeholders() {
        let template = DerivationTemplate::new(
            "t",
            "",
            "",
            "{{ project_name }} {{ version }} {{ owner }} {{ language }} {{ build_system }}",
        );
        let rendered = TemplateRenderer::new()
            .render(&template, &TemplateContext::default())
            .unwrap();
        assert_eq!(rendered, "unknown-project 0.1.0 unknown unknown unknown");
    }

    #[test]
    fn test_fill_reports_names() {
        let template = DerivationTemplate::new("t", "", "", "");
        let mut ctx = context();
        ctx.owner.clear();
        let filled = fill_missing_required(&template, &mut ctx);
        assert_eq!(filled, vec!["owner"]);
        assert_eq!(ctx.owner, "unknown");
    }

    #[test]
    fn test_missing_optional_renders_empty() {
        let template = DerivationTemplate::new(
            "t",
            "",
            "",
            "[{{ description }}]{% if check_phase %}check{% endif %}",
        );
        let rendered = TemplateRenderer::new().render(&template, &context()).unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn test_missing_optional_custom_renders_empty() {
        let mut template = DerivationTemplate::new(
            "t",
            "",
            "",
            "pre[{{ custom.extra_flags }}]post",
        );
        template.variables.push(TemplateVariable::optional(
            "extra_flags",
            VariableType::String,
            "Extra flags",
        ));
        let rendered = TemplateRenderer::new().render(&template, &context()).unwrap();
        assert_eq!(rendered, "pre[]post");
    }

    #[test]
    fn test_undeclared_custom_reference_renders_empty() {
        let template = DerivationTemplate::new(
            "t",
            "",
            "",
            "[{{ custom.patches | nix_string }}]{% if custom.patches %}x{% endif %}",
        );
        let rendered = TemplateRenderer::new().render(&template, &context()).unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn test_custom_values_are_kept() {
        let template = DerivationTemplate::new("t", "", "", "{{ custom.extra_flags }}");
        let mut ctx = context();
        ctx.custom
            .insert("extra_flags".to_string(), Value::String("-O2".to_string()));
        let rendered = TemplateRenderer::new().render(&template, &ctx).unwrap();
        assert_eq!(rendered, "-O2");
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let template = DerivationTemplate::new("broken", "", "", "{% if project_name %}unclosed");
        let result = TemplateRenderer::new().render(&template, &context());
        assert!(matches!(result, Err(RenderError::Syntax { .. })));
    }

    #[test]
    fn test_nix_string_escapes() {
        let template = DerivationTemplate::new("t", "", "", "\"{{ description | nix_string }}\"");
        let mut ctx = context();
        ctx.description = "say \"hi\" to ${HOME}".to_string();
        let rendered = TemplateRenderer::new().render(&template, &ctx).unwrap();
        assert_eq!(rendered, r#""say \"hi\" to \${HOME}""#);
    }

    #[test]
    fn test_nix_license_mapping() {
        let template = DerivationTemplate::new("t", "", "", "{{ license | nix_license }}");
        let mut ctx = context();
        ctx.license = "Apache-2.0".to_string();
        let rendered = TemplateRenderer::new().render(&template, &ctx).unwrap();
        assert_eq!(rendered, "licenses.asl20");
    }
}
