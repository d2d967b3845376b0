use super::builtin;
use super::DerivationTemplate;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("No template found for language '{language}' and build system '{build_system}'")]
    NotFound {
        language: String,
        build_system: String,
    },
    #[error("Cannot alias '{alias}' to unregistered template '{target}'")]
    UnknownAlias { alias: String, target: String },
}

/// Templates by key. Aliases share the registered template.
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<DerivationTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for template in builtin::templates() {
            registry.register(template);
        }

        let aliases = builtin::LANGUAGE_ALIASES
            .iter()
            .chain(builtin::BUILD_SYSTEM_ALIASES);
        for (alias, target) in aliases {
            // every alias target is one of the built-in keys registered above
            if let Err(e) = registry.alias(alias, target) {
                debug!(error = %e, "Skipping built-in alias");
            }
        }

        registry
    }

    pub fn register(&mut self, template: DerivationTemplate) {
        self.templates
            .insert(template.key.clone(), Arc::new(template));
    }

    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), TemplateError> {
        let template = self
            .templates
            .get(target)
            .cloned()
            .ok_or_else(|| TemplateError::UnknownAlias {
                alias: alias.to_string(),
                target: target.to_string(),
            })?;
        self.templates.insert(alias.to_string(), template);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<DerivationTemplate>> {
        self.templates.get(key).cloned()
    }

    /// Exact `<language>-<buildSystem>`, then language, then build system,
    /// then `default`.
    pub fn lookup(
        &self,
        language: &str,
        build_system: &str,
    ) -> Result<Arc<DerivationTemplate>, TemplateError> {
        let exact = format!("{}-{}", language, build_system);
        let candidates = [exact.as_str(), language, build_system, "default"];

        for key in candidates {
            if let Some(template) = self.get(key) {
                debug!(language, build_system, key, template = %template.key, "Template selected");
                return Ok(template);
            }
        }

        Err(TemplateError::NotFound {
            language: language.to_string(),
            build_system: build_system.to_string(),
        })
    }

    /// Registered keys including aliases, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
