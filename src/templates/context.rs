use crate::build_systems::BuildSystemRegistry;
use crate::dependencies::DependencyType;
use crate::detection::RepoAnalysis;
use crate::generation::{nixpkgs_attribute, BUILD_TOOLS, TOOLCHAIN_PROVIDED};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

const DEFAULT_VERSION: &str = "0.1.0";
const HOSTS_WITH_OWNER: &[&str] = &["github.com", "gitlab.com"];
const NIX_KEYWORDS: &[&str] = &[
    "assert", "else", "if", "in", "inherit", "let", "or", "rec", "then", "with",
];

static NIX_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_'-]*$").expect("valid regex"));

/// Values substituted into a template. Every field is always present when
/// serialized, so templates never see an undefined variable; an empty string
/// or collection means "not known".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateContext {
    pub project_name: String,
    pub version: String,
    pub owner: String,
    pub description: String,
    pub homepage: String,
    pub license: String,
    pub language: String,
    pub build_system: String,
    pub build_inputs: Vec<String>,
    pub native_build_inputs: Vec<String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub build_phase: String,
    pub install_phase: String,
    pub check_phase: String,
    pub configure_flags: Vec<String>,
    pub make_flags: Vec<String>,
    pub custom: BTreeMap<String, serde_json::Value>,
}

pub struct ContextBuilder {
    build_systems: Arc<BuildSystemRegistry>,
}

impl ContextBuilder {
    pub fn new(build_systems: Arc<BuildSystemRegistry>) -> Self {
        Self { build_systems }
    }

    pub fn build(&self, analysis: &RepoAnalysis) -> TemplateContext {
        let mut context = TemplateContext {
            project_name: analysis.project_name.clone(),
            version: analysis
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            description: analysis.description.clone(),
            license: analysis.license.clone(),
            language: analysis.language.clone(),
            build_system: analysis.build_system.to_string(),
            ..Default::default()
        };

        if let Some(url) = analysis.source_url.as_deref() {
            context.owner = owner_from_url(url).unwrap_or_default();
            context.homepage = homepage_from_url(url).unwrap_or_default();
        }

        for dep in &analysis.dependencies {
            match dep.dep_type {
                DependencyType::Runtime | DependencyType::Build => {
                    context
                        .dependencies
                        .insert(dep.name.clone(), dep.version.clone());
                }
                DependencyType::Dev => {
                    context
                        .dev_dependencies
                        .insert(dep.name.clone(), dep.version.clone());
                }
            }
        }

        if let Some(system) = self.build_systems.get(analysis.build_system) {
            context.native_build_inputs = system
                .native_build_inputs()
                .iter()
                .map(|s| s.to_string())
                .collect();

            if analysis.has_tests {
                if let Some(check) = system.check_command() {
                    context.check_phase = check.to_string();
                }
            }
        }

        for dep in analysis.system_dependencies() {
            let Some(attr) = system_input(&dep.name) else {
                debug!(dependency = %dep.name, "System dependency has no derivation input");
                continue;
            };
            let inputs = if BUILD_TOOLS.contains(&attr.as_str()) {
                &mut context.native_build_inputs
            } else {
                &mut context.build_inputs
            };
            if !inputs.contains(&attr) {
                inputs.push(attr);
            }
        }

        context
    }
}

/// nixpkgs attribute for a system library, or `None` when the toolchain
/// provides it or the name cannot appear in a Nix argument set
pub(crate) fn system_input(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    if TOOLCHAIN_PROVIDED.contains(&lower.as_str()) {
        return None;
    }
    let attr = nixpkgs_attribute(&lower).map(str::to_string).unwrap_or(lower);
    let valid = NIX_IDENT_RE.is_match(&attr) && !NIX_KEYWORDS.contains(&attr.as_str());
    valid.then_some(attr)
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(Arc::new(BuildSystemRegistry::with_defaults()))
    }
}

/// `https://github.com/owner/repo` and `git@github.com:owner/repo.git` both
/// yield `owner`. Only hosts with an owner path segment are recognized.
pub(crate) fn owner_from_url(url: &str) -> Option<String> {
    HOSTS_WITH_OWNER.iter().find_map(|host| {
        let idx = url.find(host)?;
        let rest = url[idx + host.len()..].trim_start_matches(['/', ':']);
        let owner = rest.split('/').next()?;
        (!owner.is_empty()).then(|| owner.to_string())
    })
}

/// Browsable URL for the repository, without a trailing `.git`
pub(crate) fn homepage_from_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_string());
    }

    // scp-like git@host:owner/repo
    let (host, path) = url.strip_prefix("git@")?.split_once(':')?;
    Some(format!("https://{}/{}", host, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_systems::BuildSystemId;
    use crate::dependencies::Dependency;
    use std::path::PathBuf;

    fn analysis(build_system: BuildSystemId) -> RepoAnalysis {
        RepoAnalysis {
            project_name: "demo".to_string(),
            build_system,
            language: "rust".to_string(),
            languages: Vec::new(),
            dependencies: Vec::new(),
            build_files: Vec::new(),
            has_tests: false,
            license: "MIT".to_string(),
            description: "A demo project".to_string(),
            version: None,
            source_url: None,
            local_path: PathBuf::from("/tmp/demo"),
        }
    }

    #[test]
    fn test_defaults_and_pass_through() {
        let context = ContextBuilder::default().build(&analysis(BuildSystemId::Cargo));
        assert_eq!(context.project_name, "demo");
        assert_eq!(context.version, "0.1.0");
        assert_eq!(context.build_system, "cargo");
        assert_eq!(context.license, "MIT");
        assert!(context.owner.is_empty());
        assert!(context.native_build_inputs.is_empty());
        assert!(context.check_phase.is_empty());
    }

    #[test]
    fn test_source_url_sets_owner_and_homepage() {
        let analysis = analysis(BuildSystemId::Cargo)
            .with_source_url("https://github.com/acme/demo.git");
        let context = ContextBuilder::default().build(&analysis);
        assert_eq!(context.owner, "acme");
        assert_eq!(context.homepage, "https://github.com/acme/demo");
    }

    #[test]
    fn test_dependencies_split_and_system_inputs() {
        let mut analysis = analysis(BuildSystemId::Cmake);
        analysis.dependencies = vec![
            Dependency::system_library("openssl"),
            Dependency::system_library("openssl"),
            Dependency::runtime("fmt", "10"),
            Dependency::dev("gtest", "1.14"),
        ];
        let context = ContextBuilder::default().build(&analysis);

        assert_eq!(context.build_inputs, vec!["openssl"]);
        assert_eq!(context.native_build_inputs, vec!["cmake"]);
        assert_eq!(context.dependencies.get("fmt").map(String::as_str), Some("10"));
        assert!(context.dependencies.contains_key("openssl"));
        assert_eq!(context.dev_dependencies.len(), 1);
    }

    #[test]
    fn test_system_inputs_are_nixpkgs_attributes() {
        let mut analysis = analysis(BuildSystemId::Cmake);
        analysis.dependencies = crate::dependencies::cmake::parse_cmake_lists(
            "find_package(PkgConfig)\nfind_package(Threads)\n\
             pkg_check_modules(GLIB REQUIRED glib-2.0)\npkg_check_modules(X REQUIRED foo.bar)\n",
        );
        let context = ContextBuilder::default().build(&analysis);

        assert_eq!(context.build_inputs, vec!["glib"]);
        assert_eq!(context.native_build_inputs, vec!["cmake", "pkg-config"]);
    }

    #[test]
    fn test_rendered_header_is_valid_for_system_inputs() {
        use crate::templates::{TemplateRegistry, TemplateRenderer};

        let mut analysis = analysis(BuildSystemId::Cmake);
        analysis.language = "c".to_string();
        analysis.dependencies = vec![
            Dependency::system_library("pkgconfig"),
            Dependency::system_library("threads"),
            Dependency::system_library("glib-2.0"),
        ];
        let context = ContextBuilder::default().build(&analysis);
        let template = TemplateRegistry::with_defaults().lookup("c", "cmake").unwrap();
        let rendered = TemplateRenderer::new().render(&template, &context).unwrap();

        let header = rendered.lines().next().unwrap();
        assert!(header.contains("glib"));
        assert!(header.contains("pkg-config"));
        assert!(!header.contains("glib-2.0"));
        assert!(!header.contains("threads"));
        assert!(!header.contains("pkgconfig"));
        assert!(rendered.contains("buildInputs = [ glib ];"));
    }

    #[test]
    fn test_system_input_names() {
        assert_eq!(system_input("OpenSSL").as_deref(), Some("openssl"));
        assert_eq!(system_input("libfoo").as_deref(), Some("libfoo"));
        assert!(system_input("Threads").is_none());
        assert!(system_input("foo.bar").is_none());
        assert!(system_input("with").is_none());
    }

    #[test]
    fn test_check_phase_only_with_tests() {
        let mut analysis = analysis(BuildSystemId::GoModules);
        analysis.has_tests = true;
        let context = ContextBuilder::default().build(&analysis);
        assert_eq!(context.check_phase, "go test ./...");

        let mut analysis = analysis.clone();
        analysis.build_system = BuildSystemId::Meson;
        let context = ContextBuilder::default().build(&analysis);
        assert_eq!(context.check_phase, "meson test");
        assert_eq!(context.native_build_inputs, vec!["meson", "ninja", "pkg-config"]);
    }

    #[test]
    fn test_owner_from_url_forms() {
        assert_eq!(owner_from_url("git@github.com:acme/tool.git").as_deref(), Some("acme"));
        assert_eq!(owner_from_url("https://gitlab.com/group/proj").as_deref(), Some("group"));
        assert!(owner_from_url("https://example.org/a/b").is_none());
    }

    #[test]
    fn test_homepage_from_scp_url() {
        assert_eq!(
            homepage_from_url("git@github.com:acme/tool.git").as_deref(),
            Some("https://github.com/acme/tool")
        );
        assert!(homepage_from_url("/local/path").is_none());
    }
}
