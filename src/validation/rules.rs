use regex::Regex;
use std::sync::LazyLock;

static BUILDER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(mkDerivation|build\w*(Package|Module|Application))\b").expect("valid regex")
});

/// nativeBuildInputs that install their own build, check and install phases
const SETUP_HOOKS: &[&str] = &["cmake", "meson", "autoreconfHook", "qmake", "scons"];

const REQUIRED_ATTRIBUTES: &[&str] = &["pname", "version", "src"];

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, derivation: &str) -> Vec<String>;
}

fn uses_bare_mkderivation(derivation: &str) -> bool {
    derivation.contains("stdenv.mkDerivation")
        && !SETUP_HOOKS
            .iter()
            .any(|hook| contains_word(derivation, hook))
}

fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(idx, _)| {
        let before = text[..idx].chars().next_back();
        let after = text[idx + word.len()..].chars().next();
        let is_ident = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-');
        !is_ident(before) && !is_ident(after)
    })
}

pub struct FunctionHeaderRule;

impl ValidationRule for FunctionHeaderRule {
    fn name(&self) -> &'static str {
        "FunctionHeader"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        if derivation.trim_start().starts_with('{') {
            Vec::new()
        } else {
            vec!["Derivation should start with opening brace {".to_string()]
        }
    }
}

pub struct ClosingBraceRule;

impl ValidationRule for ClosingBraceRule {
    fn name(&self) -> &'static str {
        "ClosingBrace"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        if derivation.trim_end().ends_with('}') {
            Vec::new()
        } else {
            vec!["Derivation should end with closing brace }".to_string()]
        }
    }
}

pub struct RequiredAttributesRule;

impl ValidationRule for RequiredAttributesRule {
    fn name(&self) -> &'static str {
        "RequiredAttributes"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        REQUIRED_ATTRIBUTES
            .iter()
            .filter(|attr| !contains_word(derivation, attr))
            .map(|attr| format!("Missing required attribute: {}", attr))
            .collect()
    }
}

pub struct MetaSectionRule;

impl ValidationRule for MetaSectionRule {
    fn name(&self) -> &'static str {
        "MetaSection"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        if contains_word(derivation, "meta") {
            Vec::new()
        } else {
            vec!["Missing meta section (recommended)".to_string()]
        }
    }
}

pub struct BalancedBracesRule;

impl ValidationRule for BalancedBracesRule {
    fn name(&self) -> &'static str {
        "BalancedBraces"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        let depth = derivation.chars().fold(0i64, |depth, c| match c {
            '{' => depth + 1,
            '}' => depth - 1,
            _ => depth,
        });

        if depth == 0 {
            Vec::new()
        } else {
            vec!["Unbalanced braces in derivation".to_string()]
        }
    }
}

pub struct BuilderCallRule;

impl ValidationRule for BuilderCallRule {
    fn name(&self) -> &'static str {
        "BuilderCall"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        if BUILDER_CALL.is_match(derivation) {
            Vec::new()
        } else {
            vec![
                "No builder call found (expected stdenv.mkDerivation or a build*Package function)"
                    .to_string(),
            ]
        }
    }
}

/// `stdenv.mkDerivation` without a setup hook falls back to `make install`
pub struct InstallPhaseRule;

impl ValidationRule for InstallPhaseRule {
    fn name(&self) -> &'static str {
        "InstallPhase"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        if uses_bare_mkderivation(derivation) && !derivation.contains("installPhase") {
            vec!["No installPhase: stdenv.mkDerivation will fall back to `make install`".to_string()]
        } else {
            Vec::new()
        }
    }
}

pub struct CheckPhaseRule;

impl ValidationRule for CheckPhaseRule {
    fn name(&self) -> &'static str {
        "CheckPhase"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        let checks_enabled = derivation
            .lines()
            .any(|line| line.split_whitespace().collect::<String>() == "doCheck=true;");

        if checks_enabled
            && uses_bare_mkderivation(derivation)
            && !derivation.contains("checkPhase")
        {
            vec!["doCheck = true without a checkPhase: the default check runs `make check`".to_string()]
        } else {
            Vec::new()
        }
    }
}

pub struct PlaceholderHashRule;

impl ValidationRule for PlaceholderHashRule {
    fn name(&self) -> &'static str {
        "PlaceholderHash"
    }

    fn check(&self, derivation: &str) -> Vec<String> {
        if derivation.contains("lib.fakeHash") || derivation.contains("sha256-AAAA") {
            vec!["Placeholder hash present: replace it with the hash reported by the first build".to_string()]
        } else {
            Vec::new()
        }
    }
}
