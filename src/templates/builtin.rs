//! Templates compiled into the binary

use super::DerivationTemplate;

/// (key, language, build system, text)
const BUILTIN: &[(&str, &str, &str, &str)] = &[
    (
        "javascript-npm",
        "javascript",
        "npm",
        include_str!("../../templates/javascript-npm.nix"),
    ),
    (
        "typescript-npm",
        "typescript",
        "npm",
        include_str!("../../templates/typescript-npm.nix"),
    ),
    (
        "python-pip",
        "python",
        "pip",
        include_str!("../../templates/python-pip.nix"),
    ),
    (
        "python-pyproject",
        "python",
        "pyproject",
        include_str!("../../templates/python-pyproject.nix"),
    ),
    (
        "rust-cargo",
        "rust",
        "cargo",
        include_str!("../../templates/rust-cargo.nix"),
    ),
    (
        "go-go-modules",
        "go",
        "go-modules",
        include_str!("../../templates/go-modules.nix"),
    ),
    (
        "c-cmake",
        "c",
        "cmake",
        include_str!("../../templates/c-cmake.nix"),
    ),
    (
        "cpp-cmake",
        "cpp",
        "cmake",
        include_str!("../../templates/cpp-cmake.nix"),
    ),
    ("default", "", "", include_str!("../../templates/default.nix")),
];

/// Language-only lookups
pub const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("javascript", "javascript-npm"),
    ("typescript", "typescript-npm"),
    ("python", "python-pip"),
    ("rust", "rust-cargo"),
    ("go", "go-go-modules"),
    ("c", "c-cmake"),
    ("cpp", "cpp-cmake"),
];

/// Build-system-only lookups, used when the language has no template
pub const BUILD_SYSTEM_ALIASES: &[(&str, &str)] = &[
    ("npm", "javascript-npm"),
    ("yarn", "javascript-npm"),
    ("pip", "python-pip"),
    ("pyproject", "python-pyproject"),
    ("cargo", "rust-cargo"),
    ("go-modules", "go-go-modules"),
    ("cmake", "c-cmake"),
];

pub fn templates() -> Vec<DerivationTemplate> {
    BUILTIN
        .iter()
        .map(|(key, language, build_system, text)| {
            DerivationTemplate::new(*key, *language, *build_system, *text)
        })
        .collect()
}
