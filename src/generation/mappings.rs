use crate::dependencies::Dependency;
use std::collections::BTreeMap;

/// Lowercased dependency name to nixpkgs attribute
pub const COMMON_MAPPINGS: &[(&str, &str)] = &[
    // system libraries
    ("openssl", "openssl"),
    ("zlib", "zlib"),
    ("libpng", "libpng"),
    ("libjpeg", "libjpeg"),
    ("sqlite", "sqlite"),
    ("curl", "curl"),
    ("git", "git"),
    ("cmake", "cmake"),
    ("pkg-config", "pkg-config"),
    ("pkgconfig", "pkg-config"),
    ("boost", "boost"),
    ("gtest", "gtest"),
    ("protobuf", "protobuf"),
    ("fmt", "fmt"),
    ("eigen3", "eigen"),
    ("sdl2", "SDL2"),
    ("png", "libpng"),
    ("jpeg", "libjpeg"),
    // pkg-config module names
    ("glib-2.0", "glib"),
    ("gio-2.0", "glib"),
    ("gobject-2.0", "glib"),
    ("gtk+-3.0", "gtk3"),
    ("gtk4", "gtk4"),
    ("libcurl", "curl"),
    ("libssl", "openssl"),
    ("libcrypto", "openssl"),
    ("sqlite3", "sqlite"),
    ("libxml-2.0", "libxml2"),
    // build tools
    ("make", "gnumake"),
    ("autoconf", "autoconf"),
    ("automake", "automake"),
    ("libtool", "libtool"),
    ("meson", "meson"),
    ("ninja", "ninja"),
    // toolchains
    ("python3", "python3"),
    ("nodejs", "nodejs"),
    ("npm", "nodejs"),
    ("cargo", "cargo"),
    ("rustc", "rustc"),
    ("go", "go"),
    ("gcc", "gcc"),
    ("clang", "clang"),
];

/// Libraries the compiler toolchain provides; they have no package of their own
pub(crate) const TOOLCHAIN_PROVIDED: &[&str] = &["threads", "pthread", "m", "dl", "rt"];

/// Tools that belong in `nativeBuildInputs` rather than `buildInputs`
pub(crate) const BUILD_TOOLS: &[&str] = &[
    "pkg-config",
    "cmake",
    "meson",
    "ninja",
    "gnumake",
    "autoconf",
    "automake",
    "libtool",
];

pub(crate) fn lookup(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    COMMON_MAPPINGS
        .iter()
        .find(|(dep, _)| *dep == name)
        .map(|(_, attr)| *attr)
}

/// Registry-name suggestions for known dependencies, keyed by the name as
/// declared in the manifest
pub fn suggest_mappings(dependencies: &[Dependency]) -> BTreeMap<String, String> {
    dependencies
        .iter()
        .filter_map(|dep| lookup(&dep.name).map(|attr| (dep.name.clone(), attr.to_string())))
        .collect()
}
