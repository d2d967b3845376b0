//! Structural checks over generated derivation text
//!
//! Every rule is independent and advisory: rules report warnings and never
//! change or reject the derivation.

pub mod rules;
pub mod validator;

pub use rules::ValidationRule;
pub use validator::DerivationValidator;
