//! Field validation for generated nginx configuration
//!
//! Every value taken from a routing resource and interpolated into generated
//! nginx configuration or njs code passes through this crate first. Values are
//! classified as accepted or rejected, never rewritten.

pub mod composite;
pub mod config;
pub mod error;
pub mod field;
pub mod njs;
pub mod redirect;
pub mod rules;

// Re-export commonly used types for convenience
pub use composite::{FieldCapability, HttpFieldsValidator, HttpValidator};
pub use config::ValidationConfig;
pub use error::{Rule, RuleViolation, SetupError, ValidationResult};
pub use field::{FieldKind, FieldValue};
pub use njs::NjsMatchValidator;
pub use redirect::RedirectValidator;
