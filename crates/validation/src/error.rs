use crate::field::FieldKind;
use std::fmt;
use thiserror::Error;

/// Name of the rule a value violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    NotEmpty,
    MaxLength,
    Whitespace,
    CharacterClass,
    Token,
    RequiredPrefix,
    NumericRange,
    Supported,
    Hostname,
    ValueType,
    Unclaimed,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::NotEmpty => "not-empty",
            Rule::MaxLength => "max-length",
            Rule::Whitespace => "whitespace",
            Rule::CharacterClass => "character-class",
            Rule::Token => "token",
            Rule::RequiredPrefix => "required-prefix",
            Rule::NumericRange => "numeric-range",
            Rule::Supported => "supported-value",
            Rule::Hostname => "hostname",
            Rule::ValueType => "value-type",
            Rule::Unclaimed => "unclaimed",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value failed a validation rule
///
/// The reason never contains the rejected value itself, so it is safe to copy
/// into resource status and logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct RuleViolation {
    pub field: FieldKind,
    pub rule: Rule,
    pub reason: String,
}

impl RuleViolation {
    pub fn new(field: FieldKind, rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            field,
            rule,
            reason: reason.into(),
        }
    }

    /// A capability was asked about a field kind it does not own
    pub fn unclaimed(field: FieldKind, capability: &str) -> Self {
        Self::new(
            field,
            Rule::Unclaimed,
            format!("is not validated by {}", capability),
        )
    }
}

/// Outcome of validating one field
pub type ValidationResult = std::result::Result<(), RuleViolation>;

/// Errors raised while wiring validators at start-up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("No validator claims field kind {0}")]
    UnclaimedFieldKind(FieldKind),

    #[error("Field kind {kind} is claimed by both {first} and {second}")]
    DuplicateClaim {
        kind: FieldKind,
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid validation config: {0}")]
    InvalidConfig(String),
}
