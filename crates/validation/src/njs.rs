//! Validation of values spliced into generated njs match code
//!
//! Header and query parameter matches are serialized as `name:value` and
//! `name=value` strings inside a JSON document that the njs module parses at
//! request time. A value must never be able to terminate that string, split
//! into an extra part, or expand an nginx variable on the way in.

use crate::composite::FieldCapability;
use crate::config::ValidationConfig;
use crate::error::{RuleViolation, ValidationResult};
use crate::field::{FieldKind, FieldValue};
use crate::rules::{
    check_forbidden_chars, check_max_length, check_no_control_chars,
    check_no_surrounding_whitespace, check_no_whitespace, check_not_empty, check_prefix,
    check_supported, check_token, expect_text,
};

/// Characters that can escape a string literal or alter how njs splits a match part
const NJS_FORBIDDEN: [char; 6] = ['"', '\'', '`', '\\', '$', '|'];

/// Characters that end or open a block in an nginx `location` prefix
const PATH_FORBIDDEN: [char; 7] = ['{', '}', ';', '"', '\'', '\\', '$'];

/// Validates header, query parameter, method and path match fields
#[derive(Debug, Clone)]
pub struct NjsMatchValidator {
    max_name_length: usize,
    max_value_length: usize,
    max_path_length: usize,
    allow_empty_values: bool,
    methods: Vec<String>,
}

impl NjsMatchValidator {
    pub const NAME: &'static str = "njs-match";

    pub const CLAIMS: &'static [FieldKind] = &[
        FieldKind::HeaderName,
        FieldKind::HeaderValue,
        FieldKind::QueryParamName,
        FieldKind::QueryParamValue,
        FieldKind::Method,
        FieldKind::MatchPath,
    ];

    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            max_name_length: config.max_name_length,
            max_value_length: config.max_value_length,
            max_path_length: config.max_path_length,
            allow_empty_values: config.allow_empty_match_values,
            methods: config.supported_methods.clone(),
        }
    }

    pub fn validate_header_name(&self, name: &str) -> ValidationResult {
        self.validate_name(FieldKind::HeaderName, name)
    }

    /// `:` separates name from value in the serialized header part
    pub fn validate_header_value(&self, value: &str) -> ValidationResult {
        let field = FieldKind::HeaderValue;
        if !self.validate_value_presence(field, value)? {
            return Ok(());
        }
        check_forbidden_chars(field, value, &[':'])
    }

    pub fn validate_query_param_name(&self, name: &str) -> ValidationResult {
        let field = FieldKind::QueryParamName;
        self.validate_name(field, name)?;
        check_forbidden_chars(field, name, &['='])
    }

    /// `=` separates name from value in the serialized query part
    pub fn validate_query_param_value(&self, value: &str) -> ValidationResult {
        let field = FieldKind::QueryParamValue;
        if !self.validate_value_presence(field, value)? {
            return Ok(());
        }
        check_forbidden_chars(field, value, &['='])
    }

    pub fn validate_method(&self, method: &str) -> ValidationResult {
        check_supported(
            FieldKind::Method,
            method,
            self.methods.iter().map(String::as_str),
        )
    }

    /// Prefix path used as an nginx `location` and compared by njs
    pub fn validate_path(&self, path: &str) -> ValidationResult {
        let field = FieldKind::MatchPath;
        check_not_empty(field, path)?;
        check_max_length(field, path, self.max_path_length)?;
        check_prefix(field, path, "/")?;
        check_no_control_chars(field, path)?;
        check_no_whitespace(field, path)?;
        check_forbidden_chars(field, path, &PATH_FORBIDDEN)
    }

    fn validate_name(&self, field: FieldKind, name: &str) -> ValidationResult {
        check_not_empty(field, name)?;
        check_max_length(field, name, self.max_name_length)?;
        check_no_control_chars(field, name)?;
        check_forbidden_chars(field, name, &NJS_FORBIDDEN)?;
        check_token(field, name)
    }

    /// Shared checks for match values. Returns false when the value is an
    /// accepted empty presence match and no further rules apply.
    fn validate_value_presence(
        &self,
        field: FieldKind,
        value: &str,
    ) -> Result<bool, RuleViolation> {
        if value.is_empty() && self.allow_empty_values {
            return Ok(false);
        }
        check_not_empty(field, value)?;
        check_max_length(field, value, self.max_value_length)?;
        check_no_control_chars(field, value)?;
        check_forbidden_chars(field, value, &NJS_FORBIDDEN)?;
        check_no_surrounding_whitespace(field, value)?;
        Ok(true)
    }
}

impl FieldCapability for NjsMatchValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn claims(&self) -> &'static [FieldKind] {
        Self::CLAIMS
    }

    fn validate(&self, field: FieldKind, value: FieldValue<'_>) -> ValidationResult {
        if !Self::CLAIMS.contains(&field) {
            return Err(RuleViolation::unclaimed(field, Self::NAME));
        }
        let text = expect_text(field, value)?;
        match field {
            FieldKind::HeaderName => self.validate_header_name(text),
            FieldKind::HeaderValue => self.validate_header_value(text),
            FieldKind::QueryParamName => self.validate_query_param_name(text),
            FieldKind::QueryParamValue => self.validate_query_param_value(text),
            FieldKind::Method => self.validate_method(text),
            FieldKind::MatchPath => self.validate_path(text),
            other => Err(RuleViolation::unclaimed(other, Self::NAME)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rule;

    fn validator() -> NjsMatchValidator {
        NjsMatchValidator::new(&ValidationConfig::default())
    }

    #[test]
    fn test_header_match_valid() {
        let v = validator();
        assert!(v.validate_header_name("X-Test").is_ok());
        assert!(v.validate_header_value("ok").is_ok());
        assert!(v.validate_header_value("text/html; charset=utf-8").is_ok());
        assert!(v.validate_header_value("a value with spaces").is_ok());
    }

    #[test]
    fn test_header_value_injection_rejected() {
        let v = validator();
        for bad in [
            "\"; malicious_directive;",
            "back\\slash",
            "line\nbreak",
            "carriage\rreturn",
            "single'quote",
            "`template`",
            "${var}",
            "a|b",
        ] {
            let err = v.validate_header_value(bad).unwrap_err();
            assert_eq!(err.rule, Rule::CharacterClass, "value: {:?}", bad);
            assert_eq!(err.field, FieldKind::HeaderValue);
        }

        let err = v.validate_header_value("\"; malicious_directive;").unwrap_err();
        assert_eq!(err.reason, "must not contain '\"' (double quote)");
        assert!(!err.to_string().contains("malicious_directive"));
    }

    #[test]
    fn test_header_value_separator_and_whitespace() {
        let v = validator();
        assert!(v.validate_header_value("a:b").is_err());
        let err = v.validate_header_value(" padded ").unwrap_err();
        assert_eq!(err.rule, Rule::Whitespace);
    }

    #[test]
    fn test_header_name_rules() {
        let v = validator();
        assert_eq!(v.validate_header_name("").unwrap_err().rule, Rule::NotEmpty);
        assert_eq!(v.validate_header_name("X Test").unwrap_err().rule, Rule::Token);
        assert_eq!(v.validate_header_name("X:Test").unwrap_err().rule, Rule::Token);
        assert_eq!(
            v.validate_header_name("X|Test").unwrap_err().rule,
            Rule::CharacterClass
        );
        assert!(v.validate_header_name("X-Test\n").is_err());
        assert!(v.validate_header_name(&"a".repeat(256)).is_ok());
        assert!(v.validate_header_name(&"a".repeat(257)).is_err());
    }

    #[test]
    fn test_header_value_length_boundary() {
        let v = validator();
        assert!(v.validate_header_value(&"a".repeat(4096)).is_ok());
        let err = v.validate_header_value(&"a".repeat(4097)).unwrap_err();
        assert_eq!(err.rule, Rule::MaxLength);
    }

    #[test]
    fn test_query_param_rules() {
        let v = validator();
        assert!(v.validate_query_param_name("page").is_ok());
        assert!(v.validate_query_param_value("2").is_ok());
        assert!(v.validate_query_param_value("a:b").is_ok());

        assert!(v.validate_query_param_name("a=b").is_err());
        assert!(v.validate_query_param_value("a=b").is_err());
        assert!(v.validate_query_param_value("x\"y").is_err());
        assert!(v.validate_query_param_value("x\ny").is_err());
        assert!(v.validate_query_param_name("").is_err());
    }

    #[test]
    fn test_empty_value_policy() {
        let strict = validator();
        assert_eq!(
            strict.validate_header_value("").unwrap_err().rule,
            Rule::NotEmpty
        );
        assert!(strict.validate_query_param_value("").is_err());

        let lenient = NjsMatchValidator::new(&ValidationConfig {
            allow_empty_match_values: true,
            ..Default::default()
        });
        assert!(lenient.validate_header_value("").is_ok());
        assert!(lenient.validate_query_param_value("").is_ok());
        // names stay mandatory
        assert!(lenient.validate_header_name("").is_err());
        assert!(lenient.validate_query_param_name("").is_err());
    }

    #[test]
    fn test_method() {
        let v = validator();
        assert!(v.validate_method("GET").is_ok());
        assert!(v.validate_method("PATCH").is_ok());
        let err = v.validate_method("FOOBAR").unwrap_err();
        assert_eq!(err.rule, Rule::Supported);
        assert!(v.validate_method("get").is_err());
    }

    #[test]
    fn test_path() {
        let v = validator();
        assert!(v.validate_path("/").is_ok());
        assert!(v.validate_path("/path/subpath-123").is_ok());

        assert_eq!(v.validate_path("").unwrap_err().rule, Rule::NotEmpty);
        assert_eq!(v.validate_path("path").unwrap_err().rule, Rule::RequiredPrefix);
        assert!(v.validate_path("/a b").is_err());
        assert!(v.validate_path("/a{b").is_err());
        assert!(v.validate_path("/a;b").is_err());
        assert!(v.validate_path("/$uri").is_err());
        assert!(v.validate_path(&format!("/{}", "a".repeat(1024))).is_err());
    }

    #[test]
    fn test_capability_dispatch() {
        let v = validator();
        assert!(v.validate(FieldKind::Method, FieldValue::Text("GET")).is_ok());
        let err = v
            .validate(FieldKind::HeaderValue, FieldValue::Number(1))
            .unwrap_err();
        assert_eq!(err.rule, Rule::ValueType);
    }

    #[test]
    fn test_foreign_field_kind_is_rejected() {
        let v = validator();
        let err = v
            .validate(FieldKind::RedirectPath, FieldValue::Text("/x"))
            .unwrap_err();
        assert_eq!(err.rule, Rule::Unclaimed);
        assert_eq!(err.field, FieldKind::RedirectPath);

        let err = v
            .validate(FieldKind::RedirectPort, FieldValue::Number(80))
            .unwrap_err();
        assert_eq!(err.rule, Rule::Unclaimed);
    }
}
