//! Validation of values rendered into an nginx redirect `return` directive
//!
//! The directive is raw configuration text, so anything that can end the
//! directive or start a new one is rejected before any syntax rule runs.

use crate::composite::FieldCapability;
use crate::config::{MAX_PORT, MIN_PORT, ValidationConfig};
use crate::error::{RuleViolation, ValidationResult};
use crate::field::{FieldKind, FieldValue};
use crate::rules::{
    check_forbidden_chars, check_hostname, check_max_length, check_no_control_chars,
    check_no_whitespace, check_not_empty, check_prefix, check_range, check_supported,
    expect_number, expect_text,
};

/// Characters that terminate a directive, open a block, quote, or expand a variable
const DIRECTIVE_FORBIDDEN: [char; 7] = [';', '{', '}', '"', '\'', '\\', '$'];

/// Validates scheme, hostname, port, path and status code of a redirect
#[derive(Debug, Clone)]
pub struct RedirectValidator {
    max_path_length: usize,
    max_hostname_length: usize,
    schemes: Vec<String>,
    status_codes: Vec<u16>,
    default_status: u16,
}

impl RedirectValidator {
    pub const NAME: &'static str = "redirect";

    pub const CLAIMS: &'static [FieldKind] = &[
        FieldKind::RedirectScheme,
        FieldKind::RedirectHostname,
        FieldKind::RedirectPort,
        FieldKind::RedirectPath,
        FieldKind::RedirectStatusCode,
    ];

    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            max_path_length: config.max_path_length,
            max_hostname_length: config.max_hostname_length,
            schemes: config.supported_schemes.clone(),
            status_codes: config.supported_redirect_status_codes.clone(),
            default_status: config.default_redirect_status_code(),
        }
    }

    pub fn validate_scheme(&self, scheme: &str) -> ValidationResult {
        check_supported(
            FieldKind::RedirectScheme,
            scheme,
            self.schemes.iter().map(String::as_str),
        )
    }

    pub fn validate_hostname(&self, hostname: &str) -> ValidationResult {
        let field = FieldKind::RedirectHostname;
        check_no_control_chars(field, hostname)?;
        check_no_whitespace(field, hostname)?;
        check_forbidden_chars(field, hostname, &DIRECTIVE_FORBIDDEN)?;
        check_hostname(field, hostname, self.max_hostname_length)
    }

    pub fn validate_port(&self, port: i64) -> ValidationResult {
        check_range(FieldKind::RedirectPort, port, MIN_PORT, MAX_PORT)
    }

    /// Percent-encoding is not inspected here
    pub fn validate_path(&self, path: &str) -> ValidationResult {
        let field = FieldKind::RedirectPath;
        check_not_empty(field, path)?;
        check_max_length(field, path, self.max_path_length)?;
        check_prefix(field, path, "/")?;
        check_no_control_chars(field, path)?;
        check_no_whitespace(field, path)?;
        check_forbidden_chars(field, path, &DIRECTIVE_FORBIDDEN)
    }

    /// Status code used when a redirect leaves it unset; always supported
    pub fn default_status_code(&self) -> u16 {
        self.default_status
    }

    pub fn validate_status_code(&self, code: i64) -> ValidationResult {
        let field = FieldKind::RedirectStatusCode;
        check_supported(field, code, self.status_codes.iter().map(|c| i64::from(*c)))
    }
}

impl FieldCapability for RedirectValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn claims(&self) -> &'static [FieldKind] {
        Self::CLAIMS
    }

    fn validate(&self, field: FieldKind, value: FieldValue<'_>) -> ValidationResult {
        match field {
            FieldKind::RedirectScheme => self.validate_scheme(expect_text(field, value)?),
            FieldKind::RedirectHostname => self.validate_hostname(expect_text(field, value)?),
            FieldKind::RedirectPort => self.validate_port(expect_number(field, value)?),
            FieldKind::RedirectPath => self.validate_path(expect_text(field, value)?),
            FieldKind::RedirectStatusCode => {
                self.validate_status_code(expect_number(field, value)?)
            }
            other => Err(RuleViolation::unclaimed(other, Self::NAME)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rule;

    fn validator() -> RedirectValidator {
        RedirectValidator::new(&ValidationConfig::default())
    }

    #[test]
    fn test_scheme() {
        let v = validator();
        assert!(v.validate_scheme("http").is_ok());
        assert!(v.validate_scheme("https").is_ok());
        assert_eq!(v.validate_scheme("ftp").unwrap_err().rule, Rule::Supported);
        assert!(v.validate_scheme("HTTPS").is_err());
        assert!(v.validate_scheme("").is_err());
    }

    #[test]
    fn test_hostname() {
        let v = validator();
        assert!(v.validate_hostname("example.com").is_ok());
        assert!(v.validate_hostname("foo-bar.example.com").is_ok());

        assert!(v.validate_hostname("").is_err());
        assert!(v.validate_hostname("-foo.example.com").is_err());
        assert!(v.validate_hostname("foo_bar.com").is_err());
    }

    #[test]
    fn test_hostname_directive_injection() {
        let v = validator();
        let err = v.validate_hostname("example.com\nadd_header").unwrap_err();
        assert_eq!(err.rule, Rule::CharacterClass);
        assert!(err.reason.contains("newline"));

        // every label on its own is DNS-legal
        let err = v.validate_hostname("example\n.com").unwrap_err();
        assert_eq!(err.rule, Rule::CharacterClass);

        let err = v.validate_hostname("example.com;return").unwrap_err();
        assert_eq!(err.reason, "must not contain ';' (semicolon)");
        assert!(v.validate_hostname("$host").is_err());
    }

    #[test]
    fn test_port_range() {
        let v = validator();
        assert!(v.validate_port(1).is_ok());
        assert!(v.validate_port(8443).is_ok());
        assert!(v.validate_port(65535).is_ok());
        assert_eq!(v.validate_port(0).unwrap_err().rule, Rule::NumericRange);
        assert!(v.validate_port(65536).is_err());
        assert!(v.validate_port(-80).is_err());
    }

    #[test]
    fn test_path() {
        let v = validator();
        assert!(v.validate_path("/").is_ok());
        assert!(v.validate_path("/ok").is_ok());
        assert!(v.validate_path("/a%20b/c?x=1").is_ok());

        let err = v.validate_path("/ok\nadd_header X y;").unwrap_err();
        assert_eq!(err.rule, Rule::CharacterClass);
        assert!(err.reason.contains("newline"));

        assert!(v.validate_path("/a;b").is_err());
        assert!(v.validate_path("/a\"b").is_err());
        assert!(v.validate_path("/a'b").is_err());
        assert!(v.validate_path("/a b").is_err());
        assert!(v.validate_path("/a\rb").is_err());
        assert_eq!(v.validate_path("ok").unwrap_err().rule, Rule::RequiredPrefix);
        assert_eq!(v.validate_path("").unwrap_err().rule, Rule::NotEmpty);
    }

    #[test]
    fn test_status_code() {
        let v = validator();
        for code in [301, 302, 303, 307, 308] {
            assert!(v.validate_status_code(code).is_ok(), "code: {}", code);
        }
        assert_eq!(v.validate_status_code(404).unwrap_err().rule, Rule::Supported);
        assert!(v.validate_status_code(200).is_err());
        assert!(v.validate_status_code(300).is_err());
    }

    #[test]
    fn test_status_code_set_is_configurable() {
        let v = RedirectValidator::new(&ValidationConfig {
            supported_redirect_status_codes: vec![301, 302],
            ..Default::default()
        });
        assert!(v.validate_status_code(302).is_ok());
        let err = v.validate_status_code(308).unwrap_err();
        assert_eq!(err.reason, "unsupported value; supported values: 301, 302");
    }

    #[test]
    fn test_default_status_code_is_supported() {
        assert_eq!(validator().default_status_code(), 302);

        let v = RedirectValidator::new(&ValidationConfig {
            supported_redirect_status_codes: vec![301],
            ..Default::default()
        });
        assert_eq!(v.default_status_code(), 301);
        assert!(
            v.validate_status_code(i64::from(v.default_status_code()))
                .is_ok()
        );
    }

    #[test]
    fn test_capability_dispatch() {
        let v = validator();
        assert!(
            v.validate(FieldKind::RedirectPort, FieldValue::Number(8443))
                .is_ok()
        );
        let err = v
            .validate(FieldKind::RedirectPort, FieldValue::Text("8443"))
            .unwrap_err();
        assert_eq!(err.rule, Rule::ValueType);
    }

    #[test]
    fn test_foreign_field_kind_is_rejected() {
        let v = validator();
        let err = v
            .validate(FieldKind::HeaderValue, FieldValue::Text("ok"))
            .unwrap_err();
        assert_eq!(err.rule, Rule::Unclaimed);
        assert_eq!(err.reason, "is not validated by redirect");
    }
}
