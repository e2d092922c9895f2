//! Value validator primitives
//!
//! Each check inspects one scalar against one rule and reports the first
//! violation. Checks never rewrite the value, and violation reasons never echo
//! it: offending characters are quoted in escaped form only.

use crate::config::MAX_LABEL_LENGTH;
use crate::error::{Rule, RuleViolation, ValidationResult};
use crate::field::{FieldKind, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

/// Regex for a single DNS label (RFC 1123)
static DNS_LABEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?$").unwrap());

/// Regex for an RFC 9110 token (header field names, methods)
static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").unwrap());

/// Render a character for a violation reason without emitting it raw
pub fn describe_char(c: char) -> String {
    let shown: String = if c.is_ascii_graphic() {
        c.to_string()
    } else {
        c.escape_default().collect()
    };

    let name = match c {
        '"' => Some("double quote"),
        '\'' => Some("single quote"),
        '`' => Some("backtick"),
        '\\' => Some("backslash"),
        '\n' => Some("newline"),
        '\r' => Some("carriage return"),
        '\t' => Some("tab"),
        ' ' => Some("space"),
        ';' => Some("semicolon"),
        '$' => Some("dollar sign"),
        '|' => Some("pipe"),
        _ => None,
    };

    match name {
        Some(name) => format!("'{}' ({})", shown, name),
        None => format!("'{}'", shown),
    }
}

/// Unwrap a text value or report a type mismatch
pub fn expect_text<'a>(field: FieldKind, value: FieldValue<'a>) -> Result<&'a str, RuleViolation> {
    match value {
        FieldValue::Text(text) => Ok(text),
        FieldValue::Number(_) => Err(RuleViolation::new(
            field,
            Rule::ValueType,
            "must be a string",
        )),
    }
}

/// Unwrap an integer value or report a type mismatch
pub fn expect_number(field: FieldKind, value: FieldValue<'_>) -> Result<i64, RuleViolation> {
    match value {
        FieldValue::Number(number) => Ok(number),
        FieldValue::Text(_) => Err(RuleViolation::new(
            field,
            Rule::ValueType,
            "must be an integer",
        )),
    }
}

/// Reject an empty string
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_not_empty;
///
/// assert!(check_not_empty(FieldKind::HeaderName, "X-Test").is_ok());
/// assert!(check_not_empty(FieldKind::HeaderName, "").is_err());
/// ```
pub fn check_not_empty(field: FieldKind, value: &str) -> ValidationResult {
    if value.is_empty() {
        return Err(RuleViolation::new(field, Rule::NotEmpty, "cannot be empty"));
    }
    Ok(())
}

/// Reject values longer than `max`
///
/// Length is measured in bytes, which bounds the rendered output size.
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_max_length;
///
/// assert!(check_max_length(FieldKind::HeaderValue, "abcd", 4).is_ok());
/// // two bytes per character
/// assert!(check_max_length(FieldKind::HeaderValue, "ééé", 4).is_err());
/// ```
pub fn check_max_length(field: FieldKind, value: &str, max: usize) -> ValidationResult {
    if value.len() > max {
        return Err(RuleViolation::new(
            field,
            Rule::MaxLength,
            format!("must be at most {} bytes (got {})", max, value.len()),
        ));
    }
    Ok(())
}

/// Reject leading or trailing whitespace
pub fn check_no_surrounding_whitespace(field: FieldKind, value: &str) -> ValidationResult {
    if value.trim() != value {
        return Err(RuleViolation::new(
            field,
            Rule::Whitespace,
            "cannot have leading or trailing whitespace",
        ));
    }
    Ok(())
}

/// Reject control characters, including newline, carriage return and tab
pub fn check_no_control_chars(field: FieldKind, value: &str) -> ValidationResult {
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(RuleViolation::new(
            field,
            Rule::CharacterClass,
            format!("must not contain control character {}", describe_char(c)),
        ));
    }
    Ok(())
}

/// Reject any whitespace, ASCII or Unicode
pub fn check_no_whitespace(field: FieldKind, value: &str) -> ValidationResult {
    if let Some(c) = value.chars().find(|c| c.is_whitespace()) {
        return Err(RuleViolation::new(
            field,
            Rule::CharacterClass,
            format!("must not contain whitespace {}", describe_char(c)),
        ));
    }
    Ok(())
}

/// Reject the first character of `value` found in `forbidden`
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_forbidden_chars;
///
/// let forbidden = [';', '$'];
/// assert!(check_forbidden_chars(FieldKind::RedirectPath, "/ok", &forbidden).is_ok());
///
/// let err = check_forbidden_chars(FieldKind::RedirectPath, "/a;b", &forbidden).unwrap_err();
/// assert_eq!(err.reason, "must not contain ';' (semicolon)");
/// ```
pub fn check_forbidden_chars(field: FieldKind, value: &str, forbidden: &[char]) -> ValidationResult {
    if let Some(c) = value.chars().find(|c| forbidden.contains(c)) {
        return Err(RuleViolation::new(
            field,
            Rule::CharacterClass,
            format!("must not contain {}", describe_char(c)),
        ));
    }
    Ok(())
}

/// Require an RFC 9110 token: visible ASCII excluding delimiters (`tchar`)
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_token;
///
/// assert!(check_token(FieldKind::HeaderName, "X-Request-Id").is_ok());
/// assert!(check_token(FieldKind::HeaderName, "X Test").is_err());
/// assert!(check_token(FieldKind::HeaderName, "X:Test").is_err());
/// ```
pub fn check_token(field: FieldKind, value: &str) -> ValidationResult {
    if TOKEN_REGEX.is_match(value) {
        return Ok(());
    }

    let reason = match value.chars().find(|c| !is_tchar(*c)) {
        Some(c) => format!("must be a token; {} is not allowed", describe_char(c)),
        None => "must be a token".to_string(),
    };
    Err(RuleViolation::new(field, Rule::Token, reason))
}

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

/// Require `value` to start with `prefix`
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_prefix;
///
/// assert!(check_prefix(FieldKind::MatchPath, "/coffee", "/").is_ok());
/// assert!(check_prefix(FieldKind::MatchPath, "coffee", "/").is_err());
/// ```
pub fn check_prefix(field: FieldKind, value: &str, prefix: &str) -> ValidationResult {
    if !value.starts_with(prefix) {
        return Err(RuleViolation::new(
            field,
            Rule::RequiredPrefix,
            format!("must start with '{}'", prefix),
        ));
    }
    Ok(())
}

/// Require `min <= value <= max`
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_range;
///
/// assert!(check_range(FieldKind::RedirectPort, 65535, 1, 65535).is_ok());
/// assert!(check_range(FieldKind::RedirectPort, 0, 1, 65535).is_err());
/// ```
pub fn check_range(field: FieldKind, value: i64, min: i64, max: i64) -> ValidationResult {
    if !(min..=max).contains(&value) {
        return Err(RuleViolation::new(
            field,
            Rule::NumericRange,
            format!("must be between {} and {} (got {})", min, max, value),
        ));
    }
    Ok(())
}

/// Require membership in a fixed set
///
/// The reason lists the supported values but never repeats the rejected one.
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_supported;
///
/// let schemes = ["http", "https"];
/// assert!(check_supported(FieldKind::RedirectScheme, "https", schemes).is_ok());
///
/// let err = check_supported(FieldKind::RedirectScheme, "ftp", schemes).unwrap_err();
/// assert_eq!(err.reason, "unsupported value; supported values: http, https");
/// ```
pub fn check_supported<T, I>(field: FieldKind, value: T, supported: I) -> ValidationResult
where
    T: PartialEq + Display,
    I: IntoIterator<Item = T> + Clone,
{
    if supported.clone().into_iter().any(|s| s == value) {
        return Ok(());
    }

    let values = supported
        .into_iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(RuleViolation::new(
        field,
        Rule::Supported,
        format!("unsupported value; supported values: {}", values),
    ))
}

/// Require a DNS hostname made of dot-separated RFC 1123 labels
///
/// `max` bounds the whole name; each label is bounded separately.
///
/// # Examples
///
/// ```
/// use gateway_validation::FieldKind;
/// use gateway_validation::rules::check_hostname;
///
/// assert!(check_hostname(FieldKind::RedirectHostname, "cafe.example.com", 253).is_ok());
/// assert!(check_hostname(FieldKind::RedirectHostname, "cafe..com", 253).is_err());
/// assert!(check_hostname(FieldKind::RedirectHostname, "-cafe.com", 253).is_err());
/// ```
pub fn check_hostname(field: FieldKind, value: &str, max: usize) -> ValidationResult {
    check_not_empty(field, value)?;
    check_max_length(field, value, max)?;

    for label in value.split('.') {
        if label.is_empty() {
            return Err(RuleViolation::new(
                field,
                Rule::Hostname,
                "must not contain empty labels",
            ));
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(RuleViolation::new(
                field,
                Rule::Hostname,
                format!("labels must be at most {} characters", MAX_LABEL_LENGTH),
            ));
        }
        if !DNS_LABEL_REGEX.is_match(label) {
            let reason = match label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
                Some(c) => format!(
                    "labels must be alphanumeric or '-'; {} is not allowed",
                    describe_char(c)
                ),
                None => "labels must not start or end with '-'".to_string(),
            };
            return Err(RuleViolation::new(field, Rule::Hostname, reason));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: FieldKind = FieldKind::HeaderValue;

    #[test]
    fn test_describe_char() {
        assert_eq!(describe_char('"'), "'\"' (double quote)");
        assert_eq!(describe_char('\n'), "'\\n' (newline)");
        assert_eq!(describe_char('{'), "'{'");
        assert_eq!(describe_char('\u{0}'), "'\\u{0}'");
        // non-ASCII is escaped, never emitted raw
        assert!(!describe_char('™').contains('™'));
    }

    #[test]
    fn test_expect_types() {
        assert_eq!(expect_text(F, FieldValue::Text("ok")).unwrap(), "ok");
        let err = expect_text(F, FieldValue::Number(1)).unwrap_err();
        assert_eq!(err.rule, Rule::ValueType);

        assert_eq!(expect_number(F, FieldValue::Number(8)).unwrap(), 8);
        assert!(expect_number(F, FieldValue::Text("8")).is_err());
    }

    #[test]
    fn test_max_length_boundary() {
        assert!(check_max_length(F, &"a".repeat(10), 10).is_ok());
        let err = check_max_length(F, &"a".repeat(11), 10).unwrap_err();
        assert_eq!(err.rule, Rule::MaxLength);
        assert_eq!(err.reason, "must be at most 10 bytes (got 11)");
    }

    #[test]
    fn test_whitespace_checks() {
        assert!(check_no_surrounding_whitespace(F, "a b").is_ok());
        assert!(check_no_surrounding_whitespace(F, " a").is_err());
        assert!(check_no_surrounding_whitespace(F, "a\t").is_err());

        assert!(check_no_whitespace(F, "/a/b").is_ok());
        assert!(check_no_whitespace(F, "/a b").is_err());
        assert!(check_no_whitespace(F, "/a\nb").is_err());
    }

    #[test]
    fn test_control_chars() {
        assert!(check_no_control_chars(F, "plain value").is_ok());
        for bad in ["a\nb", "a\rb", "a\0b", "a\tb", "a\u{7f}b"] {
            let err = check_no_control_chars(F, bad).unwrap_err();
            assert_eq!(err.rule, Rule::CharacterClass);
        }
    }

    #[test]
    fn test_forbidden_chars_reports_first() {
        let err = check_forbidden_chars(F, "a;b\"c", &['"', ';']).unwrap_err();
        assert_eq!(err.reason, "must not contain ';' (semicolon)");
        assert!(check_forbidden_chars(F, "abc", &['"']).is_ok());
    }

    #[test]
    fn test_token() {
        assert!(check_token(F, "X-Test").is_ok());
        assert!(check_token(F, "x_custom.header~1").is_ok());

        let err = check_token(F, "bad header").unwrap_err();
        assert_eq!(err.rule, Rule::Token);
        assert!(err.reason.contains("(space)"));

        assert!(check_token(F, "a:b").is_err());
        assert!(check_token(F, "").is_err());
        assert!(check_token(F, "héader").is_err());
    }

    #[test]
    fn test_prefix() {
        assert!(check_prefix(F, "/path", "/").is_ok());
        let err = check_prefix(F, "path", "/").unwrap_err();
        assert_eq!(err.reason, "must start with '/'");
    }

    #[test]
    fn test_range() {
        assert!(check_range(F, 1, 1, 65535).is_ok());
        assert!(check_range(F, 65535, 1, 65535).is_ok());
        assert!(check_range(F, 0, 1, 65535).is_err());
        assert!(check_range(F, 65536, 1, 65535).is_err());
        assert!(check_range(F, -1, 1, 65535).is_err());
    }

    #[test]
    fn test_supported() {
        let schemes = ["http", "https"];
        assert!(check_supported(F, "https", schemes).is_ok());

        let err = check_supported(F, "ftp", schemes).unwrap_err();
        assert_eq!(err.rule, Rule::Supported);
        assert_eq!(err.reason, "unsupported value; supported values: http, https");
        assert!(!err.reason.contains("ftp"));

        let owned = vec!["GET".to_string()];
        assert!(check_supported(F, "GET", owned.iter().map(String::as_str)).is_ok());
        assert!(check_supported(F, "get", owned.iter().map(String::as_str)).is_err());

        assert!(check_supported(F, 302u16, [301u16, 302]).is_ok());
        assert!(check_supported(F, 404u16, [301u16, 302]).is_err());
    }

    #[test]
    fn test_hostname() {
        let h = FieldKind::RedirectHostname;
        assert!(check_hostname(h, "example.com", 253).is_ok());
        assert!(check_hostname(h, "a-b.c1.example", 253).is_ok());
        assert!(check_hostname(h, "localhost", 253).is_ok());
        assert!(check_hostname(h, &format!("{}.com", "a".repeat(63)), 253).is_ok());

        assert!(check_hostname(h, "", 253).is_err());
        assert!(check_hostname(h, "-example.com", 253).is_err());
        assert!(check_hostname(h, "example-.com", 253).is_err());
        assert!(check_hostname(h, "example..com", 253).is_err());
        assert!(check_hostname(h, "example.com.", 253).is_err());
        assert!(check_hostname(h, "exa_mple.com", 253).is_err());
        assert!(check_hostname(h, &format!("{}.com", "a".repeat(64)), 253).is_err());

        let long = vec!["a".repeat(63); 4].join(".");
        assert_eq!(long.len(), 255);
        let err = check_hostname(h, &long, 253).unwrap_err();
        assert_eq!(err.rule, Rule::MaxLength);
    }
}
