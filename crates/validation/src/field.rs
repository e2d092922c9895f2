use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a scalar value by its destination and syntactic role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    HeaderName,
    HeaderValue,
    #[serde(rename = "query-name")]
    QueryParamName,
    #[serde(rename = "query-value")]
    QueryParamValue,
    Method,
    MatchPath,
    RedirectScheme,
    RedirectHostname,
    RedirectPort,
    RedirectPath,
    #[serde(rename = "redirect-status")]
    RedirectStatusCode,
}

impl FieldKind {
    /// Every field kind the config generator can emit
    pub const ALL: [FieldKind; 11] = [
        FieldKind::HeaderName,
        FieldKind::HeaderValue,
        FieldKind::QueryParamName,
        FieldKind::QueryParamValue,
        FieldKind::Method,
        FieldKind::MatchPath,
        FieldKind::RedirectScheme,
        FieldKind::RedirectHostname,
        FieldKind::RedirectPort,
        FieldKind::RedirectPath,
        FieldKind::RedirectStatusCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::HeaderName => "header-name",
            FieldKind::HeaderValue => "header-value",
            FieldKind::QueryParamName => "query-name",
            FieldKind::QueryParamValue => "query-value",
            FieldKind::Method => "method",
            FieldKind::MatchPath => "match-path",
            FieldKind::RedirectScheme => "redirect-scheme",
            FieldKind::RedirectHostname => "redirect-hostname",
            FieldKind::RedirectPort => "redirect-port",
            FieldKind::RedirectPath => "redirect-path",
            FieldKind::RedirectStatusCode => "redirect-status",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar extracted from a routing resource, already decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue<'_> {
    fn from(value: i32) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<u16> for FieldValue<'_> {
    fn from(value: u16) -> Self {
        FieldValue::Number(value.into())
    }
}
