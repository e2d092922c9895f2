//! Validation policy
//!
//! The limits and enumerated sets below are fixed at build time and loaded once
//! at start-up. Tests construct tightened or loosened copies through
//! [`ValidationConfig`] instead of touching the defaults.

use crate::error::SetupError;
use http::Method;
use serde::{Deserialize, Serialize};

/// Maximum length of a header or query parameter name (Gateway API limit)
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length of a header or query parameter value (Gateway API limit)
pub const MAX_VALUE_LENGTH: usize = 4096;

/// Maximum length of a match or redirect path
pub const MAX_PATH_LENGTH: usize = 1024;

/// Maximum total length of a DNS hostname
pub const MAX_HOSTNAME_LENGTH: usize = 253;

/// Maximum length of a single DNS label
pub const MAX_LABEL_LENGTH: usize = 63;

/// Lowest valid port
pub const MIN_PORT: i64 = 1;

/// Highest valid port
pub const MAX_PORT: i64 = 65535;

/// HTTP methods njs matching knows how to compare
pub const DEFAULT_METHODS: [&str; 9] = [
    "CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE",
];

/// Redirect schemes nginx `return` accepts in an absolute URL
pub const DEFAULT_SCHEMES: [&str; 2] = ["http", "https"];

/// Redirect status codes the renderer emits
pub const DEFAULT_REDIRECT_STATUS_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// Status applied to a redirect filter that does not set one
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Policy constants shared by every validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    pub max_name_length: usize,
    pub max_value_length: usize,
    pub max_path_length: usize,
    pub max_hostname_length: usize,
    /// When true, an empty header or query value is accepted as a presence
    /// match. Names are never allowed to be empty.
    pub allow_empty_match_values: bool,
    pub supported_methods: Vec<String>,
    pub supported_schemes: Vec<String>,
    pub supported_redirect_status_codes: Vec<u16>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_name_length: MAX_NAME_LENGTH,
            max_value_length: MAX_VALUE_LENGTH,
            max_path_length: MAX_PATH_LENGTH,
            max_hostname_length: MAX_HOSTNAME_LENGTH,
            allow_empty_match_values: false,
            supported_methods: DEFAULT_METHODS.iter().map(|m| m.to_string()).collect(),
            supported_schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
            supported_redirect_status_codes: DEFAULT_REDIRECT_STATUS_CODES.to_vec(),
        }
    }
}

impl ValidationConfig {
    /// Status a redirect without `statusCode` resolves to
    ///
    /// [`DEFAULT_REDIRECT_STATUS`] when the policy supports it, otherwise the
    /// first supported code.
    pub fn default_redirect_status_code(&self) -> u16 {
        if self
            .supported_redirect_status_codes
            .contains(&DEFAULT_REDIRECT_STATUS)
        {
            return DEFAULT_REDIRECT_STATUS;
        }
        self.supported_redirect_status_codes
            .first()
            .copied()
            .unwrap_or(DEFAULT_REDIRECT_STATUS)
    }

    /// Check the policy itself before any validator is built from it
    pub fn validate(&self) -> Result<(), SetupError> {
        let limits = [
            ("maxNameLength", self.max_name_length),
            ("maxValueLength", self.max_value_length),
            ("maxPathLength", self.max_path_length),
            ("maxHostnameLength", self.max_hostname_length),
        ];
        for (name, limit) in limits {
            if limit == 0 {
                return Err(SetupError::InvalidConfig(format!("{} must be positive", name)));
            }
        }

        if self.max_hostname_length > MAX_HOSTNAME_LENGTH {
            return Err(SetupError::InvalidConfig(format!(
                "maxHostnameLength cannot exceed {}",
                MAX_HOSTNAME_LENGTH
            )));
        }

        if self.supported_methods.is_empty() {
            return Err(SetupError::InvalidConfig(
                "supportedMethods cannot be empty".to_string(),
            ));
        }
        for method in &self.supported_methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                return Err(SetupError::InvalidConfig(format!(
                    "supportedMethods contains an invalid method token: {:?}",
                    method
                )));
            }
        }

        if self.supported_schemes.is_empty() {
            return Err(SetupError::InvalidConfig(
                "supportedSchemes cannot be empty".to_string(),
            ));
        }
        for scheme in &self.supported_schemes {
            if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_lowercase()) {
                return Err(SetupError::InvalidConfig(format!(
                    "supportedSchemes contains an invalid scheme: {:?}",
                    scheme
                )));
            }
        }

        if self.supported_redirect_status_codes.is_empty() {
            return Err(SetupError::InvalidConfig(
                "supportedRedirectStatusCodes cannot be empty".to_string(),
            ));
        }
        if let Some(code) = self
            .supported_redirect_status_codes
            .iter()
            .find(|code| !(300..400).contains(*code))
        {
            return Err(SetupError::InvalidConfig(format!(
                "supportedRedirectStatusCodes contains a non-redirect code: {}",
                code
            )));
        }

        Ok(())
    }
}
