//! Composite field validator
//!
//! [`HttpValidator`] holds one instance per capability and routes every field
//! kind to the single capability that claims it. The ownership table is built
//! and checked at construction, so a field kind nobody validates is a start-up
//! failure rather than a silent pass-through.

use crate::config::ValidationConfig;
use crate::error::{SetupError, ValidationResult};
use crate::field::{FieldKind, FieldValue};
use crate::njs::NjsMatchValidator;
use crate::redirect::RedirectValidator;
use std::collections::HashMap;
use tracing::debug;

/// A validator scoped to one concern, owning a fixed set of field kinds
pub trait FieldCapability: Send + Sync {
    /// Name used in ownership errors and logs
    fn name(&self) -> &'static str;

    /// Field kinds this capability is responsible for
    fn claims(&self) -> &'static [FieldKind];

    /// Validate a value of a claimed field kind
    fn validate(&self, field: FieldKind, value: FieldValue<'_>) -> ValidationResult;
}

/// The interface the config-generation layer validates route fields through
pub trait HttpFieldsValidator: Send + Sync {
    fn validate_field(&self, field: FieldKind, value: FieldValue<'_>) -> ValidationResult;

    /// Status code a redirect without `statusCode` is rendered with
    fn default_redirect_status_code(&self) -> i32;

    fn validate_path_in_match(&self, path: &str) -> ValidationResult {
        self.validate_field(FieldKind::MatchPath, FieldValue::Text(path))
    }

    fn validate_header_name_in_match(&self, name: &str) -> ValidationResult {
        self.validate_field(FieldKind::HeaderName, FieldValue::Text(name))
    }

    fn validate_header_value_in_match(&self, value: &str) -> ValidationResult {
        self.validate_field(FieldKind::HeaderValue, FieldValue::Text(value))
    }

    fn validate_query_param_name_in_match(&self, name: &str) -> ValidationResult {
        self.validate_field(FieldKind::QueryParamName, FieldValue::Text(name))
    }

    fn validate_query_param_value_in_match(&self, value: &str) -> ValidationResult {
        self.validate_field(FieldKind::QueryParamValue, FieldValue::Text(value))
    }

    fn validate_method_in_match(&self, method: &str) -> ValidationResult {
        self.validate_field(FieldKind::Method, FieldValue::Text(method))
    }

    fn validate_redirect_scheme(&self, scheme: &str) -> ValidationResult {
        self.validate_field(FieldKind::RedirectScheme, FieldValue::Text(scheme))
    }

    fn validate_redirect_hostname(&self, hostname: &str) -> ValidationResult {
        self.validate_field(FieldKind::RedirectHostname, FieldValue::Text(hostname))
    }

    fn validate_redirect_port(&self, port: i32) -> ValidationResult {
        self.validate_field(FieldKind::RedirectPort, FieldValue::from(port))
    }

    fn validate_redirect_path(&self, path: &str) -> ValidationResult {
        self.validate_field(FieldKind::RedirectPath, FieldValue::Text(path))
    }

    fn validate_redirect_status_code(&self, code: i32) -> ValidationResult {
        self.validate_field(FieldKind::RedirectStatusCode, FieldValue::from(code))
    }
}

/// Validates every value that propagates into the nginx `http` context
#[derive(Debug, Clone)]
pub struct HttpValidator {
    njs: NjsMatchValidator,
    redirect: RedirectValidator,
    owners: HashMap<FieldKind, usize>,
}

impl HttpValidator {
    /// Build all capabilities from one policy and verify field ownership
    pub fn new(config: &ValidationConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let mut validator = Self {
            njs: NjsMatchValidator::new(config),
            redirect: RedirectValidator::new(config),
            owners: HashMap::new(),
        };
        let owners = build_ownership(&validator.capabilities(), &FieldKind::ALL)?;
        validator.owners = owners;

        debug!(
            "Field validator ready: {} field kinds across {} capabilities",
            validator.owners.len(),
            validator.capabilities().len()
        );
        Ok(validator)
    }

    /// Capabilities in a fixed order; indices in the ownership table refer to it
    pub fn capabilities(&self) -> [&dyn FieldCapability; 2] {
        [&self.njs, &self.redirect]
    }

    /// Name of the capability that owns a field kind
    pub fn owner_of(&self, field: FieldKind) -> Option<&'static str> {
        self.owners
            .get(&field)
            .map(|idx| self.capabilities()[*idx].name())
    }
}

impl HttpFieldsValidator for HttpValidator {
    fn validate_field(&self, field: FieldKind, value: FieldValue<'_>) -> ValidationResult {
        // the ownership table covers FieldKind::ALL once construction succeeds
        let idx = self.owners[&field];
        self.capabilities()[idx].validate(field, value)
    }

    fn default_redirect_status_code(&self) -> i32 {
        i32::from(self.redirect.default_status_code())
    }
}

/// Map each required field kind to exactly one capability index
pub fn build_ownership(
    capabilities: &[&dyn FieldCapability],
    required: &[FieldKind],
) -> Result<HashMap<FieldKind, usize>, SetupError> {
    let mut owners: HashMap<FieldKind, usize> = HashMap::new();

    for (idx, capability) in capabilities.iter().enumerate() {
        for kind in capability.claims() {
            if let Some(first) = owners.insert(*kind, idx) {
                return Err(SetupError::DuplicateClaim {
                    kind: *kind,
                    first: capabilities[first].name(),
                    second: capability.name(),
                });
            }
        }
    }

    if let Some(kind) = required.iter().find(|kind| !owners.contains_key(kind)) {
        return Err(SetupError::UnclaimedFieldKind(*kind));
    }

    Ok(owners)
}
