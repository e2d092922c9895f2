//! Per-rule validation pass of the routing graph builder
//!
//! Every field of every rule is checked through an [`HttpFieldsValidator`].
//! A rule with any rejected field is dropped on its own; the rest of the route
//! keeps being served. Rejections are summarized as a status condition on the
//! route so users can diagnose them without reading controller logs.

use crate::model::{HttpRequestRedirectFilter, HttpRoute, HttpRouteMatch, HttpRouteRule};
use gateway_validation::{HttpFieldsValidator, RuleViolation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

pub const CONDITION_ACCEPTED: &str = "Accepted";
pub const CONDITION_PARTIALLY_INVALID: &str = "PartiallyInvalid";
pub const REASON_UNSUPPORTED_VALUE: &str = "UnsupportedValue";

/// A rule whose every field passed validation
///
/// Only [`process_route`] creates these, so the renderer cannot be handed a
/// rule that skipped validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRule {
    index: usize,
    rule: HttpRouteRule,
}

impl ValidatedRule {
    /// Position of the rule in `spec.rules`
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rule(&self) -> &HttpRouteRule {
        &self.rule
    }
}

/// A rejected field, located by its path in the route resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub violation: RuleViolation,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.violation)
    }
}

/// Route status condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}

/// Result of validating one route
#[derive(Debug, Clone, Default)]
pub struct RouteOutcome {
    pub rules: Vec<ValidatedRule>,
    pub errors: Vec<FieldError>,
    pub conditions: Vec<Condition>,
}

impl RouteOutcome {
    /// Whether at least one rule survived
    pub fn accepted(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn dropped_rules(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .errors
            .iter()
            .filter_map(|e| rule_index(&e.path))
            .collect();
        indices.dedup();
        indices
    }
}

fn rule_index(path: &str) -> Option<usize> {
    let rest = path.strip_prefix("spec.rules[")?;
    rest[..rest.find(']')?].parse().ok()
}

/// Validate every rule of a route, dropping the ones with rejected fields
pub fn process_route(route: &HttpRoute, validator: &dyn HttpFieldsValidator) -> RouteOutcome {
    let mut outcome = RouteOutcome::default();

    for (index, rule) in route.spec.rules.iter().enumerate() {
        let errors = validate_rule(index, rule, validator);
        if errors.is_empty() {
            outcome.rules.push(ValidatedRule {
                index,
                rule: resolve_defaults(rule, validator),
            });
            continue;
        }

        for err in &errors {
            debug!("Route {} rejected field {}", route.key(), err);
        }
        warn!(
            "Dropping rule {} of route {}: {} invalid field(s)",
            index,
            route.key(),
            errors.len()
        );
        outcome.errors.extend(errors);
    }

    if !outcome.errors.is_empty() {
        outcome.conditions.push(build_condition(&outcome));
    }
    outcome
}

/// Fill in what the renderer must not guess, such as the redirect status code
fn resolve_defaults(rule: &HttpRouteRule, validator: &dyn HttpFieldsValidator) -> HttpRouteRule {
    let mut rule = rule.clone();
    for redirect in rule.filters.iter_mut().filter_map(|f| f.request_redirect.as_mut()) {
        redirect
            .status_code
            .get_or_insert_with(|| validator.default_redirect_status_code());
    }
    rule
}

fn build_condition(outcome: &RouteOutcome) -> Condition {
    let details = outcome
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    if outcome.accepted() {
        Condition {
            condition_type: CONDITION_PARTIALLY_INVALID.to_string(),
            status: "True".to_string(),
            reason: REASON_UNSUPPORTED_VALUE.to_string(),
            message: format!("Dropped Rule(s): {}", details),
        }
    } else {
        Condition {
            condition_type: CONDITION_ACCEPTED.to_string(),
            status: "False".to_string(),
            reason: REASON_UNSUPPORTED_VALUE.to_string(),
            message: format!("All rules are invalid: {}", details),
        }
    }
}

/// Collect every rejected field of one rule
pub fn validate_rule(
    index: usize,
    rule: &HttpRouteRule,
    validator: &dyn HttpFieldsValidator,
) -> Vec<FieldError> {
    let base = format!("spec.rules[{}]", index);
    let mut errors = Vec::new();

    for (i, m) in rule.matches.iter().enumerate() {
        validate_match(&format!("{}.matches[{}]", base, i), m, validator, &mut errors);
    }

    for (i, filter) in rule.filters.iter().enumerate() {
        if let Some(redirect) = &filter.request_redirect {
            let path = format!("{}.filters[{}].requestRedirect", base, i);
            validate_redirect(&path, redirect, validator, &mut errors);
        }
    }

    errors
}

fn validate_match(
    base: &str,
    m: &HttpRouteMatch,
    validator: &dyn HttpFieldsValidator,
    errors: &mut Vec<FieldError>,
) {
    let mut record = |path: String, result: Result<(), RuleViolation>| {
        if let Err(violation) = result {
            errors.push(FieldError { path, violation });
        }
    };

    if let Some(value) = m.path.as_ref().and_then(|p| p.value.as_deref()) {
        record(
            format!("{}.path.value", base),
            validator.validate_path_in_match(value),
        );
    }

    for (i, header) in m.headers.iter().enumerate() {
        let path = format!("{}.headers[{}]", base, i);
        record(
            format!("{}.name", path),
            validator.validate_header_name_in_match(&header.name),
        );
        record(
            format!("{}.value", path),
            validator.validate_header_value_in_match(&header.value),
        );
    }

    for (i, param) in m.query_params.iter().enumerate() {
        let path = format!("{}.queryParams[{}]", base, i);
        record(
            format!("{}.name", path),
            validator.validate_query_param_name_in_match(&param.name),
        );
        record(
            format!("{}.value", path),
            validator.validate_query_param_value_in_match(&param.value),
        );
    }

    if let Some(method) = &m.method {
        record(
            format!("{}.method", base),
            validator.validate_method_in_match(method),
        );
    }
}

fn validate_redirect(
    base: &str,
    redirect: &HttpRequestRedirectFilter,
    validator: &dyn HttpFieldsValidator,
    errors: &mut Vec<FieldError>,
) {
    let mut record = |field: &str, result: Result<(), RuleViolation>| {
        if let Err(violation) = result {
            errors.push(FieldError {
                path: format!("{}.{}", base, field),
                violation,
            });
        }
    };

    if let Some(scheme) = &redirect.scheme {
        record("scheme", validator.validate_redirect_scheme(scheme));
    }
    if let Some(hostname) = &redirect.hostname {
        record("hostname", validator.validate_redirect_hostname(hostname));
    }
    if let Some(port) = redirect.port {
        record("port", validator.validate_redirect_port(port));
    }
    if let Some(path) = &redirect.path {
        record("path", validator.validate_redirect_path(path));
    }
    // an unset code is checked as the default it will be rendered with
    let code = redirect
        .status_code
        .unwrap_or_else(|| validator.default_redirect_status_code());
    record("statusCode", validator.validate_redirect_status_code(code));
}
