//! Rendering of validated rules
//!
//! Values are interpolated verbatim: everything reaching this module has
//! already been accepted by the field validator.

use crate::error::{Result, RouteError};
use crate::graph::ValidatedRule;
use serde::Serialize;

/// One match as the njs module reads it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NjsMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    /// True when the match only constrains the path
    pub any: bool,
}

/// Convert a rule's matches into njs match entries
pub fn njs_matches(rule: &ValidatedRule) -> Vec<NjsMatch> {
    rule.rule()
        .matches
        .iter()
        .map(|m| {
            let headers: Vec<String> = m
                .headers
                .iter()
                .map(|h| format!("{}:{}", h.name, h.value))
                .collect();
            let params: Vec<String> = m
                .query_params
                .iter()
                .map(|q| format!("{}={}", q.name, q.value))
                .collect();
            let any = m.method.is_none() && headers.is_empty() && params.is_empty();

            NjsMatch {
                method: m.method.clone(),
                headers,
                params,
                any,
            }
        })
        .collect()
}

/// JSON document the njs module evaluates for a rule
pub fn render_match_document(rule: &ValidatedRule) -> Result<String> {
    Ok(serde_json::to_string(&njs_matches(rule))?)
}

/// nginx `return` directive for a rule's request redirect filter
///
/// Unset parts fall back to the request's own scheme, host and URI. The
/// status code was resolved against the validation policy by
/// [`process_route`](crate::graph::process_route).
pub fn render_redirect(rule: &ValidatedRule) -> Result<String> {
    let redirect = rule
        .rule()
        .redirect()
        .ok_or(RouteError::NoRedirect(rule.index()))?;

    let code = redirect
        .status_code
        .ok_or(RouteError::MissingStatusCode(rule.index()))?;
    let scheme = redirect.scheme.as_deref().unwrap_or("$scheme");
    let hostname = redirect.hostname.as_deref().unwrap_or("$host");
    let port = redirect
        .port
        .map(|p| format!(":{}", p))
        .unwrap_or_default();
    let path = redirect.path.as_deref().unwrap_or("$request_uri");

    Ok(format!(
        "return {} {}://{}{}{};",
        code, scheme, hostname, port, path
    ))
}
