//! HTTPRoute rule validation and rendering
//!
//! This crate sits between the routing resources and the generated nginx
//! configuration: it validates each rule through the field validator, drops
//! rules with rejected fields, reports them as status conditions, and renders
//! only the rules that passed.

pub mod error;
pub mod graph;
pub mod model;
pub mod render;


// Re-export commonly used types for convenience
pub use error::{Result, RouteError};
pub use graph::{Condition, FieldError, RouteOutcome, ValidatedRule, process_route};
pub use model::{HttpRoute, HttpRouteRule};
pub use render::{render_match_document, render_redirect};
