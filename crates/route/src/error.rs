use thiserror::Error;

/// Error types for route decoding and rendering
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid route document: {0}")]
    InvalidRoute(#[from] serde_json::Error),

    #[error("Rule {0} has no request redirect filter")]
    NoRedirect(usize),

    #[error("Rule {0} has a request redirect without a resolved status code")]
    MissingStatusCode(usize),
}

/// Type alias for Results using RouteError
pub type Result<T> = std::result::Result<T, RouteError>;
