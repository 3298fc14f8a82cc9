use thiserror::Error;

/// Errors that can occur at the fallible edges of the resolved graph API.
///
/// The resolution engine itself is total: lookups of unknown ids and
/// dangling link endpoints are not errors.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("field '{field}' cannot be changed in place")]
    ImmutableField { field: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `GraphError`.
pub type Result<T> = std::result::Result<T, GraphError>;
