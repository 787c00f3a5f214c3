use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A grid was requested with a non-positive width or height
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    /// A rule string could not be compiled, the previous rule stays active
    #[error("rule `{rule}` not applied: {reason}")]
    RuleParse { rule: String, reason: &'static str },

    /// An unknown border token, the previous resolver stays active
    #[error("unrecognized border policy `{token}`")]
    Configuration { token: String },

    #[error("grid data has {actual} bytes, expected {expected}")]
    BitLength { expected: usize, actual: usize },

    #[error("malformed grid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed pattern: {0}")]
    Pattern(String),
}
