use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("resource {resource} does not exist. Available resources: {available}")]
    UnknownResource { resource: String, available: String },

    #[error("resource {0} is not enabled")]
    ResourceNotEnabled(String),

    #[error("mutually exclusive keys in allow list: '*' and {0}")]
    MutuallyExclusive(String),

    #[error("allowlist and denylist are both set, they are mutually exclusive, only one of them can be set")]
    AllowDenyConflict,

    #[error("invalid metric name pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("model error: {0}")]
    Model(#[from] kstate_model::ModelError),
}
