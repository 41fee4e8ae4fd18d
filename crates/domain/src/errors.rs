use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    #[error("Uniqueness conflict: {field}")]
    Uniqueness { field: String },

    #[error("Forbidden action")]
    Forbidden,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    MissingInput { message: String },

    /// A hosted API (generative model, speech-to-text) failed
    #[error("{message}")]
    Upstream { message: String },

    /// The model answered, but not with anything we could parse
    #[error("{message}")]
    UnparseableOutput { message: String },

    #[error("Server configuration error: {message}")]
    Configuration { message: String },

    #[error("{message}")]
    Persistence { message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingInput { message: message.into() }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream { message: message.into() }
    }

    pub fn unparseable(message: impl Into<String>) -> Self {
        Self::UnparseableOutput { message: message.into() }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence { message: message.into() }
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into() }
    }
}
