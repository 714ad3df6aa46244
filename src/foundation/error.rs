/// Convenience result type used across eracast.
pub type EracastResult<T> = Result<T, EracastError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum EracastError {
    /// Invalid user-provided or deck data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required remote asset (narration, image) could not be produced.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while laying out or rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while muxing or talking to the encoder process.
    #[error("encode error: {0}")]
    Encode(String),

    /// No recordable container/codec is available in this environment.
    #[error("unsupported environment: {0}")]
    Unsupported(String),

    /// The run was abandoned by the caller before completion.
    #[error("generation cancelled: {0}")]
    Cancelled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EracastError {
    /// Build an [`EracastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EracastError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build an [`EracastError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`EracastError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`EracastError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build an [`EracastError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
