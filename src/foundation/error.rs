/// Convenience result type used across the host.
pub type HostResult<T> = Result<T, HostError>;

/// Top-level error taxonomy used by host APIs.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    /// Invalid caller-provided input (frame geometry, pad index, buffer sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// Script compilation or execution failed.
    #[error("script error: {0}")]
    Script(String),

    /// Rasterization or pixel-buffer bookkeeping failed.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid host configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The host was disposed and accepts no further calls.
    #[error("host has been disposed")]
    Disposed,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HostError {
    /// Build a [`HostError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`HostError::Script`] value.
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Build a [`HostError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`HostError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
