/// Crate-wide result alias.
pub type ScrollResult<T> = Result<T, ScrollError>;

/// Error type shared by every scrollvision module.
///
/// The variant chosen tells the caller how far the failure reaches: asset and playback errors
/// degrade a single layer or track, export errors abort only the current export attempt.
#[derive(thiserror::Error, Debug)]
pub enum ScrollError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image, font or audio asset could not be resolved or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// A media element could not load or start playback.
    #[error("playback error: {0}")]
    Playback(String),

    /// The capture/export pipeline failed.
    #[error("export error: {0}")]
    Export(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollError {
    /// Build a [`ScrollError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrollError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ScrollError::Playback`].
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`ScrollError::Export`].
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`ScrollError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
