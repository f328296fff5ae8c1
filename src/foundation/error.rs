/// Crate-wide result alias.
pub type SceneResult<T> = Result<T, SceneError>;

/// Error taxonomy for scene construction and rendering.
///
/// Draw passes never return these for degraded paint or geometry; they are logged and the
/// affected operation is skipped. Errors surface from parsers, validators and allocation of
/// required surfaces.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Malformed path, transform, color or number string.
    #[error("parse error: {0}")]
    Parse(String),

    /// A value was rejected at assignment time; prior state is unchanged.
    #[error("validation error: {0}")]
    Validation(String),

    /// A buffer, surface or referenced definition could not be obtained.
    #[error("resource error: {0}")]
    Resource(String),

    /// Structural failure while rendering a subtree.
    #[error("render error: {0}")]
    Render(String),

    /// Scene document (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`SceneError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`SceneError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SceneError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
