/// Convenience result type used across the showcase engine.
pub type ShowcaseResult<T> = Result<T, ShowcaseError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Missing evaluation data never ends up here; strategies degrade to a fallback
/// placement instead.
#[derive(thiserror::Error, Debug)]
pub enum ShowcaseError {
    /// Invalid user-provided configuration or photo data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A layout strategy was used outside its lifecycle (e.g. before `initialize`).
    #[error("strategy error: {0}")]
    Strategy(String),

    /// A remote data source could not deliver or returned malformed data.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Vector-document or region geometry could not be built.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowcaseError {
    /// Build a [`ShowcaseError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShowcaseError::Strategy`] value.
    pub fn strategy(msg: impl Into<String>) -> Self {
        Self::Strategy(msg.into())
    }

    /// Build a [`ShowcaseError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`ShowcaseError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`ShowcaseError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ShowcaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
