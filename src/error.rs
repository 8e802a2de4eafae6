use thiserror::Error;

/// Failure to read a CSS-like transform string such as
/// `translate(12px,2px) scale(1)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformParseError {
    #[error(
        "Failed to parse transform string {input:?}: \
         expected a function name at offset {offset}"
    )]
    ExpectedName { input: String, offset: usize },
    #[error("Failed to parse transform string {input:?}: `{name}(` is never closed")]
    Unterminated { input: String, name: String },
    #[error("Failed to parse transform string {input:?}: `{name}()` has no arguments")]
    EmptyArguments { input: String, name: String },
    #[error(
        "Failed to parse transform string {input:?}: \
         invalid character {found:?} in `{name}` arguments"
    )]
    InvalidArgument { input: String, name: String, found: char },
    #[error("Cannot determine position from translate({args})")]
    InvalidTranslate { args: String },
}

/// Failure to load an [`EditorConfig`](crate::EditorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid editor configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "Invalid editor configuration: \
         min_scale ({min}) must be positive and not exceed max_scale ({max})"
    )]
    ScaleBounds { min: f32, max: f32 },
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transform(#[from] TransformParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Diagram definition could not be read: {0}")]
    Diagram(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
