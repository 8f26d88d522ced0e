//! Error types for the block renderer

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, binding, or rendering a layout
#[derive(Error, Debug)]
pub enum Error {
    /// The template is missing something the layout needs
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A binding entry could not be applied
    #[error("Binding failed: {0}")]
    BindingError(String),

    /// No block or potential layout with this name exists in the scope
    #[error("Couldn't find a block or potential layout named `{name}` under block `{scope}`")]
    BlockNotFound { name: String, scope: String },

    /// A payload was given to a block of the wrong type
    #[error("Block `{name}` is a {found} block but was given {expected} data")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An image could not be decoded
    #[error("Image decode failed: {0}")]
    DecodeError(String),

    /// An image could not be encoded or written
    #[error("Image encode failed: {0}")]
    EncodeError(String),

    /// The resampler produced no data
    #[error("Resize failed: {0}")]
    ResizeError(String),

    /// An argument was outside its accepted range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The font could not be loaded
    #[error("Font error: {0}")]
    FontError(String),

    /// The font has no glyph for a character
    #[error("The font has no glyph for character {0:?}")]
    UnsupportedCharacter(char),

    /// The block tree is not in the shape an operation expected
    #[error("Structural error: {0}")]
    StructuralError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
