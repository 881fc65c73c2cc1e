//! Errors raised by delegated transformations.

use thiserror::Error;

/// A transformation failed for one file.
///
/// These are per-file failures: the owning task decides whether they are
/// fatal. Filesystem errors are not represented here; they travel as
/// `anyhow::Error` with path context.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("stylesheet compilation failed:\n{0}")]
    Compile(String),

    #[error("css processing failed: {0}")]
    Css(String),

    #[error("script parse failed:\n{0}")]
    Parse(String),

    #[error("script transform failed:\n{0}")]
    Transform(String),

    #[error("source map generation failed: {0}")]
    SourceMap(String),
}
