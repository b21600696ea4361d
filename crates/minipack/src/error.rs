//! Error taxonomy for a build.
//!
//! Every variant is fatal: the build stops at the first error and no asset is
//! written.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = BundleError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BundleError {
    /// A `require` request matched no file, neither literally nor with any
    /// configured extension.
    #[error("cannot resolve '{request}' from {}", base_dir.display())]
    Resolution {
        request: String,
        base_dir: PathBuf,
        /// Every candidate path that was tried, in the order tried
        tried: Vec<PathBuf>,
    },

    /// Transformed module text is not valid JavaScript.
    #[error("failed to parse {}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JavaScript grammar could not be loaded into the parser.
    #[error("failed to load JavaScript grammar")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// A unit refers to a module id that the graph does not hold.
    #[error("unit '{unit}' refers to unknown module '{id}'")]
    UnknownModule { unit: String, id: String },

    /// Two units render to the same output filename.
    #[error("units '{first}' and '{second}' both emit '{filename}'")]
    DuplicateAsset {
        filename: String,
        first: String,
        second: String,
    },
}

impl BundleError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
