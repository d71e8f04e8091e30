//! Error types for deep copies.
//!
//! Every error is fatal: a copy either returns a complete graph or fails.
//! Paths are rendered at the point of failure so the error owns everything it
//! reports.

use thiserror::Error;

/// Error type returned by transform functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("recursion depth exceeded at {path} (max: {max_depth}); the graph is cyclic or too deep")]
    DepthExceeded { path: String, max_depth: usize },

    #[error("reference cycle detected at {path}")]
    CycleDetected { path: String },

    #[error("transform failed at {path} for `{member}` of type `{type_name}`")]
    Transform {
        path: String,
        member: String,
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("transform at {path} returned `{found}` where `{expected}` was expected")]
    TransformType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(
        "transform changed set element at {path} of type `{type_name}`; \
         set elements must keep their hash across the transform"
    )]
    UnsafeSetMutation {
        path: String,
        type_name: &'static str,
    },

    #[error("`{type_name}` at {path} has no usable constructor and cannot be copied")]
    NoUsableConstructor {
        path: String,
        type_name: &'static str,
    },

    #[error("unsupported shape at {path} for `{type_name}`: {reason}")]
    Unsupported {
        path: String,
        type_name: &'static str,
        reason: String,
    },

    #[error("`{type_name}` at {path} is mutably borrowed and cannot be read")]
    Borrowed {
        path: String,
        type_name: &'static str,
    },

    #[error("no transform function supplied")]
    MissingTransform,
}

impl CopyError {
    /// Path of the node that failed, if the error names one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::DepthExceeded { path, .. }
            | Self::CycleDetected { path }
            | Self::Transform { path, .. }
            | Self::TransformType { path, .. }
            | Self::UnsafeSetMutation { path, .. }
            | Self::NoUsableConstructor { path, .. }
            | Self::Unsupported { path, .. }
            | Self::Borrowed { path, .. } => Some(path),
            Self::MissingTransform => None,
        }
    }
}
