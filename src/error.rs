//! Unified error handling for the movement pipeline.
//!
//! Domain outcomes are not errors: an unclassifiable point yields a
//! "no match" sentinel, a user with no pre-arrival post is counted and
//! skipped, and degenerate geodesic inputs take explicit fallback paths.
//! The variants here are the genuinely fatal-per-call conditions.

use thiserror::Error;

/// Result type alias using [`FlowError`].
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors raised by the movement-reconstruction pipeline.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Two datasets carry different coordinate reference systems.
    /// Fatal to the call that joined them, not to the whole batch.
    #[error("coordinate reference systems differ: '{left}' vs '{right}'")]
    CrsMismatch { left: String, right: String },

    /// A requested join attribute is absent from the source set.
    #[error(
        "column '{requested}' does not exist in the join source; available columns: {}",
        available.join(", ")
    )]
    AttributeNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// A spatial index was requested over an empty region collection.
    #[error("region set is empty; cannot build a spatial index")]
    EmptyRegionSet,
}

/// Validate that two datasets share a coordinate reference system.
pub fn ensure_crs_match(left: &str, right: &str) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(FlowError::CrsMismatch {
            left: left.to_string(),
            right: right.to_string(),
        })
    }
}
