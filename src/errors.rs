//! Error Types
//!
//! This module defines the error types used throughout the retargeting core.
//!
//! # Overview
//!
//! The main error type [`RetargetError`] covers the failure modes that can be
//! reported by fallible APIs:
//! - Landmark solving failures (too few points, non-finite data, degenerate geometry)
//! - Configuration errors
//!
//! The per-frame driver never propagates these. A solve failure is logged and
//! the affected category keeps its previous value; a missing clip degrades to
//! "no animation".
//!
//! ```rust,ignore
//! use puppet::errors::{RetargetError, Result};
//!
//! fn load_settings(json: &str) -> Result<RetargetSettings> {
//!     RetargetSettings::from_json_str(json)
//! }
//! ```

use thiserror::Error;

use crate::solver::SolveCategory;

/// The main error type for the retargeting core.
#[derive(Error, Debug)]
pub enum RetargetError {
    // ========================================================================
    // Solving Errors
    // ========================================================================
    /// A landmark set had fewer points than the topology requires.
    #[error("{category} landmarks: expected at least {expected} points, got {actual}")]
    InsufficientLandmarks {
        /// Category being solved
        category: SolveCategory,
        /// Minimum point count for the topology
        expected: usize,
        /// Number of points received
        actual: usize,
    },

    /// A landmark coordinate was NaN or infinite.
    #[error("{category} landmarks: non-finite coordinate at index {index}")]
    NonFiniteLandmark {
        /// Category being solved
        category: SolveCategory,
        /// Offending landmark index
        index: usize,
    },

    /// Reference points coincide, so no direction can be derived.
    #[error("{category} landmarks: degenerate geometry ({detail})")]
    DegenerateGeometry {
        /// Category being solved
        category: SolveCategory,
        /// Which measurement collapsed
        detail: &'static str,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A settings value is out of its valid range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, RetargetError>`.
pub type Result<T> = std::result::Result<T, RetargetError>;
