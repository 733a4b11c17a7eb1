//! Error types for rasters and the mask pipeline.

use serde::Serialize;
use thiserror::Error;

/// Failure of a single raster operation or filter stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaskError {
    /// A filter stage could not produce an output raster.
    #[error("filter {filter} unavailable: {reason}")]
    FilterUnavailable {
        filter: &'static str,
        reason: String,
    },

    /// Pixel read outside of the raster.
    #[error("pixel ({x}, {y}) out of bounds for {width}x{height} raster")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The final blend could not run.
    #[error("composite unavailable: {0}")]
    CompositeUnavailable(String),

    /// Buffer and declared layout disagree.
    #[error("invalid raster layout: {0}")]
    InvalidLayout(String),
}

impl MaskError {
    pub(crate) fn filter(filter: &'static str, reason: impl Into<String>) -> Self {
        MaskError::FilterUnavailable {
            filter,
            reason: reason.into(),
        }
    }
}

/// The pipeline stage in which extraction failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Stage {
    Normalize,
    Posterize,
    DetectPolarity,
    CorrectPolarity,
    Composite,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Normalize => "normalize",
            Stage::Posterize => "posterize",
            Stage::DetectPolarity => "detect polarity",
            Stage::CorrectPolarity => "correct polarity",
            Stage::Composite => "composite",
        };
        f.write_str(name)
    }
}

/// Top level failure of a pipeline run, no partial mask is available.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("mask extraction failed during {stage}")]
pub struct ExtractionError {
    pub stage: Stage,
    #[source]
    pub source: MaskError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn extraction_error_keeps_cause() {
        let e = ExtractionError {
            stage: Stage::Normalize,
            source: MaskError::filter("monochrome", "intensity out of range"),
        };
        assert_eq!(e.to_string(), "mask extraction failed during normalize");
        let cause = e.source().expect("has a cause").to_string();
        assert!(cause.contains("monochrome"));
        assert!(cause.contains("intensity out of range"));
    }

    #[test]
    fn out_of_bounds_message() {
        let e = MaskError::OutOfBounds {
            x: 10,
            y: 0,
            width: 10,
            height: 4,
        };
        assert_eq!(e.to_string(), "pixel (10, 0) out of bounds for 10x4 raster");
    }
}
