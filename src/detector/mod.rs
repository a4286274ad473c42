//! Hand region detection on raw frames.

#[cfg(feature = "skin_detection")]
mod skin;

#[cfg(feature = "skin_detection")]
pub use skin::{rgb_to_hsv, SkinDetector};

use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::{BoundingBox, Point};

/// The largest hand-like region of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub centroid: Point,
    /// Region size in pixels
    pub area: f64,
    pub bounds: BoundingBox,
}

/// Finds at most one hand region per frame.
pub trait HandDetector {
    /// `Ok(None)` is the routine "no hand" answer, not an error.
    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>>;

    /// Re-tune the detector from a sample of the current frame. Returns
    /// the new HSV range when the detector supports calibration.
    fn calibrate(&mut self, _frame: &Frame) -> Option<([u8; 3], [u8; 3])> {
        None
    }

    /// Drop any calibration and return to the configured state.
    fn reset(&mut self) {}
}
