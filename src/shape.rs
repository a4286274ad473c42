//! Trail-shape classification.
//!
//! Looks at the bounding box of the most recent centroid positions and
//! decides whether the hand held still, swept a line, or traced a circle.
//! All thresholds come from [`ShapeConfig`] and are tuning values.

use crate::config::ShapeConfig;
use crate::geometry::{centroid, BoundingBox, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate motion shape of a trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailShape {
    /// Fewer samples than the classifier needs.
    InsufficientData,
    /// Hand stayed inside a small box ("stop").
    Point,
    HorizontalLine,
    VerticalLine,
    Circle,
    /// Roughly square extent but not circular.
    Irregular,
    Unknown,
}

impl TrailShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient-data",
            Self::Point => "point",
            Self::HorizontalLine => "horizontal-line",
            Self::VerticalLine => "vertical-line",
            Self::Circle => "circle",
            Self::Irregular => "irregular",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TrailShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ShapeClassifier {
    config: ShapeConfig,
}

impl ShapeClassifier {
    pub fn new(config: ShapeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    /// Number of trailing samples the classifier inspects.
    pub fn window(&self) -> usize {
        self.config.min_samples
    }

    /// Classify the last `min_samples` entries of `points` (oldest first).
    pub fn classify(&self, points: &[Point]) -> TrailShape {
        let n = self.config.min_samples;
        if n == 0 || points.len() < n {
            return TrailShape::InsufficientData;
        }
        let window = &points[points.len() - n..];

        let bbox = match BoundingBox::enclosing(window) {
            Some(bbox) => bbox,
            None => return TrailShape::InsufficientData,
        };
        let (width, height) = (bbox.width(), bbox.height());

        if width < self.config.still_extent && height < self.config.still_extent {
            TrailShape::Point
        } else if width > height * self.config.line_ratio {
            TrailShape::HorizontalLine
        } else if height > width * self.config.line_ratio {
            TrailShape::VerticalLine
        } else if (width - height).abs() < self.config.circle_tolerance {
            self.classify_round(window, width.min(height) / 2.0)
        } else {
            TrailShape::Unknown
        }
    }

    fn classify_round(&self, window: &[Point], radius: f64) -> TrailShape {
        let center = match centroid(window) {
            Some(center) => center,
            None => return TrailShape::InsufficientData,
        };

        let mean_deviation = window
            .iter()
            .map(|p| (p.distance(&center) - radius).abs())
            .sum::<f64>()
            / window.len() as f64;

        if mean_deviation < radius * self.config.circle_deviation_ratio {
            TrailShape::Circle
        } else {
            TrailShape::Irregular
        }
    }
}

impl Default for ShapeClassifier {
    fn default() -> Self {
        Self::new(ShapeConfig::default())
    }
}
