use super::{Detection, HandDetector};
use crate::config::SkinConfig;
use crate::error::{GesturecamError, Result};
use crate::frame::Frame;
use crate::geometry::{BoundingBox, Point};

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::{
    distance_transform::Norm,
    filter::median_filter,
    morphology::{close, open},
    region_labelling::{connected_components, Connectivity},
};
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// Saturation/value floor used for calibrated ranges
const CALIBRATED_SV_MIN: u8 = 50;
/// OpenCV-style hue scale: 0..=180
const HUE_MAX: u8 = 180;

/// HSV skin-color segmentation with morphological cleanup.
pub struct SkinDetector {
    config: SkinConfig,
    min_area: f64,
    lower: [u8; 3],
    upper: [u8; 3],
}

impl SkinDetector {
    pub fn new(config: SkinConfig, min_area: f64) -> Self {
        info!(
            "Skin detector range {:?}..{:?}, min area {}",
            config.lower, config.upper, min_area
        );
        Self {
            lower: config.lower,
            upper: config.upper,
            config,
            min_area,
        }
    }

    pub fn range(&self) -> ([u8; 3], [u8; 3]) {
        (self.lower, self.upper)
    }

    fn in_range(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }

    /// Binary mask of skin-colored pixels, cleaned up.
    pub(crate) fn skin_mask(&self, frame: &Frame) -> Result<GrayImage> {
        let rgb = RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec())
            .ok_or_else(|| GesturecamError::Detection {
                details: format!(
                    "frame {} has {} bytes, expected {}",
                    frame.id,
                    frame.data.len(),
                    frame.expected_size()
                ),
            })?;

        let mut mask = GrayImage::new(frame.width, frame.height);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            if self.in_range(rgb_to_hsv(pixel.0)) {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }

        // Close twice to fill holes, open once to drop specks, then smooth
        let closed = close(&close(&mask, Norm::LInf, 2), Norm::LInf, 2);
        let opened = open(&closed, Norm::LInf, 2);
        Ok(median_filter(&opened, 2, 2))
    }

    fn largest_region(&self, mask: &GrayImage) -> Option<Detection> {
        let components = connected_components(mask, Connectivity::Eight, Luma([0u8]));
        let regions = collect_regions(&components);

        // Equal areas go to the region labelled first in raster order
        let (label, region) = regions
            .iter()
            .max_by(|(la, a), (lb, b)| a.count.cmp(&b.count).then(lb.cmp(la)))?;
        trace!("Largest skin region {} has {} pixels", label, region.count);

        let area = region.count as f64;
        if area < self.min_area {
            debug!("Skin region too small ({} < {})", area, self.min_area);
            return None;
        }

        Some(Detection {
            centroid: Point::new(
                region.sum_x as f64 / region.count as f64,
                region.sum_y as f64 / region.count as f64,
            ),
            area,
            bounds: BoundingBox {
                min: Point::new(region.min.0 as f64, region.min.1 as f64),
                max: Point::new(region.max.0 as f64, region.max.1 as f64),
            },
        })
    }
}

impl HandDetector for SkinDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Detection>> {
        let mask = self.skin_mask(frame)?;
        Ok(self.largest_region(&mask))
    }

    fn calibrate(&mut self, frame: &Frame) -> Option<([u8; 3], [u8; 3])> {
        let sample = frame.pixel(frame.width / 2, frame.height / 2)?;
        let [hue, _, _] = rgb_to_hsv(sample);
        let margin = self.config.calibration_margin;

        self.lower = [hue.saturating_sub(margin), CALIBRATED_SV_MIN, CALIBRATED_SV_MIN];
        self.upper = [hue.saturating_add(margin).min(HUE_MAX), 255, 255];
        info!(
            "Calibrated skin range from hue {}: {:?}..{:?}",
            hue, self.lower, self.upper
        );
        Some((self.lower, self.upper))
    }

    fn reset(&mut self) {
        self.lower = self.config.lower;
        self.upper = self.config.upper;
        debug!("Skin range reset to configured bounds");
    }
}

#[derive(Debug, Clone, Copy)]
struct Region {
    count: u64,
    sum_x: u64,
    sum_y: u64,
    min: (u32, u32),
    max: (u32, u32),
}

fn collect_regions(components: &ImageBuffer<Luma<u32>, Vec<u32>>) -> BTreeMap<u32, Region> {
    let mut regions: BTreeMap<u32, Region> = BTreeMap::new();

    for (x, y, pixel) in components.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        let region = regions.entry(label).or_insert(Region {
            count: 0,
            sum_x: 0,
            sum_y: 0,
            min: (x, y),
            max: (x, y),
        });
        region.count += 1;
        region.sum_x += x as u64;
        region.sum_y += y as u64;
        region.min = (region.min.0.min(x), region.min.1.min(y));
        region.max = (region.max.0.max(x), region.max.1.max(y));
    }

    regions
}

/// RGB to HSV on the OpenCV 8-bit scale (H 0..=180, S and V 0..=255).
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f64, g as f64, b as f64);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let saturation = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let hue_degrees = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let hue_degrees = if hue_degrees < 0.0 {
        hue_degrees + 360.0
    } else {
        hue_degrees
    };

    [
        (hue_degrees / 2.0).round().min(HUE_MAX as f64) as u8,
        saturation.round() as u8,
        max as u8,
    ]
}
