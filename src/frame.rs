use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::warn;

/// Rotation options for frame processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl Rotation {
    /// Get rotation angle in degrees
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }
}

/// One RGB24 frame as delivered by a frame source.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Unique frame identifier
    pub id: u64,
    /// Timestamp when frame was captured
    pub timestamp: SystemTime,
    /// Packed RGB24 pixels, row-major (shared ownership for efficiency)
    pub data: Arc<Vec<u8>>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl Frame {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Create a new frame instance
    pub fn new(id: u64, timestamp: SystemTime, data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            id,
            timestamp,
            data: Arc::new(data),
            width,
            height,
        }
    }

    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        self.data.len() == self.expected_size()
    }

    /// RGB value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        self.data
            .get(idx..idx + Self::BYTES_PER_PIXEL)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Return a copy of this frame with the configured orientation applied.
    ///
    /// Mirroring happens after rotation. A frame whose buffer does not
    /// match its dimensions is returned unchanged.
    pub fn oriented(&self, rotation: Option<Rotation>, mirror: bool) -> Frame {
        if rotation.is_none() && !mirror {
            return self.clone();
        }

        let img = match RgbImage::from_raw(self.width, self.height, self.data.to_vec()) {
            Some(img) => img,
            None => {
                warn!(
                    "Frame {} has {} bytes, expected {}; skipping orientation",
                    self.id,
                    self.data.len(),
                    self.expected_size()
                );
                return self.clone();
            }
        };

        let mut img = match rotation {
            Some(Rotation::Rotate90) => imageops::rotate90(&img),
            Some(Rotation::Rotate180) => imageops::rotate180(&img),
            Some(Rotation::Rotate270) => imageops::rotate270(&img),
            None => img,
        };
        if mirror {
            imageops::flip_horizontal_in_place(&mut img);
        }

        let (width, height) = img.dimensions();
        Frame::new(self.id, self.timestamp, img.into_raw(), width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x1 frame: red pixel then blue pixel.
    fn red_blue() -> Frame {
        Frame::new(1, SystemTime::now(), vec![255, 0, 0, 0, 0, 255], 2, 1)
    }

    #[test]
    fn test_frame_size_validation() {
        let frame = red_blue();
        assert!(frame.validate_size());

        let short = Frame::new(2, SystemTime::now(), vec![0; 5], 2, 1);
        assert!(!short.validate_size());
    }

    #[test]
    fn test_pixel_lookup() {
        let frame = red_blue();
        assert_eq!(frame.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(frame.pixel(1, 0), Some([0, 0, 255]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_rotate_180_swaps_pixels() {
        let rotated = red_blue().oriented(Some(Rotation::Rotate180), false);
        assert_eq!(rotated.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(rotated.pixel(1, 0), Some([255, 0, 0]));
    }

    #[test]
    fn test_rotate_90_transposes_dimensions() {
        let rotated = red_blue().oriented(Some(Rotation::Rotate90), false);
        assert_eq!((rotated.width, rotated.height), (1, 2));
        assert_eq!(rotated.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(rotated.pixel(0, 1), Some([0, 0, 255]));
    }

    #[test]
    fn test_mirror_flips_horizontally() {
        let mirrored = red_blue().oriented(None, true);
        assert_eq!(mirrored.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(Rotation::Rotate270.degrees(), 270);
    }

    #[test]
    fn test_rotate_270_then_mirror() {
        // 2x2: red, blue / green, white
        let frame = Frame::new(
            3,
            SystemTime::now(),
            vec![255, 0, 0, 0, 0, 255, 0, 255, 0, 255, 255, 255],
            2,
            2,
        );

        let rotated = frame.oriented(Some(Rotation::Rotate270), false);
        assert_eq!(rotated.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(rotated.pixel(0, 1), Some([255, 0, 0]));

        let mirrored = frame.oriented(Some(Rotation::Rotate270), true);
        assert_eq!(mirrored.pixel(1, 0), Some([0, 0, 255]));
        assert_eq!(mirrored.pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(mirrored.id, 3);
    }

    #[test]
    fn test_short_buffer_is_left_unchanged() {
        let short = Frame::new(4, SystemTime::now(), vec![1, 2, 3], 2, 2);
        let oriented = short.oriented(Some(Rotation::Rotate90), true);
        assert_eq!((oriented.width, oriented.height), (2, 2));
        assert_eq!(oriented.data.as_slice(), &[1, 2, 3]);
    }
}
