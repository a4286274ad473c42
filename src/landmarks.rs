//! Hand landmark sets as produced by an external landmark model.
//!
//! Indices follow the common 21-point hand topology: wrist at 0, then four
//! joints per digit from the base outwards (thumb 1-4, index 5-8,
//! middle 9-12, ring 13-16, pinky 17-20).

use crate::error::LandmarkError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// One hand joint. `z` is relative depth and is zero when the model
/// reports 2D points only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(&self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Joint the tip is compared against: IP for the thumb, PIP otherwise.
    pub fn joint(&self) -> usize {
        match self {
            Finger::Thumb => THUMB_IP,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }

    fn slot(&self) -> usize {
        match self {
            Finger::Thumb => 0,
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Ring => 3,
            Finger::Pinky => 4,
        }
    }
}

/// The full joint set for one hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Derive which fingers are extended.
    ///
    /// The thumb moves sideways, so it counts as extended when its tip is
    /// farther from the wrist's vertical axis than its IP joint. The other
    /// fingers count as extended when the tip is above (smaller image y)
    /// their PIP joint.
    pub fn finger_state(&self) -> FingerState {
        let axis = self.landmarks[WRIST].x;
        let mut extended = [false; 5];

        for finger in Finger::ALL {
            let tip = &self.landmarks[finger.tip()];
            let joint = &self.landmarks[finger.joint()];
            extended[finger.slot()] = match finger {
                Finger::Thumb => (tip.x - axis).abs() > (joint.x - axis).abs(),
                _ => tip.y < joint.y,
            };
        }

        FingerState { extended }
    }

    /// 2D distance between thumb tip and index tip.
    pub fn pinch_distance(&self) -> f64 {
        self.landmarks[THUMB_TIP]
            .point()
            .distance(&self.landmarks[INDEX_TIP].point())
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self, Self::Error> {
        let actual = landmarks.len();
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks.try_into().map_err(|_| LandmarkError::Count {
                expected: LANDMARK_COUNT,
                actual,
            })?;
        Ok(Self::new(landmarks))
    }
}

/// Extended/flexed summary of the five fingers for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    extended: [bool; 5],
}

impl FingerState {
    pub fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            extended: [thumb, index, middle, ring, pinky],
        }
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger.slot()]
    }

    pub fn extended_count(&self) -> usize {
        self.extended.iter().filter(|e| **e).count()
    }

    pub fn none(&self) -> bool {
        self.extended_count() == 0
    }

    pub fn all(&self) -> bool {
        self.extended_count() == self.extended.len()
    }

    /// True when exactly the given fingers are extended.
    pub fn exactly(&self, fingers: &[Finger]) -> bool {
        Finger::ALL
            .iter()
            .all(|f| self.is_extended(*f) == fingers.contains(f))
    }

    pub fn as_array(&self) -> [bool; 5] {
        self.extended
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds synthetic hands in normalized image coordinates.
    ///
    /// The wrist sits at (0.5, 0.9); joints sit at y = 0.5 and extended tips
    /// at y = 0.3, curled tips at y = 0.6. The thumb joint sits at x = 0.40;
    /// an extended thumb tip at x = 0.30, a tucked one at (0.45, 0.75) so it
    /// stays clear of the curled index tip.
    pub struct HandBuilder {
        landmarks: [Landmark; LANDMARK_COUNT],
    }

    impl HandBuilder {
        pub fn new() -> Self {
            let mut landmarks = [Landmark::new(0.5, 0.7); LANDMARK_COUNT];
            landmarks[WRIST] = Landmark::new(0.5, 0.9);
            landmarks[THUMB_IP] = Landmark::new(0.40, 0.6);
            for (slot, finger) in Finger::ALL.iter().enumerate().skip(1) {
                let x = 0.40 + 0.05 * slot as f64;
                landmarks[finger.joint()] = Landmark::new(x, 0.5);
            }
            let mut builder = Self { landmarks };
            for finger in Finger::ALL {
                builder = builder.curled(finger);
            }
            builder
        }

        pub fn extended(mut self, finger: Finger) -> Self {
            let joint = self.landmarks[finger.joint()];
            self.landmarks[finger.tip()] = match finger {
                Finger::Thumb => Landmark::new(0.30, 0.6),
                _ => Landmark::new(joint.x, 0.3),
            };
            self
        }

        pub fn curled(mut self, finger: Finger) -> Self {
            let joint = self.landmarks[finger.joint()];
            self.landmarks[finger.tip()] = match finger {
                Finger::Thumb => Landmark::new(0.45, 0.75),
                _ => Landmark::new(joint.x, 0.6),
            };
            self
        }

        pub fn with(mut self, index: usize, landmark: Landmark) -> Self {
            self.landmarks[index] = landmark;
            self
        }

        pub fn build(self) -> LandmarkSet {
            LandmarkSet::new(self.landmarks)
        }
    }
}
