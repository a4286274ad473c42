use crate::dispatch::IgnoreReason;
use crate::geometry::Point;
use crate::pose::PoseLabel;
use crate::shape::TrailShape;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Things that happen during a session, returned by the session step
/// functions so callers decide how to surface them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    /// A hand region was found in the frame
    HandDetected { centroid: Point, area: f64 },
    /// The hand disappeared after being tracked
    HandLost,
    /// The trail classifier changed its answer
    ShapeChanged { from: TrailShape, to: TrailShape },
    /// A hand pose was classified
    PoseRecognized { label: PoseLabel, confidence: f64 },
    /// A gesture passed every dispatch check
    GestureFired {
        label: PoseLabel,
        sound_id: String,
        played: bool,
    },
    /// A recognized gesture was held back by its profile
    GestureSuppressed {
        label: PoseLabel,
        #[serde(skip)]
        reason: IgnoreReason,
    },
    SoundToggled { enabled: bool },
    /// Trail, buffers, cooldowns and calibration were reset
    TrackingReset,
    TrailCleared,
    SkinCalibrated { lower: [u8; 3], upper: [u8; 3] },
}

impl SessionEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SessionEvent::HandDetected { centroid, area } => format!(
                "Hand at ({:.0}, {:.0}) with area {:.0}",
                centroid.x, centroid.y, area
            ),
            SessionEvent::HandLost => "Hand lost".to_string(),
            SessionEvent::ShapeChanged { from, to } => {
                format!("Trail shape changed: {} -> {}", from, to)
            }
            SessionEvent::PoseRecognized { label, confidence } => {
                format!("Pose {} ({:.2})", label, confidence)
            }
            SessionEvent::GestureFired {
                label,
                sound_id,
                played,
            } => {
                if *played {
                    format!("Gesture {} fired, playing {}", label, sound_id)
                } else {
                    format!("Gesture {} fired (silent)", label)
                }
            }
            SessionEvent::GestureSuppressed { label, reason } => {
                format!("Gesture {} suppressed: {}", label, reason)
            }
            SessionEvent::SoundToggled { enabled } => {
                format!("Sound {}", if *enabled { "on" } else { "off" })
            }
            SessionEvent::TrackingReset => "Tracking reset".to_string(),
            SessionEvent::TrailCleared => "Trail cleared".to_string(),
            SessionEvent::SkinCalibrated { lower, upper } => {
                format!("Skin range calibrated to {:?}..{:?}", lower, upper)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::HandDetected { .. } => "hand_detected",
            SessionEvent::HandLost => "hand_lost",
            SessionEvent::ShapeChanged { .. } => "shape_changed",
            SessionEvent::PoseRecognized { .. } => "pose_recognized",
            SessionEvent::GestureFired { .. } => "gesture_fired",
            SessionEvent::GestureSuppressed { .. } => "gesture_suppressed",
            SessionEvent::SoundToggled { .. } => "sound_toggled",
            SessionEvent::TrackingReset => "tracking_reset",
            SessionEvent::TrailCleared => "trail_cleared",
            SessionEvent::SkinCalibrated { .. } => "skin_calibrated",
        }
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub frames_processed: u64,
    pub frames_with_hand: u64,
    pub shape_changes: u64,
    pub gestures_fired: u64,
    pub gestures_suppressed: u64,
    pub events_by_type: BTreeMap<&'static str, u64>,
    pub max_velocity: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            frames_processed: 0,
            frames_with_hand: 0,
            shape_changes: 0,
            gestures_fired: 0,
            gestures_suppressed: 0,
            events_by_type: BTreeMap::new(),
            max_velocity: 0.0,
        }
    }

    pub fn record_frame(&mut self, hand_present: bool) {
        self.frames_processed += 1;
        if hand_present {
            self.frames_with_hand += 1;
        }
    }

    pub fn record_event(&mut self, event: &SessionEvent) {
        *self.events_by_type.entry(event.event_type()).or_insert(0) += 1;
        match event {
            SessionEvent::ShapeChanged { .. } => self.shape_changes += 1,
            SessionEvent::GestureFired { .. } => self.gestures_fired += 1,
            SessionEvent::GestureSuppressed { .. } => self.gestures_suppressed += 1,
            _ => {}
        }
    }

    pub fn record_velocity(&mut self, velocity: f64) {
        if velocity > self.max_velocity {
            self.max_velocity = velocity;
        }
    }

    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.started_at).to_std().unwrap_or_default()
    }

    /// Fraction of processed frames that contained a hand
    pub fn detection_rate(&self) -> f64 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.frames_with_hand as f64 / self.frames_processed as f64
        }
    }

    pub fn log_summary(&self) {
        info!("Session summary:");
        info!("  Started: {}", self.started_at.to_rfc3339());
        info!("  Duration: {:.1}s", self.elapsed().as_secs_f64());
        info!(
            "  Frames: {} ({} with hand, {:.0}%)",
            self.frames_processed,
            self.frames_with_hand,
            self.detection_rate() * 100.0
        );
        info!("  Shape changes: {}", self.shape_changes);
        info!(
            "  Gestures: {} fired, {} suppressed",
            self.gestures_fired, self.gestures_suppressed
        );
        if self.max_velocity > 0.0 {
            info!("  Max velocity: {:.1} px/s", self.max_velocity);
        }
        for (event_type, count) in &self.events_by_type {
            info!("  {}: {}", event_type, count);
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
