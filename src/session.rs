//! Per-session tracking state. Each session object is created when a
//! session starts, mutated once per processed frame, and dropped at the end.

use crate::config::{ShapeConfig, TrackerConfig};
use crate::detector::Detection;
use crate::dispatch::{DispatchOutcome, GestureDispatcher, IgnoreReason};
use crate::events::SessionEvent;
use crate::geometry::Point;
use crate::landmarks::LandmarkSet;
use crate::playback::PlaybackSink;
use crate::pose::{Classification, PoseClassifier, PoseLabel};
use crate::shape::{ShapeClassifier, TrailShape};
use crate::trail::{TimedPoint, Trail, VelocityTracker};
use std::time::Duration;
use tracing::{debug, info};

/// Centroid tracking and trail-shape classification.
#[derive(Debug, Clone)]
pub struct TrailSession {
    trail: Trail,
    gesture_buffer: Trail,
    velocity: VelocityTracker,
    classifier: ShapeClassifier,
    current_shape: TrailShape,
    hand_present: bool,
}

impl TrailSession {
    /// The shape classifier reads its own buffer, twice its window long,
    /// so the display trail length does not affect classification.
    pub fn new(tracker: &TrackerConfig, shape: ShapeConfig) -> Self {
        let classifier = ShapeClassifier::new(shape);
        let buffer_capacity = (classifier.window() * 2).max(1);
        Self {
            trail: Trail::new(tracker.trail_capacity),
            gesture_buffer: Trail::new(buffer_capacity),
            velocity: VelocityTracker::new(tracker.velocity_history),
            classifier,
            current_shape: TrailShape::InsufficientData,
            hand_present: false,
        }
    }

    /// Feed one frame's detector answer.
    pub fn process_detection(
        &mut self,
        detection: Option<&Detection>,
        at: Duration,
    ) -> Vec<SessionEvent> {
        match detection {
            Some(detection) => {
                let mut events = vec![SessionEvent::HandDetected {
                    centroid: detection.centroid,
                    area: detection.area,
                }];
                events.extend(self.process_centroid(detection.centroid, at));
                events
            }
            None if self.hand_present => {
                self.hand_present = false;
                debug!("Hand lost at {:?}", at);
                vec![SessionEvent::HandLost]
            }
            None => Vec::new(),
        }
    }

    /// Record a hand position and re-classify the trail.
    pub fn process_centroid(&mut self, point: Point, at: Duration) -> Vec<SessionEvent> {
        self.hand_present = true;

        let sample = TimedPoint { point, at };
        if let Some(previous) = self.trail.latest().copied() {
            self.velocity.record(&previous, &sample);
        }

        self.trail.push(point, at);
        self.gesture_buffer.push(point, at);

        let shape = self
            .classifier
            .classify(&self.gesture_buffer.recent_points(self.classifier.window()));

        if shape == self.current_shape {
            return Vec::new();
        }

        let from = std::mem::replace(&mut self.current_shape, shape);
        if shape != TrailShape::InsufficientData {
            info!("Trail shape: {}", shape);
        }
        vec![SessionEvent::ShapeChanged { from, to: shape }]
    }

    pub fn current_shape(&self) -> TrailShape {
        self.current_shape
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn gesture_buffer(&self) -> &Trail {
        &self.gesture_buffer
    }

    pub fn velocity(&self) -> &VelocityTracker {
        &self.velocity
    }

    pub fn hand_present(&self) -> bool {
        self.hand_present
    }

    /// Drop the trail and gesture buffer, keep velocity statistics.
    pub fn clear_trail(&mut self) {
        self.trail.clear();
        self.gesture_buffer.clear();
        self.current_shape = TrailShape::InsufficientData;
    }

    /// Drop every piece of tracking state.
    pub fn reset(&mut self) {
        self.clear_trail();
        self.velocity.clear();
        self.hand_present = false;
    }
}

/// Static pose classification and debounced dispatch.
#[derive(Debug, Clone)]
pub struct PoseSession {
    classifier: PoseClassifier,
    dispatcher: GestureDispatcher,
    last_labels: Vec<PoseLabel>,
}

impl PoseSession {
    pub fn new(classifier: PoseClassifier, dispatcher: GestureDispatcher) -> Self {
        Self {
            classifier,
            dispatcher,
            last_labels: Vec::new(),
        }
    }

    /// Classify every hand of one frame and dispatch the results.
    ///
    /// `PoseRecognized` is reported when a hand's label differs from the
    /// previous frame. `GestureSuppressed` is reported for every frame in
    /// which a configured gesture is held back.
    pub fn process_hands(
        &mut self,
        hands: &[LandmarkSet],
        now: Duration,
        sink: &mut dyn PlaybackSink,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if hands.is_empty() {
            if !self.last_labels.is_empty() {
                self.last_labels.clear();
                events.push(SessionEvent::HandLost);
            }
            return events;
        }

        let classifications: Vec<Classification> =
            hands.iter().map(|hand| self.classifier.classify(hand)).collect();

        for (index, classification) in classifications.iter().enumerate() {
            let changed = self.last_labels.get(index) != Some(&classification.label);
            if changed && classification.label != PoseLabel::Unknown {
                events.push(SessionEvent::PoseRecognized {
                    label: classification.label,
                    confidence: classification.confidence,
                });
            }

            match self.dispatcher.dispatch(classification, now, sink) {
                DispatchOutcome::Fired {
                    label,
                    sound_id,
                    played,
                } => events.push(SessionEvent::GestureFired {
                    label,
                    sound_id,
                    played,
                }),
                DispatchOutcome::Ignored { label, reason } => match reason {
                    IgnoreReason::Unknown | IgnoreReason::NotConfigured => {}
                    reason => events.push(SessionEvent::GestureSuppressed { label, reason }),
                },
            }
        }

        self.last_labels = classifications.iter().map(|c| c.label).collect();
        events
    }

    pub fn dispatcher(&self) -> &GestureDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut GestureDispatcher {
        &mut self.dispatcher
    }

    pub fn classifier(&self) -> &PoseClassifier {
        &self.classifier
    }

    pub fn reset(&mut self) {
        self.dispatcher.reset();
        self.last_labels.clear();
    }
}
