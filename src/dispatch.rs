//! Debounced gesture-to-action dispatch.

use crate::error::PlaybackError;
use crate::playback::PlaybackSink;
use crate::pose::{Classification, PoseLabel};
use crate::profiles::GestureProfiles;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a classification did not fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IgnoreReason {
    Unknown,
    NotConfigured,
    Disabled,
    LowConfidence { confidence: f64, threshold: f64 },
    CoolingDown { remaining: Duration },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown pose"),
            Self::NotConfigured => write!(f, "no profile"),
            Self::Disabled => write!(f, "profile disabled"),
            Self::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "confidence {:.2} below {:.2}", confidence, threshold),
            Self::CoolingDown { remaining } => {
                write!(f, "cooling down for {:.1}s", remaining.as_secs_f64())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Fired {
        label: PoseLabel,
        sound_id: String,
        /// True only when the sink started the sound. The firing counts
        /// either way.
        played: bool,
    },
    Ignored {
        label: PoseLabel,
        reason: IgnoreReason,
    },
}

impl DispatchOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, Self::Fired { .. })
    }
}

/// Applies profile thresholds and per-gesture cooldowns.
#[derive(Debug, Clone)]
pub struct GestureDispatcher {
    profiles: GestureProfiles,
    last_fired: HashMap<PoseLabel, Duration>,
    sound_enabled: bool,
    volume: f64,
}

impl GestureDispatcher {
    pub fn new(profiles: GestureProfiles, volume: f64, sound_enabled: bool) -> Self {
        Self {
            profiles,
            last_fired: HashMap::new(),
            sound_enabled,
            volume,
        }
    }

    pub fn profiles(&self) -> &GestureProfiles {
        &self.profiles
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    /// Flip sound output and return the new state.
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        info!(
            "Sound output {}",
            if self.sound_enabled { "enabled" } else { "disabled" }
        );
        self.sound_enabled
    }

    pub fn last_fired(&self, label: PoseLabel) -> Option<Duration> {
        self.last_fired.get(&label).copied()
    }

    /// Forget every cooldown.
    pub fn reset(&mut self) {
        self.last_fired.clear();
    }

    /// Decide whether `classification` fires at session time `now`.
    ///
    /// Checks run in a fixed order and the first failing one is reported.
    /// A missing sound is logged and does not prevent the firing from
    /// being recorded.
    pub fn dispatch(
        &mut self,
        classification: &Classification,
        now: Duration,
        sink: &mut dyn PlaybackSink,
    ) -> DispatchOutcome {
        let label = classification.label;
        let ignored = |reason| DispatchOutcome::Ignored { label, reason };

        if label == PoseLabel::Unknown {
            return ignored(IgnoreReason::Unknown);
        }

        let profile = match self.profiles.get(label) {
            Some(profile) => profile,
            None => return ignored(IgnoreReason::NotConfigured),
        };

        if !profile.enabled {
            return ignored(IgnoreReason::Disabled);
        }

        if classification.confidence < profile.confidence_threshold {
            return ignored(IgnoreReason::LowConfidence {
                confidence: classification.confidence,
                threshold: profile.confidence_threshold,
            });
        }

        let cooldown = profile.cooldown_duration();
        if let Some(last) = self.last_fired.get(&label) {
            let elapsed = now.saturating_sub(*last);
            if elapsed < cooldown {
                debug!("{} suppressed, {:?} since last firing", label, elapsed);
                return ignored(IgnoreReason::CoolingDown {
                    remaining: cooldown - elapsed,
                });
            }
        }

        let sound_id = profile.sound_id().to_string();
        info!("Gesture detected: {} ({})", profile.name, label);
        self.last_fired.insert(label, now);

        let played = if self.sound_enabled {
            match sink.play(&sound_id, self.volume) {
                Ok(()) => true,
                Err(PlaybackError::NoOutput) => {
                    debug!("No sound output for {}", label);
                    false
                }
                Err(e) => {
                    warn!("Could not play sound for {}: {}", label, e);
                    false
                }
            }
        } else {
            false
        };

        DispatchOutcome::Fired {
            label,
            sound_id,
            played,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::recording::RecordingPlayback;
    use crate::playback::SilentPlayback;
    use crate::profiles::GestureProfile;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn matched(label: PoseLabel) -> Classification {
        Classification {
            label,
            confidence: 0.9,
        }
    }

    fn dispatcher() -> GestureDispatcher {
        GestureDispatcher::new(GestureProfiles::default(), 0.7, true)
    }

    #[test]
    fn test_cooldown_window() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback::default();
        let peace = matched(PoseLabel::Peace);

        assert!(dispatcher.dispatch(&peace, secs(0.0), &mut sink).fired());

        let outcome = dispatcher.dispatch(&peace, secs(1.0), &mut sink);
        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::CoolingDown { .. },
                ..
            }
        ));

        assert!(dispatcher.dispatch(&peace, secs(2.1), &mut sink).fired());
        assert_eq!(
            sink.played,
            vec![("victory".to_string(), 0.7), ("victory".to_string(), 0.7)]
        );
        assert_eq!(dispatcher.last_fired(PoseLabel::Peace), Some(secs(2.1)));
    }

    #[test]
    fn test_fires_exactly_at_cooldown() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback::default();
        let peace = matched(PoseLabel::Peace);

        assert!(dispatcher.dispatch(&peace, secs(10.0), &mut sink).fired());

        let just_before = secs(12.0) - Duration::from_millis(1);
        let outcome = dispatcher.dispatch(&peace, just_before, &mut sink);
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                label: PoseLabel::Peace,
                reason: IgnoreReason::CoolingDown {
                    remaining: Duration::from_millis(1)
                }
            }
        );

        assert!(dispatcher.dispatch(&peace, secs(12.0), &mut sink).fired());
        assert_eq!(sink.played.len(), 2);
    }

    #[test]
    fn test_huge_cooldown_does_not_panic() {
        let mut profiles = GestureProfiles::empty();
        profiles.insert(
            PoseLabel::Peace,
            GestureProfile::new("Peace", "victory.wav", 1e20),
        );
        let mut dispatcher = GestureDispatcher::new(profiles, 0.7, true);
        let mut sink = RecordingPlayback::default();
        let peace = matched(PoseLabel::Peace);

        assert!(dispatcher.dispatch(&peace, secs(0.0), &mut sink).fired());
        assert!(!dispatcher
            .dispatch(&peace, secs(1_000_000.0), &mut sink)
            .fired());
    }

    #[test]
    fn test_silent_sink_never_reports_played() {
        let mut dispatcher = GestureDispatcher::new(GestureProfiles::default(), 0.7, false);
        assert!(dispatcher.toggle_sound());

        let mut sink = SilentPlayback;
        let outcome = dispatcher.dispatch(&matched(PoseLabel::Peace), secs(0.0), &mut sink);
        assert_eq!(
            outcome,
            DispatchOutcome::Fired {
                label: PoseLabel::Peace,
                sound_id: "victory".to_string(),
                played: false
            }
        );
    }

    #[test]
    fn test_cooldowns_are_per_gesture() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback::default();

        assert!(dispatcher
            .dispatch(&matched(PoseLabel::Peace), secs(0.0), &mut sink)
            .fired());
        assert!(dispatcher
            .dispatch(&matched(PoseLabel::Fist), secs(0.5), &mut sink)
            .fired());
    }

    #[test]
    fn test_unknown_and_unconfigured_are_ignored() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback::default();

        let outcome = dispatcher.dispatch(&Classification::unknown(), secs(0.0), &mut sink);
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                label: PoseLabel::Unknown,
                reason: IgnoreReason::Unknown
            }
        );

        let outcome = dispatcher.dispatch(&matched(PoseLabel::OpenHand), secs(0.0), &mut sink);
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                label: PoseLabel::OpenHand,
                reason: IgnoreReason::NotConfigured
            }
        );
        assert!(sink.played.is_empty());
    }

    #[test]
    fn test_disabled_and_low_confidence() {
        let mut profiles = GestureProfiles::default();
        profiles.get_mut(PoseLabel::Fist).unwrap().enabled = false;
        let mut strict = GestureProfile::new("Strict", "strict.wav", 1.0);
        strict.confidence_threshold = 0.95;
        profiles.insert(PoseLabel::OpenHand, strict);

        let mut dispatcher = GestureDispatcher::new(profiles, 1.0, true);
        let mut sink = RecordingPlayback::default();

        let outcome = dispatcher.dispatch(&matched(PoseLabel::Fist), secs(0.0), &mut sink);
        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::Disabled,
                ..
            }
        ));

        let outcome = dispatcher.dispatch(&matched(PoseLabel::OpenHand), secs(0.0), &mut sink);
        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::LowConfidence { .. },
                ..
            }
        ));
        assert!(dispatcher.last_fired(PoseLabel::OpenHand).is_none());
    }

    #[test]
    fn test_sound_off_still_records_firing() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback::default();
        assert!(!dispatcher.toggle_sound());

        let outcome = dispatcher.dispatch(&matched(PoseLabel::ThumbsUp), secs(0.0), &mut sink);
        assert_eq!(
            outcome,
            DispatchOutcome::Fired {
                label: PoseLabel::ThumbsUp,
                sound_id: "thumbs_up".to_string(),
                played: false
            }
        );
        assert!(sink.played.is_empty());
        assert!(!dispatcher
            .dispatch(&matched(PoseLabel::ThumbsUp), secs(1.0), &mut sink)
            .fired());
    }

    #[test]
    fn test_missing_sound_is_not_fatal() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback {
            missing: vec!["ok".to_string()],
            ..Default::default()
        };

        let outcome = dispatcher.dispatch(&matched(PoseLabel::OkSign), secs(0.0), &mut sink);
        assert!(matches!(outcome, DispatchOutcome::Fired { played: false, .. }));
    }

    #[test]
    fn test_reset_clears_cooldowns() {
        let mut dispatcher = dispatcher();
        let mut sink = RecordingPlayback::default();
        let pointing = matched(PoseLabel::Pointing);

        assert!(dispatcher.dispatch(&pointing, secs(0.0), &mut sink).fired());
        dispatcher.reset();
        assert!(dispatcher.dispatch(&pointing, secs(0.1), &mut sink).fired());
    }
}
