//! Static hand-pose classification from a single landmark set.
//!
//! Classification walks an ordered rule table; the first rule whose
//! predicate holds decides the label. Matched poses report a fixed
//! confidence and unmatched hands report [`PoseLabel::Unknown`] with zero
//! confidence. There is no graded score.

use crate::config::PoseConfig;
use crate::landmarks::{Finger, FingerState, LandmarkSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Recognized hand poses. Serialized names match the gesture profile keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLabel {
    Unknown,
    Peace,
    MiddleFinger,
    ThumbsUp,
    OkSign,
    Pointing,
    #[serde(rename = "rock", alias = "fist")]
    Fist,
    OpenHand,
}

impl PoseLabel {
    pub const ALL: [PoseLabel; 8] = [
        PoseLabel::Unknown,
        PoseLabel::Peace,
        PoseLabel::MiddleFinger,
        PoseLabel::ThumbsUp,
        PoseLabel::OkSign,
        PoseLabel::Pointing,
        PoseLabel::Fist,
        PoseLabel::OpenHand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Peace => "peace",
            Self::MiddleFinger => "middle_finger",
            Self::ThumbsUp => "thumbs_up",
            Self::OkSign => "ok_sign",
            Self::Pointing => "pointing",
            Self::Fist => "fist",
            Self::OpenHand => "open_hand",
        }
    }
}

impl fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: PoseLabel,
    pub confidence: f64,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            label: PoseLabel::Unknown,
            confidence: 0.0,
        }
    }
}

/// Per-hand facts the rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseFeatures {
    pub fingers: FingerState,
    pub pinched: bool,
}

/// One row of the decision table.
#[derive(Clone, Copy)]
pub struct PoseRule {
    pub label: PoseLabel,
    pub description: &'static str,
    pub predicate: fn(&PoseFeatures) -> bool,
}

impl fmt::Debug for PoseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseRule")
            .field("label", &self.label)
            .field("description", &self.description)
            .finish()
    }
}

/// The decision table, highest precedence first.
pub static POSE_RULES: [PoseRule; 7] = [
    PoseRule {
        label: PoseLabel::OkSign,
        description: "thumb tip touches index tip",
        predicate: |f| f.pinched,
    },
    PoseRule {
        label: PoseLabel::Peace,
        description: "index and middle extended",
        predicate: |f| f.fingers.exactly(&[Finger::Index, Finger::Middle]),
    },
    PoseRule {
        label: PoseLabel::MiddleFinger,
        description: "only middle extended",
        predicate: |f| f.fingers.exactly(&[Finger::Middle]),
    },
    PoseRule {
        label: PoseLabel::ThumbsUp,
        description: "only thumb extended",
        predicate: |f| f.fingers.exactly(&[Finger::Thumb]),
    },
    PoseRule {
        label: PoseLabel::Pointing,
        description: "only index extended",
        predicate: |f| f.fingers.exactly(&[Finger::Index]),
    },
    PoseRule {
        label: PoseLabel::Fist,
        description: "no finger extended",
        predicate: |f| f.fingers.none(),
    },
    PoseRule {
        label: PoseLabel::OpenHand,
        description: "all fingers extended",
        predicate: |f| f.fingers.all(),
    },
];

#[derive(Debug, Clone)]
pub struct PoseClassifier {
    config: PoseConfig,
    rules: &'static [PoseRule],
}

impl PoseClassifier {
    pub fn new(config: PoseConfig) -> Self {
        Self {
            config,
            rules: &POSE_RULES,
        }
    }

    pub fn config(&self) -> &PoseConfig {
        &self.config
    }

    pub fn rules(&self) -> &[PoseRule] {
        self.rules
    }

    pub fn features(&self, hand: &LandmarkSet) -> PoseFeatures {
        PoseFeatures {
            fingers: hand.finger_state(),
            pinched: hand.pinch_distance() < self.config.pinch_threshold,
        }
    }

    pub fn classify(&self, hand: &LandmarkSet) -> Classification {
        self.classify_features(&self.features(hand))
    }

    pub fn classify_features(&self, features: &PoseFeatures) -> Classification {
        match self.rules.iter().find(|rule| (rule.predicate)(features)) {
            Some(rule) => {
                trace!("Pose rule matched: {} -> {}", rule.description, rule.label);
                Classification {
                    label: rule.label,
                    confidence: self.config.match_confidence,
                }
            }
            None => Classification::unknown(),
        }
    }
}

impl Default for PoseClassifier {
    fn default() -> Self {
        Self::new(PoseConfig::default())
    }
}
