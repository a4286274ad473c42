//! Per-gesture profiles: display name, sound, cooldown, threshold.
//!
//! Profiles persist as a JSON object keyed by pose name
//! (`{"peace": {...}, "rock": {...}}`). Fist is stored as `rock`, the key
//! older gesture files use; `fist` is accepted when reading.

use crate::error::Result;
use crate::pose::PoseLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureProfile {
    pub name: String,
    pub sound_file: String,
    /// Minimum seconds between two firings of this gesture
    pub cooldown: f64,
    pub confidence_threshold: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl GestureProfile {
    pub fn new(name: &str, sound_file: &str, cooldown: f64) -> Self {
        Self {
            name: name.to_string(),
            sound_file: sound_file.to_string(),
            cooldown,
            confidence_threshold: 0.8,
            enabled: true,
        }
    }

    /// Cooldown as a `Duration`. Values too large to represent saturate.
    pub fn cooldown_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Reject values a hand-edited profile file can carry but dispatch cannot honor.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.cooldown.is_finite() || self.cooldown < 0.0 {
            return Err(format!("cooldown {} must be a non-negative number", self.cooldown));
        }
        if Duration::try_from_secs_f64(self.cooldown).is_err() {
            return Err(format!("cooldown {} is out of range", self.cooldown));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold {} must be between 0 and 1",
                self.confidence_threshold
            ));
        }
        Ok(())
    }

    /// Sound identifier: the sound file name without its extension.
    pub fn sound_id(&self) -> &str {
        Path::new(&self.sound_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.sound_file)
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureProfiles {
    profiles: BTreeMap<PoseLabel, GestureProfile>,
}

impl GestureProfiles {
    pub fn new(profiles: BTreeMap<PoseLabel, GestureProfile>) -> Self {
        Self { profiles }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn get(&self, label: PoseLabel) -> Option<&GestureProfile> {
        self.profiles.get(&label)
    }

    pub fn get_mut(&mut self, label: PoseLabel) -> Option<&mut GestureProfile> {
        self.profiles.get_mut(&label)
    }

    pub fn insert(&mut self, label: PoseLabel, profile: GestureProfile) {
        self.profiles.insert(label, profile);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PoseLabel, &GestureProfile)> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Distinct sound files referenced by enabled profiles
    pub fn sound_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .profiles
            .values()
            .filter(|p| p.enabled)
            .map(|p| p.sound_file.as_str())
            .collect();
        files.sort_unstable();
        files.dedup();
        files
    }

    /// Load profiles from `path`.
    ///
    /// A missing file is created with the defaults. A file that cannot be
    /// read or parsed logs one warning and yields the defaults without
    /// touching the file.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let defaults = Self::default();
            defaults.save(path)?;
            info!(
                "Created gesture profile file {} with {} defaults",
                path.display(),
                defaults.len()
            );
            return Ok(defaults);
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Self>(&text).map_err(|e| e.to_string()))
            .and_then(|profiles| profiles.validate().map(|()| profiles));

        match parsed {
            Ok(profiles) => {
                debug!(
                    "Loaded {} gesture profiles from {}",
                    profiles.len(),
                    path.display()
                );
                Ok(profiles)
            }
            Err(details) => {
                warn!(
                    "Ignoring malformed gesture profile file {}: {}; using defaults",
                    path.display(),
                    details
                );
                Ok(Self::default())
            }
        }
    }

    /// Check every profile, naming the first offending gesture.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (label, profile) in &self.profiles {
            profile
                .validate()
                .map_err(|e| format!("profile {}: {}", label, e))?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Human readable table, one profile per line.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<14} {:<14} {:<18} {:>8} {:>9} {:>7}",
            "GESTURE", "NAME", "SOUND", "COOLDOWN", "THRESHOLD", "ENABLED"
        );
        for (label, profile) in &self.profiles {
            let _ = writeln!(
                out,
                "{:<14} {:<14} {:<18} {:>7.1}s {:>9.2} {:>7}",
                label.as_str(),
                profile.name,
                profile.sound_file,
                profile.cooldown,
                profile.confidence_threshold,
                if profile.enabled { "yes" } else { "no" }
            );
        }
        out
    }
}

impl Default for GestureProfiles {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            PoseLabel::Peace,
            GestureProfile::new("Victory", "victory.wav", 2.0),
        );
        profiles.insert(
            PoseLabel::MiddleFinger,
            GestureProfile::new("Middle finger", "middle_finger.wav", 3.0),
        );
        profiles.insert(
            PoseLabel::ThumbsUp,
            GestureProfile::new("Thumbs up", "thumbs_up.wav", 2.0),
        );
        profiles.insert(PoseLabel::OkSign, GestureProfile::new("OK", "ok.wav", 2.0));
        profiles.insert(
            PoseLabel::Pointing,
            GestureProfile::new("Pointing", "point.wav", 1.5),
        );
        profiles.insert(PoseLabel::Fist, GestureProfile::new("Fist", "punch.wav", 2.0));
        Self::new(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let profiles = GestureProfiles::default();
        assert_eq!(profiles.len(), 6);
        assert!(profiles.get(PoseLabel::OpenHand).is_none());
        assert!(profiles.get(PoseLabel::Unknown).is_none());

        let middle = profiles.get(PoseLabel::MiddleFinger).unwrap();
        assert_eq!(middle.cooldown, 3.0);
        assert_eq!(middle.confidence_threshold, 0.8);
        assert!(middle.enabled);
        assert_eq!(middle.sound_id(), "middle_finger");
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gesture_config.json");

        let profiles = GestureProfiles::load_or_init(&path).unwrap();
        assert_eq!(profiles, GestureProfiles::default());
        assert!(path.exists());

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"middle_finger\""));
        assert!(text.contains("\"rock\""));
        assert!(text.contains("\"punch.wav\""));
    }

    #[test]
    fn test_malformed_file_falls_back_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gesture_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let profiles = GestureProfiles::load_or_init(&path).unwrap();
        assert_eq!(profiles, GestureProfiles::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_out_of_range_values_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gesture_config.json");
        let huge = r#"{"peace": {"name": "Peace", "sound_file": "victory.wav", "cooldown": 1e20, "confidence_threshold": 0.8}}"#;
        std::fs::write(&path, huge).unwrap();

        let profiles = GestureProfiles::load_or_init(&path).unwrap();
        assert_eq!(profiles, GestureProfiles::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), huge);

        std::fs::write(
            &path,
            r#"{"fist": {"name": "Fist", "sound_file": "punch.wav", "cooldown": 1.0, "confidence_threshold": 1.5}}"#,
        )
        .unwrap();
        assert_eq!(
            GestureProfiles::load_or_init(&path).unwrap(),
            GestureProfiles::default()
        );
    }

    #[test]
    fn test_profile_validation() {
        let mut profile = GestureProfile::new("Peace", "victory.wav", 2.0);
        assert!(profile.validate().is_ok());
        assert_eq!(profile.cooldown_duration(), Duration::from_secs(2));

        profile.cooldown = -1.0;
        assert!(profile.validate().is_err());
        assert_eq!(profile.cooldown_duration(), Duration::ZERO);

        profile.cooldown = 1e20;
        assert!(profile.validate().unwrap_err().contains("out of range"));
        assert_eq!(profile.cooldown_duration(), Duration::MAX);

        profile.cooldown = f64::NAN;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_load_existing_file_with_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gesture_config.json");
        std::fs::write(
            &path,
            r#"{
                "rock": {"name": "Rock", "sound_file": "rock.mp3", "cooldown": 1.0, "confidence_threshold": 0.5},
                "peace": {"name": "Peace", "sound_file": "peace.ogg", "cooldown": 4.0, "confidence_threshold": 0.95, "enabled": false}
            }"#,
        )
        .unwrap();

        let profiles = GestureProfiles::load_or_init(&path).unwrap();
        assert_eq!(profiles.len(), 2);

        let fist = profiles.get(PoseLabel::Fist).unwrap();
        assert_eq!(fist.sound_id(), "rock");
        assert!(fist.enabled);

        let peace = profiles.get(PoseLabel::Peace).unwrap();
        assert!(!peace.enabled);
        assert_eq!(profiles.sound_files(), vec!["rock.mp3"]);
    }

    #[test]
    fn test_render_table_lists_every_profile() {
        let table = GestureProfiles::default().render_table();
        assert_eq!(table.lines().count(), 7);
        assert!(table.contains("thumbs_up"));
        assert!(table.contains("point.wav"));
    }
}
