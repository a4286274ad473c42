use crate::frame::Rotation;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GesturecamConfig {
    pub camera: CameraConfig,
    pub tracker: TrackerConfig,
    pub skin: SkinConfig,
    pub shape: ShapeConfig,
    pub pose: PoseConfig,
    pub sound: SoundConfig,
    pub gestures: GesturesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for /dev/video0)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Camera resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Frames per second
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Rotation applied to every frame before detection
    pub rotation: Option<Rotation>,

    /// Mirror frames horizontally (after rotation)
    #[serde(default)]
    pub mirror: bool,

    /// Replay frames from this image directory instead of a device
    pub frames_dir: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Number of centroid positions kept in the display trail
    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,

    /// Number of velocity samples kept for statistics
    #[serde(default = "default_velocity_history")]
    pub velocity_history: usize,

    /// Minimum skin region area (pixels) accepted as a hand
    #[serde(default = "default_min_area")]
    pub min_area: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SkinConfig {
    /// Lower HSV bound (H on the 0..180 scale)
    #[serde(default = "default_skin_lower")]
    pub lower: [u8; 3],

    /// Upper HSV bound (H on the 0..180 scale)
    #[serde(default = "default_skin_upper")]
    pub upper: [u8; 3],

    /// Hue margin applied around a calibration sample
    #[serde(default = "default_calibration_margin")]
    pub calibration_margin: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ShapeConfig {
    /// Points required before a trail shape is classified
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Bounding box extent below which the hand counts as stationary
    #[serde(default = "default_still_extent")]
    pub still_extent: f64,

    /// Aspect ratio beyond which the trail counts as a line
    #[serde(default = "default_line_ratio")]
    pub line_ratio: f64,

    /// Maximum |width - height| for a circle candidate
    #[serde(default = "default_circle_tolerance")]
    pub circle_tolerance: f64,

    /// Maximum mean radial deviation, as a fraction of the radius
    #[serde(default = "default_circle_deviation_ratio")]
    pub circle_deviation_ratio: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PoseConfig {
    /// Thumb tip to index tip distance (normalized) that counts as a pinch
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f64,

    /// Confidence reported for every matched pose
    #[serde(default = "default_match_confidence")]
    pub match_confidence: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SoundConfig {
    /// Play sounds for recognized gestures
    #[serde(default = "default_sound_enabled")]
    pub enabled: bool,

    /// Directory scanned for sound files
    #[serde(default = "default_sound_directory")]
    pub directory: String,

    /// Playback volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// External player invoked for each sound
    #[serde(default = "default_player_command")]
    pub player_command: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GesturesConfig {
    /// JSON file holding per-gesture profiles
    #[serde(default = "default_profiles_path")]
    pub profiles_path: String,
}

impl GesturecamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("gesturecam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("camera.index", default_camera_index())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default("camera.mirror", false)?
            .set_default("tracker.trail_capacity", default_trail_capacity() as i64)?
            .set_default(
                "tracker.velocity_history",
                default_velocity_history() as i64,
            )?
            .set_default("tracker.min_area", default_min_area())?
            .set_default("skin.lower", hsv_default(default_skin_lower()))?
            .set_default("skin.upper", hsv_default(default_skin_upper()))?
            .set_default(
                "skin.calibration_margin",
                default_calibration_margin() as i64,
            )?
            .set_default("shape.min_samples", default_min_samples() as i64)?
            .set_default("shape.still_extent", default_still_extent())?
            .set_default("shape.line_ratio", default_line_ratio())?
            .set_default("shape.circle_tolerance", default_circle_tolerance())?
            .set_default(
                "shape.circle_deviation_ratio",
                default_circle_deviation_ratio(),
            )?
            .set_default("pose.pinch_threshold", default_pinch_threshold())?
            .set_default("pose.match_confidence", default_match_confidence())?
            .set_default("sound.enabled", default_sound_enabled())?
            .set_default("sound.directory", default_sound_directory())?
            .set_default("sound.volume", default_volume())?
            .set_default("sound.player_command", default_player_command())?
            .set_default("gestures.profiles_path", default_profiles_path())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with GESTURECAM_ prefix
            .add_source(
                Environment::with_prefix("GESTURECAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: GesturecamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate camera settings
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        // Validate tracker settings
        if self.tracker.trail_capacity == 0 {
            return Err(ConfigError::Message(
                "Trail capacity must be greater than 0".to_string(),
            ));
        }

        if self.tracker.velocity_history == 0 {
            return Err(ConfigError::Message(
                "Velocity history must be greater than 0".to_string(),
            ));
        }

        for channel in 0..3 {
            if self.skin.lower[channel] > self.skin.upper[channel] {
                return Err(ConfigError::Message(format!(
                    "Skin lower bound exceeds upper bound in HSV channel {}",
                    channel
                )));
            }
        }

        // Validate classifier thresholds
        if self.shape.min_samples == 0 {
            return Err(ConfigError::Message(
                "Shape min_samples must be greater than 0".to_string(),
            ));
        }

        if self.shape.line_ratio <= 0.0 || self.shape.circle_deviation_ratio <= 0.0 {
            return Err(ConfigError::Message(
                "Shape ratios must be positive".to_string(),
            ));
        }

        if self.pose.pinch_threshold <= 0.0 {
            return Err(ConfigError::Message(
                "Pinch threshold must be positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.pose.match_confidence) {
            return Err(ConfigError::Message(
                "Match confidence must be within 0.0 - 1.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.sound.volume) {
            return Err(ConfigError::Message(
                "Sound volume must be within 0.0 - 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML, used by `--print-config`
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for GesturecamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            tracker: TrackerConfig::default(),
            skin: SkinConfig::default(),
            shape: ShapeConfig::default(),
            pose: PoseConfig::default(),
            sound: SoundConfig::default(),
            gestures: GesturesConfig {
                profiles_path: default_profiles_path(),
            },
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: default_camera_index(),
            resolution: default_camera_resolution(),
            fps: default_camera_fps(),
            rotation: None,
            mirror: false,
            frames_dir: None,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            trail_capacity: default_trail_capacity(),
            velocity_history: default_velocity_history(),
            min_area: default_min_area(),
        }
    }
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            lower: default_skin_lower(),
            upper: default_skin_upper(),
            calibration_margin: default_calibration_margin(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_sound_enabled(),
            directory: default_sound_directory(),
            volume: default_volume(),
            player_command: default_player_command(),
        }
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            still_extent: default_still_extent(),
            line_ratio: default_line_ratio(),
            circle_tolerance: default_circle_tolerance(),
            circle_deviation_ratio: default_circle_deviation_ratio(),
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: default_pinch_threshold(),
            match_confidence: default_match_confidence(),
        }
    }
}

fn hsv_default(hsv: [u8; 3]) -> Vec<i64> {
    hsv.iter().map(|&v| v as i64).collect()
}

// Default value functions
fn default_camera_index() -> u32 {
    0
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_camera_fps() -> u32 {
    30
}

fn default_trail_capacity() -> usize {
    50
}
fn default_velocity_history() -> usize {
    10
}
fn default_min_area() -> f64 {
    2000.0
}

fn default_skin_lower() -> [u8; 3] {
    [0, 20, 70]
}
fn default_skin_upper() -> [u8; 3] {
    [20, 255, 255]
}
fn default_calibration_margin() -> u8 {
    15
}

fn default_min_samples() -> usize {
    30
}
fn default_still_extent() -> f64 {
    50.0
}
fn default_line_ratio() -> f64 {
    2.0
}
fn default_circle_tolerance() -> f64 {
    30.0
}
fn default_circle_deviation_ratio() -> f64 {
    0.3
}

fn default_pinch_threshold() -> f64 {
    0.05
}
fn default_match_confidence() -> f64 {
    0.9
}

fn default_sound_enabled() -> bool {
    true
}
fn default_sound_directory() -> String {
    "sounds".to_string()
}
fn default_volume() -> f64 {
    0.7
}
fn default_player_command() -> String {
    "paplay".to_string()
}

fn default_profiles_path() -> String {
    "gesture_config.json".to_string()
}
