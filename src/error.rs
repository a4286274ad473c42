use thiserror::Error;

#[derive(Error, Debug)]
pub enum GesturecamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Landmark error: {0}")]
    Landmarks(#[from] LandmarkError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Detection error: {details}")]
    Detection { details: String },

    #[error("System error: {message}")]
    System { message: String },
}

/// Failures of the frame source. All of them end the session.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera device {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Failed to read frame: {details}")]
    Capture { details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },

    #[error("Camera is not open")]
    NotOpen,
}

#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Expected {expected} landmarks, got {actual}")]
    Count { expected: usize, actual: usize },

    #[error("Malformed landmark record on line {line}: {details}")]
    Malformed { line: usize, details: String },
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Sound not found: {0}")]
    MissingSound(String),

    #[error("Failed to start player '{command}': {details}")]
    Player { command: String, details: String },

    #[error("No sound output available")]
    NoOutput,
}

impl GesturecamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GesturecamError>;
