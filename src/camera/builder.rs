use super::FrameSource;
use crate::config::CameraConfig;
use crate::error::{GesturecamError, Result};
use tracing::debug;

/// Picks the frame source for a camera configuration.
///
/// A configured `frames_dir` replays images; otherwise the V4L2 camera is
/// used. The returned source is not opened yet.
pub struct FrameSourceBuilder {
    config: Option<CameraConfig>,
}

impl FrameSourceBuilder {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Box<dyn FrameSource + Send>> {
        let config = self
            .config
            .ok_or_else(|| GesturecamError::system("Camera configuration must be specified"))?;

        if let Some(dir) = config.frames_dir.as_deref() {
            debug!("Using image directory {} as frame source", dir);
            return Self::directory_source(dir);
        }

        Self::camera_source(config)
    }

    #[cfg(feature = "skin_detection")]
    fn directory_source(dir: &str) -> Result<Box<dyn FrameSource + Send>> {
        Ok(Box::new(super::ImageDirectorySource::new(dir)))
    }

    #[cfg(not(feature = "skin_detection"))]
    fn directory_source(_dir: &str) -> Result<Box<dyn FrameSource + Send>> {
        Err(crate::error::CameraError::Configuration {
            details: "Image replay requires the skin_detection feature".to_string(),
        }
        .into())
    }

    #[cfg(all(feature = "camera", target_os = "linux"))]
    fn camera_source(config: CameraConfig) -> Result<Box<dyn FrameSource + Send>> {
        Ok(Box::new(super::V4l2Camera::new(config)))
    }

    #[cfg(not(all(feature = "camera", target_os = "linux")))]
    fn camera_source(config: CameraConfig) -> Result<Box<dyn FrameSource + Send>> {
        Err(crate::error::CameraError::Configuration {
            details: format!(
                "No camera support for device {} in this build; enable the camera feature or set camera.frames_dir",
                config.index
            ),
        }
        .into())
    }
}

impl Default for FrameSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
