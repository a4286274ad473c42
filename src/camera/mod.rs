mod builder;
#[cfg(feature = "skin_detection")]
mod directory;
#[cfg(test)]
pub(crate) mod mock;
mod source;
#[cfg(all(feature = "camera", target_os = "linux"))]
mod v4l2;
#[cfg(test)]
mod tests;

pub use builder::FrameSourceBuilder;
#[cfg(feature = "skin_detection")]
pub use directory::ImageDirectorySource;
pub use source::{CameraGuard, FrameSource};
#[cfg(all(feature = "camera", target_os = "linux"))]
pub use v4l2::V4l2Camera;
