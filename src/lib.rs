pub mod app;
pub mod camera;
pub mod config;
pub mod detector;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod landmarks;
pub mod playback;
pub mod pose;
pub mod profiles;
pub mod provider;
pub mod session;
pub mod shape;
pub mod trail;

pub use app::{GestureApp, LoopOptions, SessionOutcome, ShutdownReason};
pub use camera::{CameraGuard, FrameSource, FrameSourceBuilder};
pub use config::GesturecamConfig;
pub use detector::{Detection, HandDetector};
pub use dispatch::{DispatchOutcome, GestureDispatcher, IgnoreReason};
pub use error::{GesturecamError, Result};
pub use events::{SessionEvent, SessionStats};
pub use frame::{Frame, Rotation};
pub use geometry::{BoundingBox, Point};
pub use landmarks::{Finger, FingerState, Landmark, LandmarkSet};
pub use playback::{CommandPlayback, PlaybackSink, SilentPlayback, SoundLibrary};
pub use pose::{Classification, PoseClassifier, PoseLabel};
pub use profiles::{GestureProfile, GestureProfiles};
pub use provider::{LandmarkProvider, LandmarkReplay};
pub use session::{PoseSession, TrailSession};
pub use shape::{ShapeClassifier, TrailShape};
pub use trail::{Trail, VelocityTracker};

#[cfg(feature = "skin_detection")]
pub use detector::SkinDetector;
