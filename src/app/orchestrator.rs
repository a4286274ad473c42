use super::keyboard_input::{ControlInput, KeyboardControls, NoControls};
use super::runtime::run_blocking_session;
use super::session_loop::{run_pose_loop, run_trail_loop};
use super::types::{LoopOptions, SessionOutcome};
use crate::camera::FrameSourceBuilder;
use crate::config::GesturecamConfig;
use crate::dispatch::GestureDispatcher;
use crate::error::Result;
use crate::playback::{CommandPlayback, PlaybackSink, SilentPlayback};
use crate::pose::PoseClassifier;
use crate::profiles::GestureProfiles;
use crate::provider::LandmarkReplay;
use crate::session::{PoseSession, TrailSession};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Builds the collaborators for a session and runs it to completion.
#[derive(Debug, Clone)]
pub struct GestureApp {
    config: GesturecamConfig,
    options: LoopOptions,
    keyboard: bool,
}

impl GestureApp {
    pub fn new(config: GesturecamConfig) -> Self {
        Self {
            config,
            options: LoopOptions::default(),
            keyboard: false,
        }
    }

    pub fn with_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable terminal keyboard controls
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard = enabled;
    }

    pub fn config(&self) -> &GesturecamConfig {
        &self.config
    }

    /// Track a hand with the skin detector and classify its trail.
    pub async fn run_trail(self) -> Result<SessionOutcome> {
        run_blocking_session(move |token| self.trail_session(&token)).await
    }

    /// Classify hand poses from recorded landmark model output.
    pub async fn run_pose(self, landmarks: PathBuf) -> Result<SessionOutcome> {
        run_blocking_session(move |token| self.pose_session(&landmarks, &token)).await
    }

    #[cfg(feature = "skin_detection")]
    fn trail_session(&self, token: &CancellationToken) -> Result<SessionOutcome> {
        use crate::detector::SkinDetector;

        let span = info_span!("session", id = %Uuid::new_v4(), mode = "trail");
        let _enter = span.enter();

        let mut source = FrameSourceBuilder::new()
            .config(self.config.camera.clone())
            .build()?;
        let mut detector =
            SkinDetector::new(self.config.skin.clone(), self.config.tracker.min_area);
        let mut session = TrailSession::new(&self.config.tracker, self.config.shape.clone());
        let mut controls = self.controls()?;

        info!("Trail session starting on {}", source.describe());
        run_trail_loop(
            source.as_mut(),
            &self.config.camera,
            &mut detector,
            &mut session,
            controls.as_mut(),
            &self.options,
            token,
        )
    }

    #[cfg(not(feature = "skin_detection"))]
    fn trail_session(&self, _token: &CancellationToken) -> Result<SessionOutcome> {
        Err(crate::error::GesturecamError::system(
            "Trail mode requires the skin_detection feature",
        ))
    }

    fn pose_session(
        &self,
        landmarks: &Path,
        token: &CancellationToken,
    ) -> Result<SessionOutcome> {
        let span = info_span!("session", id = %Uuid::new_v4(), mode = "pose");
        let _enter = span.enter();

        let profiles = GestureProfiles::load_or_init(&self.config.gestures.profiles_path)?;
        let mut sink = self.playback(&profiles);
        let dispatcher = GestureDispatcher::new(
            profiles,
            self.config.sound.volume,
            self.config.sound.enabled,
        );
        let classifier = PoseClassifier::new(self.config.pose.clone());
        let mut session = PoseSession::new(classifier, dispatcher);
        let mut provider = LandmarkReplay::open(landmarks)?;
        let mut controls = self.controls()?;

        run_pose_loop(
            &mut provider,
            &mut session,
            sink.as_mut(),
            controls.as_mut(),
            &self.options,
            token,
        )
    }

    /// Command player whenever the sound library loads, so sound can be
    /// toggled on mid-session. Silent only when the library is unavailable.
    fn playback(&self, profiles: &GestureProfiles) -> Box<dyn PlaybackSink> {
        if !self.config.sound.enabled {
            info!("Sound output starts disabled");
        }
        match CommandPlayback::from_config(&self.config.sound) {
            Ok(player) => {
                player.library().report_missing(profiles.sound_files());
                Box::new(player)
            }
            Err(e) => {
                warn!("Sound library unavailable, continuing without sound: {}", e);
                Box::new(SilentPlayback)
            }
        }
    }

    fn controls(&self) -> Result<Box<dyn ControlInput>> {
        if self.keyboard {
            Ok(Box::new(KeyboardControls::new()?))
        } else {
            Ok(Box::new(NoControls))
        }
    }
}
