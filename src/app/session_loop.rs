use super::keyboard_input::ControlInput;
use super::types::{ControlCommand, LoopOptions, SessionOutcome, ShutdownReason};
use crate::camera::{CameraGuard, FrameSource};
use crate::config::CameraConfig;
use crate::detector::HandDetector;
use crate::error::Result;
use crate::events::{SessionEvent, SessionStats};
use crate::playback::PlaybackSink;
use crate::provider::LandmarkProvider;
use crate::session::{PoseSession, TrailSession};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Synchronous trail-tracking loop: read, orient, detect, classify, poll.
///
/// The source is opened here and released on every exit path. Camera
/// faults end the session with an error.
pub fn run_trail_loop(
    source: &mut dyn FrameSource,
    camera: &CameraConfig,
    detector: &mut dyn HandDetector,
    session: &mut TrailSession,
    controls: &mut dyn ControlInput,
    options: &LoopOptions,
    cancel: &CancellationToken,
) -> Result<SessionOutcome> {
    let mut stats = SessionStats::new();

    let mut guard = CameraGuard::acquire(source).map_err(|e| {
        error!("Failed to open frame source: {}", e);
        e
    })?;

    let started = Instant::now();

    let reason = loop {
        if let Some(reason) = should_stop(&stats, options, cancel) {
            break reason;
        }

        let frame = match guard.read_frame() {
            Ok(Some(frame)) => frame.oriented(camera.rotation, camera.mirror),
            Ok(None) => break ShutdownReason::EndOfStream,
            Err(e) => {
                error!("Frame read failed: {}", e);
                stats.log_summary();
                return Err(e);
            }
        };

        let at = started.elapsed();
        let detection = detector.detect(&frame)?;
        stats.record_frame(detection.is_some());

        let events = session.process_detection(detection.as_ref(), at);
        if let Some(velocity) = session.velocity().current() {
            stats.record_velocity(velocity);
        }
        report(&mut stats, &events);

        if let Some(command) = controls.poll() {
            match command {
                ControlCommand::Quit => break ShutdownReason::UserRequest,
                ControlCommand::Reset => {
                    session.reset();
                    detector.reset();
                    report(&mut stats, &[SessionEvent::TrackingReset]);
                }
                ControlCommand::ClearTrail => {
                    session.clear_trail();
                    report(&mut stats, &[SessionEvent::TrailCleared]);
                }
                ControlCommand::Calibrate => match detector.calibrate(&frame) {
                    Some((lower, upper)) => {
                        report(&mut stats, &[SessionEvent::SkinCalibrated { lower, upper }])
                    }
                    None => warn!("Calibration not available for this detector"),
                },
                ControlCommand::ToggleSound | ControlCommand::PrintGestures => {
                    debug!("{:?} has no effect in trail mode", command);
                }
            }
        }
    };

    drop(guard);
    finish(reason, stats)
}

/// Synchronous pose loop driven by a landmark provider.
pub fn run_pose_loop(
    provider: &mut dyn LandmarkProvider,
    session: &mut PoseSession,
    sink: &mut dyn PlaybackSink,
    controls: &mut dyn ControlInput,
    options: &LoopOptions,
    cancel: &CancellationToken,
) -> Result<SessionOutcome> {
    let mut stats = SessionStats::new();
    let started = Instant::now();
    info!("Reading hands from {}", provider.describe());

    let reason = loop {
        if let Some(reason) = should_stop(&stats, options, cancel) {
            break reason;
        }

        let hands = match provider.next_hands() {
            Ok(Some(hands)) => hands,
            Ok(None) => break ShutdownReason::EndOfStream,
            Err(e) => {
                error!("Landmark stream failed: {}", e);
                stats.log_summary();
                return Err(e);
            }
        };

        stats.record_frame(!hands.is_empty());
        let events = session.process_hands(&hands, started.elapsed(), sink);
        report(&mut stats, &events);

        if let Some(command) = controls.poll() {
            match command {
                ControlCommand::Quit => break ShutdownReason::UserRequest,
                ControlCommand::ToggleSound => {
                    let enabled = session.dispatcher_mut().toggle_sound();
                    report(&mut stats, &[SessionEvent::SoundToggled { enabled }]);
                }
                ControlCommand::Reset => {
                    session.reset();
                    report(&mut stats, &[SessionEvent::TrackingReset]);
                }
                ControlCommand::PrintGestures => {
                    print_raw(&session.dispatcher().profiles().render_table());
                }
                ControlCommand::ClearTrail | ControlCommand::Calibrate => {
                    debug!("{:?} has no effect in pose mode", command);
                }
            }
        }
    };

    finish(reason, stats)
}

fn should_stop(
    stats: &SessionStats,
    options: &LoopOptions,
    cancel: &CancellationToken,
) -> Option<ShutdownReason> {
    if cancel.is_cancelled() {
        return Some(ShutdownReason::Signal);
    }
    match options.max_frames {
        Some(max) if stats.frames_processed >= max => Some(ShutdownReason::FrameLimit),
        _ => None,
    }
}

fn report(stats: &mut SessionStats, events: &[SessionEvent]) {
    for event in events {
        stats.record_event(event);
        match event {
            SessionEvent::GestureFired { .. }
            | SessionEvent::SoundToggled { .. }
            | SessionEvent::TrackingReset
            | SessionEvent::TrailCleared
            | SessionEvent::SkinCalibrated { .. } => info!("{}", event.description()),
            _ => debug!("{}", event.description()),
        }
    }
}

fn finish(reason: ShutdownReason, stats: SessionStats) -> Result<SessionOutcome> {
    info!("Session ended: {:?}", reason);
    stats.log_summary();
    Ok(SessionOutcome { reason, stats })
}

/// Print with CRLF line endings so output stays aligned in raw mode.
fn print_raw(text: &str) {
    for line in text.lines() {
        print!("{}\r\n", line);
    }
}
