use crate::events::SessionStats;

/// Why a session loop stopped
#[derive(Debug, Clone, PartialEq)]
pub enum ShutdownReason {
    /// SIGINT or SIGTERM cancelled the session
    Signal,
    /// Quit key pressed
    UserRequest,
    /// The frame or landmark stream ran out
    EndOfStream,
    /// `--max-frames` reached
    FrameLimit,
}

/// Result of a session that ended without a fault.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub reason: ShutdownReason,
    pub stats: SessionStats,
}

/// Session control requests from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Quit,
    ToggleSound,
    /// Reset all tracking state and calibration
    Reset,
    /// Clear the trail and gesture buffer only
    ClearTrail,
    PrintGestures,
    /// Sample skin color from the frame center
    Calibrate,
}

/// Per-run loop settings that do not belong in the config file.
#[derive(Debug, Clone, Default)]
pub struct LoopOptions {
    /// Stop after this many processed frames
    pub max_frames: Option<u64>,
}
