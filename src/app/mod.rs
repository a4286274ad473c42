pub mod keyboard_input;

mod orchestrator;
mod runtime;
mod session_loop;
mod types;


pub use orchestrator::GestureApp;
pub use runtime::run_blocking_session;
pub use session_loop::{run_pose_loop, run_trail_loop};
pub use types::{ControlCommand, LoopOptions, SessionOutcome, ShutdownReason};
