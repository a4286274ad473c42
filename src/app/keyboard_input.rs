use super::types::ControlCommand;
use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Source of operator commands, polled once per frame.
pub trait ControlInput {
    /// Next pending command, without blocking.
    fn poll(&mut self) -> Option<ControlCommand>;
}

/// No operator input; used when keyboard controls are off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControls;

impl ControlInput for NoControls {
    fn poll(&mut self) -> Option<ControlCommand> {
        None
    }
}

/// Map a key press to a session command.
pub fn command_for(key: &KeyEvent) -> Option<ControlCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ControlCommand::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(ControlCommand::Quit),
        KeyCode::Char('s') => Some(ControlCommand::ToggleSound),
        KeyCode::Char('r') => Some(ControlCommand::Reset),
        KeyCode::Char('c') => Some(ControlCommand::ClearTrail),
        KeyCode::Char('g') => Some(ControlCommand::PrintGestures),
        KeyCode::Char('k') => Some(ControlCommand::Calibrate),
        _ => None,
    }
}

/// Terminal keyboard controls. Raw mode is on while this value lives.
pub struct KeyboardControls {
    _private: (),
}

impl KeyboardControls {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        info!(
            "Keyboard controls active: q quit, s sound, r reset, c clear, g gestures, k calibrate"
        );
        Ok(Self { _private: () })
    }
}

impl ControlInput for KeyboardControls {
    fn poll(&mut self) -> Option<ControlCommand> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if let Some(command) = command_for(&key) {
                            debug!("Key {:?} -> {:?}", key.code, command);
                            return Some(command);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Error reading keyboard event: {}", e);
                        return None;
                    }
                },
                Ok(false) => return None,
                Err(e) => {
                    warn!("Error polling for keyboard events: {}", e);
                    return None;
                }
            }
        }
    }
}

impl Drop for KeyboardControls {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        } else {
            debug!("Raw mode disabled");
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::VecDeque;

    /// Replays commands, one per poll; `None` entries are idle frames.
    #[derive(Debug, Default)]
    pub struct ScriptedControls {
        pub commands: VecDeque<Option<ControlCommand>>,
    }

    impl ScriptedControls {
        pub fn new(commands: Vec<Option<ControlCommand>>) -> Self {
            Self {
                commands: commands.into(),
            }
        }
    }

    impl ControlInput for ScriptedControls {
        fn poll(&mut self) -> Option<ControlCommand> {
            self.commands.pop_front().flatten()
        }
    }
}
