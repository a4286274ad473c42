use super::FrameSource;
use crate::error::{CameraError, Result};
use crate::frame::Frame;
use std::collections::VecDeque;
use std::time::SystemTime;

/// One scripted answer from `read_frame`.
pub enum Step {
    Frame(Frame),
    Fail,
}

/// In-memory frame source that counts opens and releases.
#[derive(Default)]
pub struct ScriptedSource {
    pub steps: VecDeque<Step>,
    pub fail_open: bool,
    pub opens: usize,
    pub releases: usize,
    pub reads: usize,
}

impl ScriptedSource {
    pub fn with_frames(frames: Vec<Frame>) -> Self {
        Self {
            steps: frames.into_iter().map(Step::Frame).collect(),
            ..Default::default()
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Default::default()
        }
    }
}

/// Solid-color frame of the given size.
pub fn solid_frame(id: u64, width: u32, height: u32, rgb: [u8; 3]) -> Frame {
    let data = rgb
        .iter()
        .copied()
        .cycle()
        .take((width * height * 3) as usize)
        .collect();
    Frame::new(id, SystemTime::now(), data, width, height)
}

impl FrameSource for ScriptedSource {
    fn open(&mut self) -> Result<()> {
        self.opens += 1;
        if self.fail_open {
            return Err(CameraError::DeviceOpen {
                device: "scripted".to_string(),
                details: "no such device".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        self.reads += 1;
        match self.steps.pop_front() {
            Some(Step::Frame(frame)) => Ok(Some(frame)),
            Some(Step::Fail) => Err(CameraError::Capture {
                details: "scripted read failure".to_string(),
            }
            .into()),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        self.releases += 1;
    }

    fn describe(&self) -> String {
        "scripted source".to_string()
    }
}
