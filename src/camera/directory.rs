use super::FrameSource;
use crate::error::{CameraError, Result};
use crate::frame::Frame;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Replays a directory of still images in file-name order.
pub struct ImageDirectorySource {
    directory: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    frame_counter: u64,
    open: bool,
}

impl ImageDirectorySource {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            files: Vec::new(),
            next: 0,
            frame_counter: 0,
            open: false,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl FrameSource for ImageDirectorySource {
    fn open(&mut self) -> Result<()> {
        let device_open = |details: String| CameraError::DeviceOpen {
            device: self.directory.display().to_string(),
            details,
        };

        let entries = std::fs::read_dir(&self.directory).map_err(|e| device_open(e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| device_open(e.to_string()))?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        debug!(
            "Found {} images in {}",
            files.len(),
            self.directory.display()
        );
        self.files = files;
        self.next = 0;
        self.open = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if !self.open {
            return Err(CameraError::NotOpen.into());
        }

        let path = match self.files.get(self.next) {
            Some(path) => path.clone(),
            None => return Ok(None),
        };
        self.next += 1;

        let image = image::open(&path)
            .map_err(|e| CameraError::Capture {
                details: format!("{}: {}", path.display(), e),
            })?
            .to_rgb8();

        let (width, height) = image.dimensions();
        let frame = Frame::new(
            self.frame_counter,
            SystemTime::now(),
            image.into_raw(),
            width,
            height,
        );
        self.frame_counter += 1;

        trace!("Loaded frame {} from {}", frame.id, path.display());
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.open = false;
    }

    fn describe(&self) -> String {
        format!("image directory {}", self.directory.display())
    }
}
