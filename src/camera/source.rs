use crate::error::Result;
use crate::frame::Frame;
use std::ops::{Deref, DerefMut};
use tracing::{debug, info};

/// Anything that produces RGB frames one at a time.
pub trait FrameSource {
    /// Acquire the underlying device or stream.
    fn open(&mut self) -> Result<()>;

    /// Next frame, `Ok(None)` when the stream has ended.
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the device. Must be safe to call more than once.
    fn release(&mut self);

    fn describe(&self) -> String;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// An opened frame source that is released when the guard goes out of
/// scope, whether the session ends normally, with an error, or by panic.
pub struct CameraGuard<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: FrameSource + ?Sized> CameraGuard<'a, S> {
    /// Open `source`. On failure the source is released before returning.
    pub fn acquire(source: &'a mut S) -> Result<Self> {
        let name = source.describe();
        if let Err(e) = source.open() {
            source.release();
            return Err(e);
        }
        info!("Opened {}", name);
        Ok(Self { source })
    }
}

impl<S: FrameSource + ?Sized> Deref for CameraGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: FrameSource + ?Sized> DerefMut for CameraGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: FrameSource + ?Sized> Drop for CameraGuard<'_, S> {
    fn drop(&mut self) {
        debug!("Releasing {}", self.source.describe());
        self.source.release();
    }
}
