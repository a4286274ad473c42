use super::FrameSource;
use crate::config::CameraConfig;
use crate::error::{CameraError, Result};
use crate::frame::Frame;
use gstreamer::prelude::*;
use gstreamer::Pipeline;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

/// How long a read may block before the camera counts as stalled
const READ_TIMEOUT_SECONDS: u64 = 5;

/// V4L2 webcam read through a GStreamer pipeline that converts to RGB.
pub struct V4l2Camera {
    config: CameraConfig,
    pipeline: Option<Pipeline>,
    appsink: Option<AppSink>,
    frame_counter: u64,
}

impl V4l2Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            pipeline: None,
            appsink: None,
            frame_counter: 0,
        }
    }

    fn device(&self) -> String {
        format!("/dev/video{}", self.config.index)
    }

    fn build_pipeline_string(&self) -> String {
        let (width, height) = self.config.resolution;
        format!(
            "v4l2src device={} ! videoconvert ! videoscale ! \
             video/x-raw,format=RGB,width={},height={},framerate={}/1 ! \
             appsink name=sink sync=false max-buffers=2 drop=true",
            self.device(),
            width,
            height,
            self.config.fps
        )
    }

    fn sample_to_frame(&mut self, sample: gstreamer::Sample) -> Result<Frame> {
        let capture = |details: String| CameraError::Capture { details };

        let buffer = sample
            .buffer()
            .ok_or_else(|| capture("No buffer in sample".to_string()))?;
        let caps = sample
            .caps()
            .ok_or_else(|| capture("No caps in sample".to_string()))?;
        let info = VideoInfo::from_caps(caps)
            .map_err(|e| capture(format!("Failed to get video info: {}", e)))?;
        let map = buffer
            .map_readable()
            .map_err(|e| capture(format!("Failed to map buffer: {}", e)))?;

        let (width, height) = (info.width(), info.height());
        let stride = info.stride()[0] as usize;
        let row_bytes = width as usize * Frame::BYTES_PER_PIXEL;
        let data = map.as_slice();

        // Rows may be padded; copy only the pixel bytes
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            let line = data
                .get(start..start + row_bytes)
                .ok_or_else(|| capture(format!("Buffer too short for row {}", row)))?;
            pixels.extend_from_slice(line);
        }

        let frame = Frame::new(self.frame_counter, SystemTime::now(), pixels, width, height);
        self.frame_counter += 1;
        trace!("Captured frame {} ({}x{})", frame.id, width, height);
        Ok(frame)
    }
}

impl FrameSource for V4l2Camera {
    fn open(&mut self) -> Result<()> {
        let device = self.device();
        let device_open = |details: String| CameraError::DeviceOpen {
            device: device.clone(),
            details,
        };

        gstreamer::init().map_err(|e| device_open(format!("GStreamer init failed: {}", e)))?;

        let description = self.build_pipeline_string();
        info!("Creating GStreamer pipeline: {}", description);

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| device_open(format!("Failed to create pipeline: {}", e)))?
            .downcast::<Pipeline>()
            .map_err(|_| device_open("Failed to downcast to Pipeline".to_string()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| device_open("Pipeline has no appsink".to_string()))?
            .downcast::<AppSink>()
            .map_err(|_| device_open("Failed to downcast to AppSink".to_string()))?;

        // Keep the pipeline so release() can stop it even if start fails
        self.pipeline = Some(pipeline.clone());
        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| device_open(format!("Failed to start pipeline: {}", e)))?;

        self.appsink = Some(appsink);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let appsink = self.appsink.clone().ok_or(CameraError::NotOpen)?;

        match appsink.try_pull_sample(gstreamer::ClockTime::from_seconds(READ_TIMEOUT_SECONDS)) {
            Some(sample) => self.sample_to_frame(sample).map(Some),
            None if appsink.is_eos() => {
                debug!("Camera stream reached end of stream");
                Ok(None)
            }
            None => Err(CameraError::Capture {
                details: format!("No frame within {}s", READ_TIMEOUT_SECONDS),
            }
            .into()),
        }
    }

    fn release(&mut self) {
        self.appsink = None;
        if let Some(pipeline) = self.pipeline.take() {
            if let Err(e) = pipeline.set_state(gstreamer::State::Null) {
                warn!("Failed to stop camera pipeline: {}", e);
            } else {
                info!("Camera {} released", self.device());
            }
        }
    }

    fn describe(&self) -> String {
        let (width, height) = self.config.resolution;
        format!(
            "camera {} ({}x{} @ {}fps)",
            self.device(),
            width,
            height,
            self.config.fps
        )
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        self.release();
    }
}
