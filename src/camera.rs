use opencv::{core::Mat, prelude::*, videoio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    OpenCameraFailed(opencv::Error),
    #[error("Failed to read frame: {0}")]
    ReadFrameFailed(opencv::Error),
}

/// Source of frames for the capture loop.
pub trait FrameSource {
    /// Returns the next frame, or `None` once the stream is exhausted.
    /// Exhaustion is the normal end-of-stream signal, not an error.
    fn next_frame(&mut self) -> Result<Option<Mat>, CameraError>;
}

/// Webcam frame source backed by an OpenCV `VideoCapture`.
///
/// The capture device is released when the camera is dropped.
pub struct Camera {
    capture: videoio::VideoCapture,
}

impl Camera {
    pub fn new(device_index: i32) -> Result<Self, CameraError> {
        let capture = videoio::VideoCapture::new(device_index, videoio::CAP_ANY)
            .map_err(CameraError::OpenCameraFailed)?;
        Ok(Self { capture })
    }
}

impl FrameSource for Camera {
    fn next_frame(&mut self) -> Result<Option<Mat>, CameraError> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .map_err(CameraError::ReadFrameFailed)?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}
