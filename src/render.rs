use crate::bounding_box::BoundingBoxWithLabels;
use crate::config::DisplayConfig;
use crate::scheduler::CycleStatus;
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui, imgproc,
};
use thiserror::Error;

const QUIT_KEY: u8 = b'q';
const OVERLAY_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw annotation: {0}")]
    DrawFailed(opencv::Error),
    #[error("Failed to display frame: {0}")]
    DisplayFailed(opencv::Error),
    #[error("OpenCV error: {0}")]
    OpenCvError(#[from] opencv::Error),
}

/// Display surface for annotated frames plus the quit-key poll.
pub trait Renderer {
    fn render(
        &mut self,
        frame: &Mat,
        detections: &[BoundingBoxWithLabels],
        status: &CycleStatus,
    ) -> Result<(), RenderError>;

    /// Non-blocking check for a user-issued quit.
    fn poll_quit(&mut self) -> Result<bool, RenderError>;
}

/// Renderer backed by an OpenCV highgui window.
///
/// The window is destroyed when the renderer is dropped.
pub struct WindowRenderer {
    window_name: String,
}

impl WindowRenderer {
    pub fn new(display_config: &DisplayConfig) -> Result<Self, RenderError> {
        highgui::named_window(&display_config.window_name, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            window_name: display_config.window_name.clone(),
        })
    }

    fn annotate(frame: &mut Mat, detections: &[BoundingBoxWithLabels]) -> Result<(), RenderError> {
        for bbox in detections {
            let x1 = bbox.x1 as i32;
            let y1 = bbox.y1 as i32;
            let x2 = bbox.x2 as i32;
            let y2 = bbox.y2 as i32;
            let label = format!("{}: {:.2}", bbox.class_label, bbox.confidence);

            let color = Scalar::new(bbox.blue as f64, bbox.green as f64, bbox.red as f64, 0.0);

            imgproc::rectangle(
                frame,
                Rect::new(x1, y1, x2 - x1, y2 - y1),
                color,
                2,
                imgproc::LINE_8,
                0,
            )
            .map_err(RenderError::DrawFailed)?;

            imgproc::put_text(
                frame,
                &label,
                Point::new(x1, y1 - 5),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.5,
                color,
                1,
                imgproc::LINE_AA,
                false,
            )
            .map_err(RenderError::DrawFailed)?;
        }
        Ok(())
    }

    fn overlay_status(frame: &mut Mat, status: &CycleStatus) -> Result<(), RenderError> {
        let (blue, green, red) = OVERLAY_COLOR;
        let color = Scalar::new(blue, green, red, 0.0);

        imgproc::put_text(
            frame,
            &format!("Battery: {}%", status.battery_percent),
            Point::new(10, 30),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.9,
            color,
            2,
            imgproc::LINE_AA,
            false,
        )
        .map_err(RenderError::DrawFailed)?;

        imgproc::put_text(
            frame,
            &format!("Model: {}", status.model_label),
            Point::new(10, 60),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.8,
            color,
            2,
            imgproc::LINE_AA,
            false,
        )
        .map_err(RenderError::DrawFailed)?;

        Ok(())
    }
}

impl Renderer for WindowRenderer {
    fn render(
        &mut self,
        frame: &Mat,
        detections: &[BoundingBoxWithLabels],
        status: &CycleStatus,
    ) -> Result<(), RenderError> {
        let mut annotated = frame.clone();
        Self::annotate(&mut annotated, detections)?;
        Self::overlay_status(&mut annotated, status)?;

        highgui::imshow(&self.window_name, &annotated).map_err(RenderError::DisplayFailed)?;
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, RenderError> {
        let key = highgui::wait_key(1)?;
        Ok(key & 0xFF == i32::from(QUIT_KEY))
    }
}

impl Drop for WindowRenderer {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.window_name) {
            tracing::warn!("Failed to destroy display window: {:?}", e);
        }
    }
}
