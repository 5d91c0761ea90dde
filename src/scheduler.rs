use crate::battery::Battery;
use crate::camera::{CameraError, FrameSource};
use crate::detector::{Detector, DetectorError};
use crate::render::{RenderError, Renderer};
use rand::Rng;
use thiserror::Error;

/// Battery level above which the heavy tier is selected.
pub const HEAVY_TIER_THRESHOLD: f64 = 50.0;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorTier {
    Heavy,
    Light,
}

impl DetectorTier {
    /// Pure function of the current battery level, no hysteresis. Exactly
    /// 50.0 selects the light tier.
    pub fn select(level: f64) -> Self {
        if level > HEAVY_TIER_THRESHOLD {
            DetectorTier::Heavy
        } else {
            DetectorTier::Light
        }
    }
}

/// Per-cycle status handed to the renderer for the on-screen overlay.
#[derive(Debug)]
pub struct CycleStatus<'a> {
    pub battery_percent: i32,
    pub model_label: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Drives the per-frame cycle: capture, battery tick, tier selection,
/// inference, render, quit poll.
///
/// Owns the frame source, both detectors, the renderer and the battery, so
/// dropping the scheduler releases the camera and the display exactly once
/// on every exit path.
pub struct Scheduler<S, D, V, R>
where
    S: FrameSource,
    D: Detector,
    V: Renderer,
    R: Rng,
{
    source: S,
    heavy: D,
    light: D,
    renderer: V,
    battery: Battery<R>,
    state: LoopState,
}

impl<S, D, V, R> Scheduler<S, D, V, R>
where
    S: FrameSource,
    D: Detector,
    V: Renderer,
    R: Rng,
{
    pub fn new(source: S, heavy: D, light: D, renderer: V, battery: Battery<R>) -> Self {
        Self {
            source,
            heavy,
            light,
            renderer,
            battery,
            state: LoopState::Running,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs one full cycle and returns the loop state afterwards.
    ///
    /// Stream exhaustion and a quit keypress stop the loop without error;
    /// detector and render failures propagate and are fatal.
    pub fn step(&mut self) -> Result<LoopState, SchedulerError> {
        let frame = match self.source.next_frame()? {
            Some(frame) => frame,
            None => {
                tracing::info!("Frame source exhausted, stopping");
                self.state = LoopState::Stopped;
                return Ok(self.state);
            }
        };

        let level = self.battery.tick();
        let tier = DetectorTier::select(level);
        let detector = match tier {
            DetectorTier::Heavy => &mut self.heavy,
            DetectorTier::Light => &mut self.light,
        };
        tracing::debug!(level, ?tier, model = detector.label(), "cycle");

        let detections = detector.detect(&frame)?;

        let status = CycleStatus {
            battery_percent: level as i32,
            model_label: detector.label(),
        };
        self.renderer.render(&frame, &detections, &status)?;

        if self.renderer.poll_quit()? {
            tracing::info!("Quit requested, stopping");
            self.state = LoopState::Stopped;
        }
        Ok(self.state)
    }

    /// Steps until the loop leaves `Running`.
    pub fn run(&mut self) -> Result<(), SchedulerError> {
        while self.state == LoopState::Running {
            self.step()?;
        }
        Ok(())
    }
}
