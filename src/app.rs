use crate::battery::Battery;
use crate::camera::Camera;
use crate::config::Config;
use crate::detector::OrtDetector;
use crate::labels::load_class_labels;
use crate::render::WindowRenderer;
use crate::scheduler::Scheduler;

use anyhow::Context;
use std::sync::Arc;

/// Wires the camera, both detector tiers, the display window and the
/// battery into a scheduler and runs it until the stream ends, the user
/// quits, or a detector fault aborts the loop.
pub fn start_app(config: Config) -> anyhow::Result<()> {
    ort::init().commit().context("Failed to initialize ONNX runtime")?;

    let labels_path = config.models.labels_path();
    let class_labels = Arc::new(
        load_class_labels(&labels_path)
            .with_context(|| format!("Failed to load class labels from {:?}", labels_path))?,
    );

    let heavy = OrtDetector::new(
        &config.models.heavy,
        &config.models.heavy_model_path(),
        class_labels.clone(),
    )
    .context("Failed to initialize heavy detector")?;
    let light = OrtDetector::new(
        &config.models.light,
        &config.models.light_model_path(),
        class_labels,
    )
    .context("Failed to initialize light detector")?;

    let camera = match Camera::new(config.camera.device_index) {
        Ok(camera) => camera,
        Err(e) => {
            tracing::error!("Failed to initialize camera: {:?}", e);
            return Err(e.into());
        }
    };
    let renderer = WindowRenderer::new(&config.display)?;
    let battery = Battery::new(rand::rng());

    let mut scheduler = Scheduler::new(camera, heavy, light, renderer, battery);
    tracing::info!("Starting capture loop");
    scheduler.run()?;
    tracing::info!("Capture loop stopped");

    Ok(())
}
