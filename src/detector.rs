use crate::bounding_box::BoundingBoxWithLabels;
use crate::config::ModelConfig;
use crate::labels::ColorLabel;
use ndarray::{s, Array, ArrayD, Axis, Ix4};
use opencv::{
    core::{AlgorithmHint, Mat, Size},
    imgproc,
    prelude::*,
};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const INPUT_SIZE: usize = 640;
const IOU_THRESHOLD: f32 = 0.7;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Inference failed: {0}")]
    Inference(#[from] ort::Error),
    #[error("Failed to preprocess frame: {0}")]
    Preprocess(#[from] opencv::Error),
    #[error("Invalid output tensor shape: {0}")]
    OutputShape(#[from] ndarray::ShapeError),
    #[error("Model produced no `{0}` output")]
    MissingOutput(String),
}

/// Capability of running object detection on one frame.
pub trait Detector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<BoundingBoxWithLabels>, DetectorError>;

    /// Human-readable name shown in the status overlay.
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    class_id: usize,
    confidence: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

fn intersection(box1: &Candidate, box2: &Candidate) -> f32 {
    (box1.x2.min(box2.x2) - box1.x1.max(box2.x1)) * (box1.y2.min(box2.y2) - box1.y1.max(box2.y1))
}

fn union(box1: &Candidate, box2: &Candidate) -> f32 {
    ((box1.x2 - box1.x1) * (box1.y2 - box1.y1)) + ((box2.x2 - box2.x1) * (box2.y2 - box2.y1))
        - intersection(box1, box2)
}

fn non_max_suppression(mut boxes: Vec<Candidate>) -> Vec<Candidate> {
    boxes.sort_by(|box1, box2| box2.confidence.total_cmp(&box1.confidence));
    let mut result = Vec::new();

    while !boxes.is_empty() {
        result.push(boxes[0]);
        boxes = boxes
            .iter()
            .filter(|box1| intersection(&boxes[0], box1) / union(&boxes[0], box1) < IOU_THRESHOLD)
            .cloned()
            .collect();
    }

    result
}

/// Converts a BGR frame to the model's 640x640 NCHW float input and returns
/// it with the frame's original dimensions.
fn preprocess(frame: &Mat) -> Result<(Array<f32, Ix4>, i32, i32), DetectorError> {
    let img_width = frame.cols();
    let img_height = frame.rows();

    let mut resized = Mat::default();
    imgproc::resize(
        frame,
        &mut resized,
        Size::new(INPUT_SIZE as i32, INPUT_SIZE as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;
    let mut rgb = Mat::default();
    imgproc::cvt_color(
        &resized,
        &mut rgb,
        imgproc::COLOR_BGR2RGB,
        0,
        AlgorithmHint::ALGO_HINT_DEFAULT,
    )?;

    let data = rgb.data_bytes()?;
    let mut input = Array::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        for x in 0..INPUT_SIZE {
            let offset = (y * INPUT_SIZE + x) * 3;
            input[[0, 0, y, x]] = (data[offset] as f32) / 255.;
            input[[0, 1, y, x]] = (data[offset + 1] as f32) / 255.;
            input[[0, 2, y, x]] = (data[offset + 2] as f32) / 255.;
        }
    }

    Ok((input, img_width, img_height))
}

/// Decodes YOLOv8 output rows into boxes scaled back to the original frame.
fn collect_candidates(
    outputs: &ArrayD<f32>,
    img_width: i32,
    img_height: i32,
    min_probability: f32,
) -> Vec<Candidate> {
    // Model output is [1, 4 + classes, anchors]; reverse the axes so each
    // row along axis 0 is one anchor.
    let transposed = outputs.t();
    let output = transposed.slice(s![.., .., 0]);

    let mut boxes = Vec::new();
    for row in output.axis_iter(Axis(0)) {
        let row: Vec<_> = row.iter().copied().collect();
        let (class_id, prob) = row
            .iter()
            .skip(4)
            .enumerate()
            .map(|(index, value)| (index, *value))
            .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
            .unwrap_or((0, 0.0));

        if prob < min_probability {
            continue;
        }

        let xc = row[0] / INPUT_SIZE as f32 * (img_width as f32);
        let yc = row[1] / INPUT_SIZE as f32 * (img_height as f32);
        let w = row[2] / INPUT_SIZE as f32 * (img_width as f32);
        let h = row[3] / INPUT_SIZE as f32 * (img_height as f32);

        boxes.push(Candidate {
            class_id,
            confidence: prob,
            x1: xc - w / 2.,
            y1: yc - h / 2.,
            x2: xc + w / 2.,
            y2: yc + h / 2.,
        });
    }

    boxes
}

/// YOLOv8 detector backed by an ONNX Runtime session.
pub struct OrtDetector {
    session: Session,
    class_labels: Arc<Vec<ColorLabel>>,
    label: String,
    min_probability: f32,
}

impl OrtDetector {
    pub fn new(
        model_config: &ModelConfig,
        model_path: &Path,
        class_labels: Arc<Vec<ColorLabel>>,
    ) -> Result<Self, DetectorError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;

        tracing::info!(model = %model_config.label, path = %model_path.display(), "Created ONNX session");

        Ok(Self {
            session,
            class_labels,
            label: model_config.label.clone(),
            min_probability: model_config.min_probability,
        })
    }

    fn run_inference(&mut self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, DetectorError> {
        let tensor_ref = TensorRef::from_array_view(input.view())?;
        let outputs = self.session.run(ort::inputs![tensor_ref])?;

        let output = outputs
            .get("output0")
            .ok_or_else(|| DetectorError::MissingOutput("output0".to_string()))?;
        let (shape, data) = output.try_extract_tensor::<f32>()?;

        let array = ArrayD::from_shape_vec(shape.to_ixdyn(), data.to_vec())?;
        Ok(array)
    }

    fn with_labels(&self, candidates: Vec<Candidate>) -> Vec<BoundingBoxWithLabels> {
        candidates
            .into_iter()
            .map(|bbox| {
                if let Some(color_label) = self.class_labels.get(bbox.class_id) {
                    BoundingBoxWithLabels {
                        x1: bbox.x1,
                        y1: bbox.y1,
                        x2: bbox.x2,
                        y2: bbox.y2,
                        class_label: color_label.label.clone(),
                        red: color_label.red,
                        green: color_label.green,
                        blue: color_label.blue,
                        confidence: bbox.confidence,
                    }
                } else {
                    BoundingBoxWithLabels {
                        x1: bbox.x1,
                        y1: bbox.y1,
                        x2: bbox.x2,
                        y2: bbox.y2,
                        class_label: format!("Unknown class {}", bbox.class_id),
                        red: 0,
                        green: 0,
                        blue: 0,
                        confidence: bbox.confidence,
                    }
                }
            })
            .collect()
    }
}

impl Detector for OrtDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<BoundingBoxWithLabels>, DetectorError> {
        let (input, img_width, img_height) = preprocess(frame)?;
        let outputs = self.run_inference(&input)?;
        let candidates = collect_candidates(&outputs, img_width, img_height, self.min_probability);
        Ok(self.with_labels(non_max_suppression(candidates)))
    }

    fn label(&self) -> &str {
        &self.label
    }
}
