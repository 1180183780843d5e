//! Hand landmark estimation.
//!
//! [`LandmarkEstimator`] is the seam between the frame loop and whatever
//! produces hand landmarks. [`HandLandmarkDetector`] runs a 21-point hand
//! landmark ONNX model (224x224 RGB input; outputs: 63 landmark values in
//! input pixels, then a hand presence score) on the whole frame.

use crate::{
    constants::{LANDMARK_MODEL_COORDS, LANDMARK_MODEL_INPUT_SIZE, NUM_HAND_LANDMARKS},
    landmarks::LandmarkFrame,
    Error, Result,
};
use nalgebra::Point2;
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, Vec3f, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Source of per-frame hand landmarks
pub trait LandmarkEstimator {
    /// Landmarks of the hand in `frame`, or `None` when no hand is visible
    fn estimate(&mut self, frame: &Mat) -> Result<Option<LandmarkFrame>>;
}

/// Hand landmark detector using `ONNX` Runtime
pub struct HandLandmarkDetector {
    session: Session,
    input_size: i32,
    presence_threshold: f32,
}

impl HandLandmarkDetector {
    /// Create a detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has fewer than two outputs
    pub fn new<P: AsRef<Path>>(model_path: P, presence_threshold: f32) -> Result<Self> {
        log::info!(
            "Initializing HandLandmarkDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_landmarks")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.outputs.len() < 2 {
            return Err(Error::ModelError(format!(
                "Hand landmark model needs landmark and presence outputs, found {}",
                session.outputs.len()
            )));
        }

        Ok(Self {
            session,
            input_size: LANDMARK_MODEL_INPUT_SIZE,
            presence_threshold,
        })
    }

    /// Resize, convert to RGB in [0, 1] and pack as NHWC
    #[allow(clippy::cast_sign_loss)] // Input size is a positive constant
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = Vec::with_capacity(size * size * channels);
        for row in 0..self.input_size {
            for col in 0..self.input_size {
                let pixel = float_image.at_2d::<Vec3f>(row, col)?;
                data.extend_from_slice(&[pixel[0], pixel[1], pixel[2]]);
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelError(format!("Failed to create input array: {e}")))
    }

    /// Run the model, returning raw landmark values and the presence score
    fn forward(&self, input: Array4<f32>) -> Result<(Vec<f32>, f32)> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let mut outputs = outputs.into_iter();

        let landmarks = extract(outputs.next(), "landmark")?;
        let presence = extract(outputs.next(), "presence")?
            .first()
            .copied()
            .ok_or_else(|| Error::ModelOutputError("Empty presence output".to_string()))?;

        Ok((landmarks, presence))
    }

    /// Convert raw model values into a normalized landmark frame
    fn postprocess(raw: &[f32], input_size: i32, frame_width: u32, frame_height: u32) -> Result<LandmarkFrame> {
        let needed = NUM_HAND_LANDMARKS * LANDMARK_MODEL_COORDS;
        if raw.len() < needed {
            return Err(Error::ModelOutputError(format!(
                "Expected {needed} landmark values, got {}",
                raw.len()
            )));
        }

        let scale = f64::from(input_size);
        let points: Vec<Point2<f64>> = raw
            .chunks_exact(LANDMARK_MODEL_COORDS)
            .take(NUM_HAND_LANDMARKS)
            .map(|xyz| Point2::new(f64::from(xyz[0]) / scale, f64::from(xyz[1]) / scale))
            .collect();

        LandmarkFrame::new(&points, frame_width, frame_height)
    }
}

fn extract(value: Option<Value<'_>>, name: &str) -> Result<Vec<f32>> {
    let value = value.ok_or_else(|| Error::ModelOutputError(format!("No {name} output from model")))?;
    let tensor = value.try_extract::<f32>()?;
    let view = tensor.view();
    Ok(view.iter().copied().collect())
}

impl LandmarkEstimator for HandLandmarkDetector {
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn estimate(&mut self, frame: &Mat) -> Result<Option<LandmarkFrame>> {
        if frame.empty() {
            return Err(Error::InvalidInput("Empty frame passed to landmark detector".to_string()));
        }

        let input = self.preprocess(frame)?;
        let (raw, presence) = self.forward(input)?;

        if presence < self.presence_threshold {
            log::debug!("No hand (presence {:.2})", presence);
            return Ok(None);
        }

        Self::postprocess(&raw, self.input_size, frame.cols() as u32, frame.rows() as u32).map(Some)
    }
}
