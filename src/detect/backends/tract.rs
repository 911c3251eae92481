#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::HumanDetector;
use crate::detect::result::{BoundingBox, RawCandidate};
use crate::frame::Frame;

/// Tract-based backend for ONNX person detectors.
///
/// The model takes a `1x3xHxW` float input in `0..1` and yields rows of
/// `(x, y, w, h, score)` in input pixel coordinates, either as `[1, N, 5]` or
/// `[N, 5]`. Rows are returned unfiltered; thresholds are applied downstream.
pub struct TractBackend {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    width: u32,
    height: u32,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, width: u32, height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            width,
            height,
        })
    }

    fn build_input(&self, frame: &Frame) -> Result<Tensor> {
        if frame.width != self.width || frame.height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                frame.width,
                frame.height,
                self.width,
                self.height
            ));
        }

        let pixels = frame.pixels();
        let width = self.width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, self.height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            },
        );

        Ok(input.into_tensor())
    }

    fn extract_candidates(&self, outputs: TVec<TValue>) -> Result<Vec<RawCandidate>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let rows = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let values: Vec<f32> = rows.iter().copied().collect();
        if values.len() % 5 != 0 {
            return Err(anyhow!(
                "model output has {} values, expected rows of 5",
                values.len()
            ));
        }

        Ok(values
            .chunks_exact(5)
            .filter(|row| row.iter().all(|v| v.is_finite()))
            .map(|row| {
                let bbox = BoundingBox::new(
                    row[0].max(0.0) as u32,
                    row[1].max(0.0) as u32,
                    row[2].max(0.0) as u32,
                    row[3].max(0.0) as u32,
                )
                .clamped(self.width, self.height);
                RawCandidate::new(bbox, row[4])
            })
            .collect())
    }
}

impl HumanDetector for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawCandidate>> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.extract_candidates(outputs)
    }
}
