use crate::detect::result::{Detection, RawCandidate};

/// Confidence and size thresholds applied to raw detector output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionFilter {
    pub confidence_threshold: f32,
    pub min_area: u64,
}

impl DetectionFilter {
    pub fn new(confidence_threshold: f32, min_area: u64) -> Self {
        Self {
            confidence_threshold,
            min_area,
        }
    }

    pub fn apply(&self, candidates: Vec<RawCandidate>) -> Vec<Detection> {
        filter_candidates(candidates, self.confidence_threshold, self.min_area)
    }
}

/// Keep candidates strictly above both thresholds, in input order.
pub fn filter_candidates(
    candidates: Vec<RawCandidate>,
    confidence_threshold: f32,
    min_area: u64,
) -> Vec<Detection> {
    candidates
        .into_iter()
        .filter(|c| c.confidence > confidence_threshold && c.bbox.area() > min_area)
        .map(Detection::from)
        .collect()
}
