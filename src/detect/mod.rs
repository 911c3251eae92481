mod backend;
pub mod backends;
mod filter;
mod result;

pub use backend::HumanDetector;
pub use backends::{open_backend, MotionBackend, StubBackend};
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use filter::{filter_candidates, DetectionFilter};
pub use result::{BoundingBox, Detection, RawCandidate};
