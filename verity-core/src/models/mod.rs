mod classification;
mod label;
mod reference;
mod verdict;

pub use classification::{ClassificationResult, SimilarityMatch};
pub(crate) use classification::clamp_unit;
pub use label::{ConfidenceBucket, Label};
pub use reference::ReferenceRecord;
pub use verdict::Verdict;
