//! gridnms turns the raw output tensor of a grid-based object detector into
//! a clean, non-overlapping list of labelled boxes.
//!
//! The pipeline decodes every `(cell, anchor)` slot into a candidate
//! [`Detection`], ranks candidates by confidence and prunes duplicates with
//! greedy non-maximum suppression. Cell decoding can run in parallel via the
//! `rayon` feature; the `tracing` feature emits per-stage spans.

pub mod candidate;
pub mod decode;
pub mod geometry;
pub mod lowlevel;
pub mod pipeline;
pub mod report;
pub mod tensor;
mod trace;
pub mod util;

pub use candidate::detection::{ClassScore, Detection, GridCell};
pub use candidate::nms::{
    filter_by_thresholds, suppress, SuppressionMode, Thresholds,
    DEFAULT_CLASS_PROBABILITY_THRESHOLD,
};
pub use decode::{Anchor, DecodeConfig, ExtentPairing, GridDecoder, GridSpec};
pub use geometry::{iou, Rect};
pub use pipeline::{Detector, DetectorConfig};
pub use report::{classification_report, ReportConfig};
pub use tensor::RawOutput;
pub use util::{GridNmsError, GridNmsResult};
