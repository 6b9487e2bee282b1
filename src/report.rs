//! Flattened, probability-ranked class listing over final detections.

use crate::candidate::detection::{ClassScore, Detection};
use crate::candidate::rank::sort_class_scores;

/// Default floor for class scores included in a report.
pub const DEFAULT_REPORT_MIN_CLASS_PROBABILITY: f64 = 0.4;

/// Filters applied when building a classification report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportConfig {
    /// A detection contributes only if its top class is strictly above this.
    pub min_top_probability: f64,
    /// Class scores at or below this are omitted.
    pub min_class_probability: f64,
}

impl ReportConfig {
    /// Report over detections whose top class beats `min_top_probability`.
    pub fn new(min_top_probability: f64) -> Self {
        Self {
            min_top_probability,
            min_class_probability: DEFAULT_REPORT_MIN_CLASS_PROBABILITY,
        }
    }
}

/// Collects every class score of qualifying detections, ranked descending.
pub fn classification_report(detections: &[Detection], cfg: &ReportConfig) -> Vec<ClassScore> {
    let mut scores: Vec<ClassScore> = detections
        .iter()
        .filter(|detection| detection.top_probability() > cfg.min_top_probability)
        .flat_map(|detection| detection.classes().iter().cloned())
        .collect();
    sort_class_scores(&mut scores);
    scores.retain(|score| score.probability > cfg.min_class_probability);
    scores
}
