//! Stable descending orderings for detections and class scores.
//!
//! Both sorts are stable: equal keys keep their incoming order, so decoder
//! emission order (and class index order) is the tie-break.

use crate::candidate::detection::{ClassScore, Detection};
use std::cmp::Ordering;

fn confidence_cmp_desc(a: &Detection, b: &Detection) -> Ordering {
    b.confidence().total_cmp(&a.confidence())
}

fn probability_cmp_desc(a: &ClassScore, b: &ClassScore) -> Ordering {
    b.probability.total_cmp(&a.probability)
}

/// Sorts detections by descending confidence.
pub fn sort_by_confidence(detections: &mut [Detection]) {
    detections.sort_by(confidence_cmp_desc);
}

/// Sorts class scores by descending probability.
pub fn sort_class_scores(scores: &mut [ClassScore]) {
    scores.sort_by(probability_cmp_desc);
}

/// Returns true when `detections` is ordered by non-increasing confidence.
pub fn is_confidence_sorted(detections: &[Detection]) -> bool {
    detections
        .windows(2)
        .all(|pair| confidence_cmp_desc(&pair[0], &pair[1]) != Ordering::Greater)
}
