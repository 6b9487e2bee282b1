//! Greedy non-maximum suppression over decoded detections.
//!
//! Suppression works on a confidence-sorted list. Rather than removing
//! elements while iterating, it builds a keep-mask: a detection that is still
//! kept at position `i` clears every later kept detection that overlaps it
//! with IoU above [`OVERLAP_IOU_THRESHOLD`] and shares its top-class label.
//! Suppressed detections never suppress anything themselves, which matches an
//! in-place removal loop element for element.

use crate::candidate::detection::Detection;
use crate::candidate::rank::sort_by_confidence;
use crate::trace::{trace_event, trace_span};
use crate::util::{GridNmsError, GridNmsResult};

/// IoU above which two same-class detections are considered duplicates.
pub const OVERLAP_IOU_THRESHOLD: f64 = 0.5;

/// Default minimum top-class probability.
pub const DEFAULT_CLASS_PROBABILITY_THRESHOLD: f64 = 0.90;

/// Confidence and class-probability cut-offs, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    confidence: f64,
    class_probability: f64,
}

impl Thresholds {
    /// Validates and creates a threshold pair.
    pub fn new(confidence: f64, class_probability: f64) -> GridNmsResult<Self> {
        check_probability("confidence_threshold", confidence)?;
        check_probability("class_probability_threshold", class_probability)?;
        Ok(Self {
            confidence,
            class_probability,
        })
    }

    /// Creates thresholds with the default class-probability cut-off.
    pub fn with_confidence(confidence: f64) -> GridNmsResult<Self> {
        Self::new(confidence, DEFAULT_CLASS_PROBABILITY_THRESHOLD)
    }

    /// Minimum objectness confidence.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Minimum top-class probability.
    pub fn class_probability(&self) -> f64 {
        self.class_probability
    }

    /// True when `detection` falls below either cut-off.
    pub(crate) fn rejects(&self, detection: &Detection) -> bool {
        detection.confidence() < self.confidence
            || detection.top_probability() < self.class_probability
    }
}

fn check_probability(field: &'static str, value: f64) -> GridNmsResult<()> {
    if !value.is_finite() {
        return Err(GridNmsError::InvalidConfiguration {
            field,
            reason: "must be finite",
        });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(GridNmsError::InvalidConfiguration {
            field,
            reason: "must lie in [0, 1]",
        });
    }
    Ok(())
}

/// Which suppression variant to run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SuppressionMode {
    /// Stop at the first detection after the head that falls below either
    /// threshold and discard it together with everything after it.
    Truncating(Thresholds),
    /// Overlap suppression only; thresholds are left to the caller, see
    /// [`filter_by_thresholds`].
    OverlapOnly,
}

impl SuppressionMode {
    fn thresholds(&self) -> Option<&Thresholds> {
        match self {
            SuppressionMode::Truncating(thresholds) => Some(thresholds),
            SuppressionMode::OverlapOnly => None,
        }
    }
}

/// Computes the keep-mask for an already confidence-sorted slice.
///
/// With thresholds, the first kept detection at index `i >= 1` that fails
/// either threshold ends the scan: it and every later detection are cleared,
/// even ones that would individually pass. The head of the list is never
/// truncated.
pub fn suppression_mask(sorted: &[Detection], thresholds: Option<&Thresholds>) -> Vec<bool> {
    let mut keep = vec![true; sorted.len()];
    for i in 0..sorted.len() {
        if !keep[i] {
            continue;
        }
        let current = &sorted[i];
        if i > 0 {
            if let Some(thresholds) = thresholds {
                if thresholds.rejects(current) {
                    keep[i..].fill(false);
                    break;
                }
            }
        }
        let rect = current.rect();
        for j in (i + 1)..sorted.len() {
            if !keep[j] {
                continue;
            }
            let other = &sorted[j];
            if rect.iou(&other.rect()) > OVERLAP_IOU_THRESHOLD && current.same_top_label(other) {
                keep[j] = false;
            }
        }
    }
    keep
}

/// Sorts `detections` by confidence and removes duplicates.
///
/// The output is confidence-descending, never longer than the input, and a
/// second pass over it removes nothing.
pub fn suppress(mut detections: Vec<Detection>, mode: &SuppressionMode) -> Vec<Detection> {
    let _span = trace_span!("suppress", candidates = detections.len()).entered();

    sort_by_confidence(&mut detections);
    let keep = suppression_mask(&detections, mode.thresholds());
    let before = detections.len();
    let mut flags = keep.into_iter();
    detections.retain(|_| flags.next().unwrap_or(false));

    trace_event!(
        "suppressed",
        kept = detections.len(),
        dropped = before - detections.len()
    );
    detections
}

/// Drops every detection that fails either threshold, individually.
///
/// This is the caller-side pass that pairs with
/// [`SuppressionMode::OverlapOnly`]; order is preserved.
pub fn filter_by_thresholds(
    mut detections: Vec<Detection>,
    thresholds: &Thresholds,
) -> Vec<Detection> {
    detections.retain(|detection| !thresholds.rejects(detection));
    detections
}
