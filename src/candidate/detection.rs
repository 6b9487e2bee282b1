//! Candidate detection records produced by the grid decoder.

use crate::candidate::rank::sort_class_scores;
use crate::geometry::Rect;
use std::fmt;
use std::sync::Arc;

/// Calibrated probability for one class label.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassScore {
    /// Index of the class in the configured label list.
    pub index: usize,
    /// Class label, shared with the decoder's label list.
    pub label: Arc<str>,
    /// Softmax probability.
    pub probability: f64,
}

impl ClassScore {
    /// Creates a class score.
    pub fn new(index: usize, label: impl Into<Arc<str>>, probability: f64) -> Self {
        Self {
            index,
            label: label.into(),
            probability,
        }
    }
}

impl fmt::Display for ClassScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}%", self.label, self.probability * 100.0)
    }
}

/// Integer coordinates of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

/// One decoded candidate box.
///
/// Detections are immutable once built; suppression only drops or keeps
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    rect: Rect,
    cell: GridCell,
    confidence: f64,
    classes: Vec<ClassScore>,
}

impl Detection {
    /// Creates a detection; `classes` is ranked by descending probability.
    pub fn new(rect: Rect, cell: GridCell, confidence: f64, mut classes: Vec<ClassScore>) -> Self {
        sort_class_scores(&mut classes);
        Self {
            rect,
            cell,
            confidence,
            classes,
        }
    }

    /// Returns the pixel rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Returns the grid cell that emitted this detection.
    pub fn cell(&self) -> GridCell {
        self.cell
    }

    /// Returns the objectness confidence.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns all class scores, highest probability first.
    pub fn classes(&self) -> &[ClassScore] {
        &self.classes
    }

    /// Returns the highest-probability class.
    pub fn top_class(&self) -> Option<&ClassScore> {
        self.classes.first()
    }

    /// Probability of the top class, zero when no classes are present.
    pub(crate) fn top_probability(&self) -> f64 {
        self.top_class().map_or(0.0, |class| class.probability)
    }

    /// True when both detections have a top class with the same label.
    pub(crate) fn same_top_label(&self, other: &Detection) -> bool {
        match (self.top_class(), other.top_class()) {
            (Some(a), Some(b)) => a.label == b.label,
            _ => false,
        }
    }
}
