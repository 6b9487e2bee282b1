//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the calibration transforms, rankers and the raw keep-mask
//! behind the high-level [`Detector`](crate::Detector). Most users should
//! prefer `Detector` or the `decode`/`suppress` pair.

pub use crate::candidate::nms::{filter_by_thresholds, suppression_mask, OVERLAP_IOU_THRESHOLD};
pub use crate::candidate::rank::{is_confidence_sorted, sort_by_confidence, sort_class_scores};
pub use crate::decode::{BOX_CHANNELS, TINY_YOLO_FACE_ANCHORS};
pub use crate::geometry::iou;
pub use crate::util::math::{sigmoid, softmax};
