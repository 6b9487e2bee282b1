//! Candidate records, ranking and pruning.
//!
//! Includes the detection types, stable confidence ranking and greedy
//! non-maximum suppression.

pub mod detection;
pub mod nms;
pub mod rank;
