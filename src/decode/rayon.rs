//! Rayon-parallel grid decoding (feature-gated).
//!
//! Cells are independent, so each one is decoded on its own task. Results
//! are collected in cell order and flattened, which reproduces the
//! sequential emission order exactly.

use crate::candidate::detection::{Detection, GridCell};
use crate::decode::GridDecoder;
use crate::tensor::RawOutput;
use rayon::prelude::*;

/// Cell-parallel decode of an already shape-checked raw output.
pub(crate) fn decode_par(decoder: &GridDecoder, output: RawOutput<'_>) -> Vec<Detection> {
    let cfg = decoder.config();
    let grid = cfg.grid;
    let per_cell = cfg.boxes_per_cell();

    let cells: Vec<Vec<Detection>> = (0..grid.width * grid.height)
        .into_par_iter()
        .map(|idx| {
            // Cell-x outer, cell-y inner, as in the sequential walk.
            let cell = GridCell {
                x: idx / grid.height,
                y: idx % grid.height,
            };
            let mut out = Vec::with_capacity(per_cell);
            decoder.decode_cell(output, cell, &mut out);
            out
        })
        .collect();

    let mut out = Vec::with_capacity(cfg.candidate_count());
    for detections in cells {
        out.extend(detections);
    }
    out
}
