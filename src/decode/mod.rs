//! Grid decoding of raw region-layer activations.
//!
//! Every `(cell, anchor)` slot of the raw output becomes one [`Detection`].
//! Slots are visited cell-x outer, cell-y middle, anchor inner. Box centres
//! and extents are truncated to whole pixels before the rectangle is built.

use crate::candidate::detection::{ClassScore, Detection, GridCell};
use crate::geometry::Rect;
use crate::tensor::RawOutput;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{exp, sigmoid, softmax};
use crate::util::{GridNmsError, GridNmsResult};
use std::sync::Arc;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Leading per-slot channels before the class logits: `tx, ty, tw, th, tc`.
pub const BOX_CHANNELS: usize = 5;

/// Flat `[w0, h0, w1, h1, ...]` anchors of the tiny-YOLO face model.
pub const TINY_YOLO_FACE_ANCHORS: [f64; 10] = [
    0.738768, 0.874946, 2.42204, 2.65704, 4.30971, 7.04493, 10.246, 4.59428, 12.6868, 11.8741,
];

/// Output grid dimensions and pixels per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpec {
    /// Number of cell columns.
    pub width: usize,
    /// Number of cell rows.
    pub height: usize,
    /// Pixel edge length of one cell in model-input space.
    pub block_size: usize,
}

impl GridSpec {
    /// Model-input image width in pixels.
    pub fn image_width(&self) -> usize {
        self.width * self.block_size
    }

    /// Model-input image height in pixels.
    pub fn image_height(&self) -> usize {
        self.height * self.block_size
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            width: 13,
            height: 13,
            block_size: 32,
        }
    }
}

/// Prior box shape in grid-cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub width: f64,
    pub height: f64,
}

impl Anchor {
    /// Creates an anchor.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Builds anchors from a flat `[w0, h0, w1, h1, ...]` list.
    pub fn from_flat(values: &[f64]) -> GridNmsResult<Vec<Anchor>> {
        if values.len() % 2 != 0 {
            return Err(GridNmsError::InvalidConfiguration {
                field: "anchors",
                reason: "flat anchor list must hold width/height pairs",
            });
        }
        Ok(values
            .chunks_exact(2)
            .map(|pair| Anchor::new(pair[0], pair[1]))
            .collect())
    }
}

/// How box extents pair with centre coordinates when building rectangles.
///
/// Deployed decoders differ on this; pick the one the model was exported for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtentPairing {
    /// Horizontal span is `x ± h/2`, vertical span is `y ± w/2`.
    #[default]
    XHeight,
    /// Horizontal span is `y ± w/2`, vertical span is `x ± h/2`.
    YWidth,
}

impl ExtentPairing {
    fn rect(self, x: i32, y: i32, w: i32, h: i32, image_width: i32, image_height: i32) -> Rect {
        let (cx, half_x, cy, half_y) = match self {
            ExtentPairing::XHeight => (x, h / 2, y, w / 2),
            ExtentPairing::YWidth => (y, w / 2, x, h / 2),
        };
        Rect::new(
            cx.saturating_sub(half_x).clamp(0, image_width),
            cy.saturating_sub(half_y).clamp(0, image_height),
            cx.saturating_add(half_x).clamp(0, image_width),
            cy.saturating_add(half_y).clamp(0, image_height),
        )
    }
}

/// Configuration for the grid decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Grid layout of the raw output.
    pub grid: GridSpec,
    /// One anchor per box slot in a cell.
    pub anchors: Vec<Anchor>,
    /// Class labels, index-aligned with the class-logit channels.
    pub labels: Vec<String>,
    /// Extent/centre pairing used for rectangles.
    pub pairing: ExtentPairing,
    /// Decode cells in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl DecodeConfig {
    /// Layout of the single-class tiny-YOLO face detector: 13×13 cells of
    /// 32 px, five anchors, one `face` label.
    pub fn tiny_yolo_faces() -> Self {
        let anchors = TINY_YOLO_FACE_ANCHORS
            .chunks_exact(2)
            .map(|pair| Anchor::new(pair[0], pair[1]))
            .collect();
        Self {
            grid: GridSpec::default(),
            anchors,
            labels: vec!["face".to_owned()],
            pairing: ExtentPairing::default(),
            parallel: false,
        }
    }

    /// Number of box slots per cell.
    pub fn boxes_per_cell(&self) -> usize {
        self.anchors.len()
    }

    /// Number of classes.
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Channels of one anchor slot.
    pub fn slot_channels(&self) -> usize {
        BOX_CHANNELS + self.num_classes()
    }

    /// Channels of one cell.
    pub fn cell_channels(&self) -> usize {
        self.boxes_per_cell() * self.slot_channels()
    }

    /// Number of detections a single decode emits.
    pub fn candidate_count(&self) -> usize {
        self.grid.width * self.grid.height * self.boxes_per_cell()
    }

    /// Element count the raw output must have.
    pub fn expected_len(&self) -> usize {
        self.grid.width * self.grid.height * self.cell_channels()
    }

    fn validate(&self) -> GridNmsResult<()> {
        let grid = self.grid;
        if grid.width == 0 || grid.height == 0 {
            return Err(GridNmsError::InvalidConfiguration {
                field: "grid",
                reason: "grid dimensions must be nonzero",
            });
        }
        if grid.block_size == 0 {
            return Err(GridNmsError::InvalidConfiguration {
                field: "grid.block_size",
                reason: "block size must be nonzero",
            });
        }
        let fits = |cells: usize| {
            cells
                .checked_mul(grid.block_size)
                .is_some_and(|px| i32::try_from(px).is_ok())
        };
        if !fits(grid.width) || !fits(grid.height) {
            return Err(GridNmsError::InvalidConfiguration {
                field: "grid",
                reason: "image extent does not fit in i32 pixels",
            });
        }
        if self.anchors.is_empty() {
            return Err(GridNmsError::InvalidConfiguration {
                field: "anchors",
                reason: "at least one anchor is required",
            });
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !self
            .anchors
            .iter()
            .all(|anchor| valid(anchor.width) && valid(anchor.height))
        {
            return Err(GridNmsError::InvalidConfiguration {
                field: "anchors",
                reason: "anchor extents must be finite and positive",
            });
        }
        if self.labels.is_empty() {
            return Err(GridNmsError::InvalidConfiguration {
                field: "labels",
                reason: "at least one class label is required",
            });
        }
        Ok(())
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::tiny_yolo_faces()
    }
}

/// Validated decoder turning raw output into candidate detections.
#[derive(Clone, Debug)]
pub struct GridDecoder {
    cfg: DecodeConfig,
    labels: Vec<Arc<str>>,
    image_width: i32,
    image_height: i32,
}

impl GridDecoder {
    /// Validates `cfg` and creates a decoder.
    pub fn new(cfg: DecodeConfig) -> GridNmsResult<Self> {
        cfg.validate()?;
        let labels = cfg.labels.iter().map(|label| Arc::from(label.as_str())).collect();
        let to_px = |px: usize| {
            i32::try_from(px).map_err(|_| GridNmsError::InvalidConfiguration {
                field: "grid",
                reason: "image extent does not fit in i32 pixels",
            })
        };
        let image_width = to_px(cfg.grid.image_width())?;
        let image_height = to_px(cfg.grid.image_height())?;
        Ok(Self {
            cfg,
            labels,
            image_width,
            image_height,
        })
    }

    /// Returns the decoder configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Wraps `data` in a view shaped for this decoder.
    pub fn view<'a>(&self, data: &'a [f32]) -> GridNmsResult<RawOutput<'a>> {
        RawOutput::new(
            data,
            self.cfg.grid.height,
            self.cfg.grid.width,
            self.cfg.cell_channels(),
        )
    }

    /// Decodes a flat raw output buffer.
    pub fn decode(&self, data: &[f32]) -> GridNmsResult<Vec<Detection>> {
        let output = self.view(data)?;
        self.decode_output(output)
    }

    /// Decodes a raw output view whose dimensions must match the config.
    pub fn decode_output(&self, output: RawOutput<'_>) -> GridNmsResult<Vec<Detection>> {
        let grid = self.cfg.grid;
        if output.height() != grid.height
            || output.width() != grid.width
            || output.channels() != self.cfg.cell_channels()
        {
            return Err(GridNmsError::ShapeMismatch {
                expected: self.cfg.expected_len(),
                got: output.len(),
            });
        }

        let _span = trace_span!(
            "decode",
            grid_width = grid.width,
            grid_height = grid.height,
            anchors = self.cfg.boxes_per_cell()
        )
        .entered();

        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            let out = rayon::decode_par(self, output);
            trace_event!("decoded_candidates", count = out.len());
            return Ok(out);
        }

        let mut out = Vec::with_capacity(self.cfg.candidate_count());
        for cx in 0..grid.width {
            for cy in 0..grid.height {
                self.decode_cell(output, GridCell { x: cx, y: cy }, &mut out);
            }
        }
        trace_event!("decoded_candidates", count = out.len());
        Ok(out)
    }

    /// Appends the detections of every anchor slot of `cell` to `out`.
    pub(crate) fn decode_cell(
        &self,
        output: RawOutput<'_>,
        cell: GridCell,
        out: &mut Vec<Detection>,
    ) {
        let Some(values) = output.cell(cell.x, cell.y) else {
            return;
        };
        let slots = values.chunks_exact(self.cfg.slot_channels());
        for (anchor, slot) in self.cfg.anchors.iter().zip(slots) {
            out.push(self.decode_slot(slot, cell, anchor));
        }
    }

    fn decode_slot(&self, slot: &[f32], cell: GridCell, anchor: &Anchor) -> Detection {
        let block = self.cfg.grid.block_size as f64;
        let (tx, ty, tw, th, tc) = (slot[0], slot[1], slot[2], slot[3], slot[4]);

        // Centre in model-input pixels; extents scaled from the anchor prior.
        let x = ((cell.x as f64 + sigmoid(tx)) * block) as i32;
        let y = ((cell.y as f64 + sigmoid(ty)) * block) as i32;
        let w = (exp(tw) * anchor.width * block) as i32;
        let h = (exp(th) * anchor.height * block) as i32;

        let rect = self
            .cfg
            .pairing
            .rect(x, y, w, h, self.image_width, self.image_height);
        let classes = softmax(&slot[BOX_CHANNELS..])
            .into_iter()
            .zip(self.labels.iter())
            .enumerate()
            .map(|(index, (probability, label))| ClassScore {
                index,
                label: Arc::clone(label),
                probability,
            })
            .collect();

        Detection::new(rect, cell, sigmoid(tc), classes)
    }
}
