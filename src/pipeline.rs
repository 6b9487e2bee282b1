//! Decode, rank and suppress in one call.

use crate::candidate::detection::Detection;
use crate::candidate::nms::{suppress, SuppressionMode, Thresholds};
use crate::decode::{DecodeConfig, GridDecoder};
use crate::tensor::RawOutput;
use crate::util::GridNmsResult;

/// Everything a [`Detector`] needs, loaded at once.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Grid, anchor and label layout.
    pub decode: DecodeConfig,
    /// Suppression variant and its thresholds.
    pub mode: SuppressionMode,
}

impl DetectorConfig {
    /// Truncating suppression with explicit thresholds.
    pub fn new(decode: DecodeConfig, thresholds: Thresholds) -> Self {
        Self {
            decode,
            mode: SuppressionMode::Truncating(thresholds),
        }
    }
}

/// Post-processor for one detector head.
#[derive(Clone, Debug)]
pub struct Detector {
    decoder: GridDecoder,
    mode: SuppressionMode,
}

impl Detector {
    /// Creates a detector from a validated decoder and a suppression mode.
    pub fn new(decoder: GridDecoder, mode: SuppressionMode) -> Self {
        Self { decoder, mode }
    }

    /// Validates `cfg` and creates a detector.
    pub fn from_config(cfg: DetectorConfig) -> GridNmsResult<Self> {
        let decoder = GridDecoder::new(cfg.decode)?;
        Ok(Self::new(decoder, cfg.mode))
    }

    /// Returns the underlying decoder.
    pub fn decoder(&self) -> &GridDecoder {
        &self.decoder
    }

    /// Returns the suppression mode.
    pub fn mode(&self) -> &SuppressionMode {
        &self.mode
    }

    /// Runs the full pipeline over a flat raw output buffer.
    pub fn detect(&self, data: &[f32]) -> GridNmsResult<Vec<Detection>> {
        let candidates = self.decoder.decode(data)?;
        Ok(suppress(candidates, &self.mode))
    }

    /// Runs the full pipeline over a raw output view.
    pub fn detect_output(&self, output: RawOutput<'_>) -> GridNmsResult<Vec<Detection>> {
        let candidates = self.decoder.decode_output(output)?;
        Ok(suppress(candidates, &self.mode))
    }
}
