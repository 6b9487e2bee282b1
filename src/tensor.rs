//! Borrowed view over a detector's raw output tensor.
//!
//! `RawOutput` wraps a flat `f32` buffer laid out as
//! `height × width × channels`, row-major with the grid height outermost.
//! Each `(x, y)` cell owns a contiguous run of `channels` values.

use crate::util::{GridNmsError, GridNmsResult};

/// Borrowed 3-D view into a flat raw output buffer.
#[derive(Copy, Clone, Debug)]
pub struct RawOutput<'a> {
    data: &'a [f32],
    height: usize,
    width: usize,
    channels: usize,
}

impl<'a> RawOutput<'a> {
    /// Creates a view, checking that the buffer holds exactly
    /// `height * width * channels` elements.
    pub fn new(
        data: &'a [f32],
        height: usize,
        width: usize,
        channels: usize,
    ) -> GridNmsResult<Self> {
        let expected = height
            .checked_mul(width)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(GridNmsError::InvalidConfiguration {
                field: "grid",
                reason: "tensor dimensions overflow",
            })?;
        if data.len() != expected {
            return Err(GridNmsError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            height,
            width,
            channels,
        })
    }

    /// Returns the grid height (outer axis).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of channels per cell.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the total element count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true when the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the channel run of cell `(x, y)` if it is within bounds.
    pub fn cell(&self, x: usize, y: usize) -> Option<&'a [f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y
            .checked_mul(self.width)?
            .checked_add(x)?
            .checked_mul(self.channels)?;
        let end = start.checked_add(self.channels)?;
        self.data.get(start..end)
    }

    /// Returns the value at `(x, y, channel)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<f32> {
        self.cell(x, y)?.get(channel).copied()
    }
}
