use ndarray::Array2;

use crate::error::{ParamscopeError, Result};
use crate::geometry::Size;

/// A single grayscale raster.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            data: Array2::zeros((height, width)),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as f32, self.height() as f32)
    }

    /// Rejects rasters with a zero dimension, which would otherwise poison
    /// the view transform.
    pub fn ensure_displayable(&self) -> Result<()> {
        if self.width() == 0 || self.height() == 0 {
            return Err(ParamscopeError::InvalidImage {
                width: self.width() as u32,
                height: self.height() as u32,
            });
        }
        Ok(())
    }

    /// Pixel value at image coordinates, if in bounds.
    pub fn sample(&self, x: f32, y: f32) -> Option<f32> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (col, row) = (x as usize, y as usize);
        if row < self.height() && col < self.width() {
            Some(self.data[[row, col]])
        } else {
            None
        }
    }
}

/// A frame plus the label shown in the viewport corner.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledFrame {
    pub frame: Frame,
    pub label: String,
}

impl LabeledFrame {
    pub fn new(frame: Frame, label: impl Into<String>) -> Self {
        Self {
            frame,
            label: label.into(),
        }
    }
}
