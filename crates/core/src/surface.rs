//! Surface descriptors and the pixel-to-grid geometry derived from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PuddleError;
use crate::params::param_f64;

/// Default cell size as a fraction of the lesser surface dimension.
pub const DEFAULT_CELL_SIZE_RATIO: f64 = 0.022;
/// Default lower bound on cell size, in pixels.
pub const DEFAULT_MIN_CELL_SIZE: f64 = 10.0;
/// Default upper bound on cell size, in pixels.
pub const DEFAULT_MAX_CELL_SIZE: f64 = 28.0;

/// Anything that can report its pixel size (and optionally its page origin).
///
/// Host adapters implement this for their drawing surfaces; the simulation
/// only ever asks for these numbers.
pub trait SurfaceSize {
    /// Width in pixels.
    fn width(&self) -> f64;

    /// Height in pixels.
    fn height(&self) -> f64;

    /// Top-left corner in the coordinate space pointer events arrive in.
    fn origin(&self) -> (f64, f64) {
        (0.0, 0.0)
    }
}

/// A plain rectangle, the usual [`SurfaceSize`] in tests and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    /// A rectangle anchored at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Snapshots any [`SurfaceSize`].
    pub fn of(surface: &impl SurfaceSize) -> Self {
        let (left, top) = surface.origin();
        Self {
            left,
            top,
            width: surface.width(),
            height: surface.height(),
        }
    }
}

impl SurfaceSize for SurfaceRect {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn origin(&self) -> (f64, f64) {
        (self.left, self.top)
    }
}

/// How cell size is derived from surface size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub cell_size_ratio: f64,
    pub min_cell_size: f64,
    pub max_cell_size: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            cell_size_ratio: DEFAULT_CELL_SIZE_RATIO,
            min_cell_size: DEFAULT_MIN_CELL_SIZE,
            max_cell_size: DEFAULT_MAX_CELL_SIZE,
        }
    }
}

impl SurfaceConfig {
    pub fn from_json(params: &Value) -> Self {
        Self {
            cell_size_ratio: param_f64(params, "cell_size_ratio", DEFAULT_CELL_SIZE_RATIO),
            min_cell_size: param_f64(params, "min_cell_size", DEFAULT_MIN_CELL_SIZE),
            max_cell_size: param_f64(params, "max_cell_size", DEFAULT_MAX_CELL_SIZE),
        }
    }

    pub fn validate(&self) -> Result<(), PuddleError> {
        if !(self.cell_size_ratio > 0.0 && self.cell_size_ratio.is_finite()) {
            return Err(PuddleError::config(
                "surface.cell_size_ratio",
                format!("must be finite and > 0, got {}", self.cell_size_ratio),
            ));
        }
        if !(self.min_cell_size > 0.0 && self.min_cell_size.is_finite()) {
            return Err(PuddleError::config(
                "surface.min_cell_size",
                format!("must be finite and > 0, got {}", self.min_cell_size),
            ));
        }
        if !(self.max_cell_size >= self.min_cell_size && self.max_cell_size.is_finite()) {
            return Err(PuddleError::config(
                "surface.max_cell_size",
                format!(
                    "must be finite and >= min_cell_size ({}), got {}",
                    self.min_cell_size, self.max_cell_size
                ),
            ));
        }
        Ok(())
    }
}

/// Cell size and grid dimensions for one bound surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Edge length of one cell, in pixels.
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    /// Surface width the geometry was measured from.
    pub width: f64,
    /// Surface height the geometry was measured from.
    pub height: f64,
}

impl GridGeometry {
    /// Derives cell size from the lesser surface dimension, clamped to the
    /// configured bounds, then fits as many whole cells as possible.
    ///
    /// Fails with `InvalidSurface` when either dimension is non-positive or
    /// non-finite. A surface smaller than one cell still gets a 1x1 grid.
    pub fn measure(width: f64, height: f64, config: &SurfaceConfig) -> Result<Self, PuddleError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PuddleError::InvalidSurface { width, height });
        }
        let cell_size = (config.cell_size_ratio * width.min(height))
            .clamp(config.min_cell_size, config.max_cell_size);
        let fit = |extent: f64| ((extent / cell_size).floor() as usize).max(1);
        Ok(Self {
            cell_size,
            cols: fit(width),
            rows: fit(height),
            width,
            height,
        })
    }

    /// Maps surface-local pixel coordinates to a grid cell.
    ///
    /// Points outside the surface, or in the sliver past the last whole
    /// cell, return `None`.
    pub fn locate(&self, local_x: f64, local_y: f64) -> Option<(usize, usize)> {
        if !(local_x >= 0.0 && local_y >= 0.0 && local_x < self.width && local_y < self.height) {
            return None;
        }
        let x = (local_x / self.cell_size).floor() as usize;
        let y = (local_y / self.cell_size).floor() as usize;
        (x < self.cols && y < self.rows).then_some((x, y))
    }
}
