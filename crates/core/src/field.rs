//! The ripple grid: an arena of [`Cell`]s plus the two work queues.
//!
//! Cells are stored row-major. Coordinates are bounds-checked on every
//! lookup and enqueue; out-of-grid positions read as force 0 and are never
//! queued (no wrapping at the edges).
//!
//! A tick runs in two phases. The recompute pass reads only committed
//! forces, writing each queued cell's working buffer. The draw pass then
//! commits those working values and re-enqueues whatever still moves. No
//! recompute ever observes a value committed in the same tick.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cell::Cell;
use crate::error::PuddleError;
use crate::impulse::{ForceTarget, Impulse};
use crate::params::param_f64;
use crate::shade::ShadePalette;

/// Default per-tick energy retention.
pub const DEFAULT_DAMPENING_RATIO: f64 = 0.85;
/// Default magnitude under which a force snaps to zero.
pub const DEFAULT_FORCE_CUTOFF: f64 = 2.0;
/// Default contribution of a diagonal neighbour relative to a cardinal one.
pub const DEFAULT_DIAGONAL_WEIGHT: f64 = 0.5;
/// Default strength of a full pointer press.
pub const DEFAULT_MAX_RIPPLE_STRENGTH: f64 = 100.0;

const CARDINALS: [(isize, isize); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];
const DIAGONALS: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Simulation constants shared by every cell of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    /// Multiplier applied each recompute, in (0, 1).
    pub dampening_ratio: f64,
    /// Forces with magnitude below this commit as exactly zero.
    pub force_cutoff: f64,
    /// Weight of diagonal neighbours in the average, in (0, 1).
    pub diagonal_weight: f64,
    /// Strength of a full-strength injection.
    pub max_ripple_strength: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            dampening_ratio: DEFAULT_DAMPENING_RATIO,
            force_cutoff: DEFAULT_FORCE_CUTOFF,
            diagonal_weight: DEFAULT_DIAGONAL_WEIGHT,
            max_ripple_strength: DEFAULT_MAX_RIPPLE_STRENGTH,
        }
    }
}

impl FieldParams {
    /// Reads the field section of a config object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            dampening_ratio: param_f64(params, "dampening_ratio", DEFAULT_DAMPENING_RATIO),
            force_cutoff: param_f64(params, "force_cutoff", DEFAULT_FORCE_CUTOFF),
            diagonal_weight: param_f64(params, "diagonal_weight", DEFAULT_DIAGONAL_WEIGHT),
            max_ripple_strength: param_f64(
                params,
                "max_ripple_strength",
                DEFAULT_MAX_RIPPLE_STRENGTH,
            ),
        }
    }

    /// Checks the ranges the decay guarantee depends on.
    pub fn validate(&self) -> Result<(), PuddleError> {
        if !(self.dampening_ratio > 0.0 && self.dampening_ratio < 1.0) {
            return Err(PuddleError::config(
                "field.dampening_ratio",
                format!("must be in (0, 1), got {}", self.dampening_ratio),
            ));
        }
        if !(self.force_cutoff >= 0.0 && self.force_cutoff.is_finite()) {
            return Err(PuddleError::config(
                "field.force_cutoff",
                format!("must be finite and >= 0, got {}", self.force_cutoff),
            ));
        }
        if !(self.diagonal_weight > 0.0 && self.diagonal_weight < 1.0) {
            return Err(PuddleError::config(
                "field.diagonal_weight",
                format!("must be in (0, 1), got {}", self.diagonal_weight),
            ));
        }
        if !(self.max_ripple_strength > 0.0 && self.max_ripple_strength.is_finite()) {
            return Err(PuddleError::config(
                "field.max_ripple_strength",
                format!("must be finite and > 0, got {}", self.max_ripple_strength),
            ));
        }
        Ok(())
    }
}

/// What one [`Field::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Cells whose working force was recomputed.
    pub recomputed: usize,
    /// Cells committed and re-rendered.
    pub redrawn: usize,
}

impl StepReport {
    /// False for a tick that found both queues empty.
    pub fn is_active(&self) -> bool {
        self.recomputed > 0 || self.redrawn > 0
    }
}

/// A `cols x rows` grid of ripple cells with its recompute and redraw queues.
#[derive(Debug, Clone)]
pub struct Field {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    recompute: Vec<usize>,
    redraw: Vec<usize>,
    params: FieldParams,
    palette: ShadePalette,
}

impl Field {
    /// Builds a field with every cell at rest.
    ///
    /// Returns `PuddleError::InvalidDimensions` if either dimension is zero or
    /// `cols * rows` overflows.
    pub fn new(
        cols: usize,
        rows: usize,
        params: FieldParams,
        palette: ShadePalette,
    ) -> Result<Self, PuddleError> {
        if cols == 0 || rows == 0 {
            return Err(PuddleError::InvalidDimensions);
        }
        let len = cols
            .checked_mul(rows)
            .ok_or(PuddleError::InvalidDimensions)?;
        let rest = palette.bottom();
        let cells = (0..len).map(|i| Cell::new(i % cols, i / cols, rest)).collect();
        Ok(Self {
            cols,
            rows,
            cells,
            recompute: Vec::new(),
            redraw: Vec::new(),
            params,
            palette,
        })
    }

    /// Grid width in cells.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Grid height in cells.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed field.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Simulation constants.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Glyph palette used for rendering.
    pub fn palette(&self) -> &ShadePalette {
        &self.palette
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y * self.cols + x)
    }

    /// The cell at `(x, y)`, if inside the grid.
    pub fn cell(&self, x: isize, y: isize) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Committed force at `(x, y)`; 0 outside the grid.
    pub fn force_at(&self, x: isize, y: isize) -> f64 {
        self.index(x, y)
            .map_or(0.0, |i| self.cells[i].current_force())
    }

    /// Rendered glyph at `(x, y)`, if inside the grid.
    pub fn glyph_at(&self, x: isize, y: isize) -> Option<char> {
        self.cell(x, y).map(Cell::glyph)
    }

    /// Indices awaiting recompute, in enqueue order.
    pub fn pending_recompute(&self) -> &[usize] {
        &self.recompute
    }

    /// Indices awaiting redraw. Empty between ticks.
    pub fn pending_redraw(&self) -> &[usize] {
        &self.redraw
    }

    /// True when no work is queued.
    pub fn is_quiescent(&self) -> bool {
        self.recompute.is_empty() && self.redraw.is_empty()
    }

    /// Sets the committed force at `(x, y)`, re-renders that cell and queues
    /// its 8 neighbours. Returns false (and does nothing) outside the grid.
    ///
    /// A lone cell (1×1 grid) has no neighbours to carry the crest back, so
    /// it queues itself instead.
    pub fn apply_force(&mut self, x: isize, y: isize, magnitude: f64) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        self.cells[i].apply_force(magnitude, &self.palette);
        if self.cells.len() == 1 {
            self.enqueue(x, y);
        } else {
            self.enqueue_neighbors(x, y);
        }
        true
    }

    /// Adds `(x, y)` to the recompute set unless it is outside the grid or
    /// already queued. Returns true if it was newly queued.
    pub fn enqueue(&mut self, x: isize, y: isize) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if !self.cells[i].mark_pending() {
            return false;
        }
        self.recompute.push(i);
        true
    }

    fn enqueue_neighbors(&mut self, x: isize, y: isize) {
        for (dx, dy) in CARDINALS.iter().chain(DIAGONALS.iter()) {
            self.enqueue(x + dx, y + dy);
        }
    }

    fn neighbor_sums(&self, x: isize, y: isize) -> (f64, f64) {
        let cardinal = CARDINALS
            .iter()
            .map(|(dx, dy)| self.force_at(x + dx, y + dy))
            .sum();
        let diagonal = DIAGONALS
            .iter()
            .map(|(dx, dy)| self.force_at(x + dx, y + dy))
            .sum();
        (cardinal, diagonal)
    }

    /// Advances one tick: recompute every queued cell from the committed
    /// snapshot, then commit and redraw them, then re-enqueue cells that
    /// still move along with their neighbours.
    ///
    /// A tick with nothing queued does no work and reports inactive.
    pub fn step(&mut self) -> StepReport {
        if self.is_quiescent() {
            return StepReport::default();
        }

        let batch = std::mem::take(&mut self.recompute);
        for &i in &batch {
            let (x, y) = (self.cells[i].x() as isize, self.cells[i].y() as isize);
            let (cardinal, diagonal) = self.neighbor_sums(x, y);
            let cell = &mut self.cells[i];
            cell.clear_pending();
            cell.recompute(cardinal, diagonal, &self.params);
            self.redraw.push(i);
        }

        let redraw = std::mem::take(&mut self.redraw);
        for &i in &redraw {
            let moving = self.cells[i].commit(self.params.force_cutoff, &self.palette);
            if moving {
                let (x, y) = (self.cells[i].x() as isize, self.cells[i].y() as isize);
                self.enqueue(x, y);
                self.enqueue_neighbors(x, y);
            }
        }

        StepReport {
            recomputed: batch.len(),
            redrawn: redraw.len(),
        }
    }
}

impl ForceTarget for Field {
    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn apply_force_at(&mut self, x: isize, y: isize, impulse: Impulse) -> usize {
        impulse
            .offsets()
            .filter(|&(dx, dy, strength)| self.apply_force(x + dx, y + dy, strength))
            .count()
    }
}
