//! Per-grid-point ripple state.
//!
//! A [`Cell`] knows only its own coordinates and force buffers. Neighbour
//! access and queueing go through the owning [`Field`](crate::field::Field),
//! which passes neighbour sums in and decides what to enqueue afterwards.

use crate::field::FieldParams;
use crate::shade::ShadePalette;

/// One grid point: coordinates, double-buffered force and its rendered glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    x: usize,
    y: usize,
    current_force: f64,
    next_force: f64,
    pending_update: bool,
    glyph: char,
}

impl Cell {
    /// Creates a cell at rest showing `rest_glyph`.
    pub fn new(x: usize, y: usize, rest_glyph: char) -> Self {
        Self {
            x,
            y,
            current_force: 0.0,
            next_force: 0.0,
            pending_update: false,
            glyph: rest_glyph,
        }
    }

    /// Column of this cell.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Row of this cell.
    pub fn y(&self) -> usize {
        self.y
    }

    /// Last committed force.
    pub fn current_force(&self) -> f64 {
        self.current_force
    }

    /// Working buffer: the in-progress value during a tick, the previous
    /// committed value between ticks.
    pub fn next_force(&self) -> f64 {
        self.next_force
    }

    /// True while the cell sits in its field's recompute set.
    pub fn is_pending(&self) -> bool {
        self.pending_update
    }

    /// Glyph last rendered for this cell.
    pub fn glyph(&self) -> char {
        self.glyph
    }

    /// True if either buffer still carries energy.
    pub fn is_moving(&self) -> bool {
        self.current_force != 0.0 || self.next_force != 0.0
    }

    /// Overwrites the committed force and re-renders immediately.
    ///
    /// The field is responsible for enqueueing the 8 neighbours.
    pub fn apply_force(&mut self, magnitude: f64, palette: &ShadePalette) {
        self.current_force = magnitude;
        self.glyph = palette.glyph_for(magnitude);
    }

    /// Computes the working value from neighbour sums of committed forces.
    ///
    /// Damped wave step: the diagonal-weighted neighbour mean, doubled, minus
    /// the previous value held in the working buffer, times the dampening ratio.
    pub fn recompute(&mut self, cardinal_sum: f64, diagonal_sum: f64, params: &FieldParams) {
        let w = params.diagonal_weight;
        let average = (cardinal_sum + diagonal_sum * w) / (4.0 + 4.0 * w);
        self.next_force = (average * 2.0 - self.next_force) * params.dampening_ratio;
    }

    /// Snaps sub-cutoff values to zero, renders, and swaps the buffers.
    ///
    /// Returns true if the cell still carries energy afterwards, in which
    /// case the field keeps it and its neighbours in the next recompute pass.
    pub fn commit(&mut self, force_cutoff: f64, palette: &ShadePalette) -> bool {
        if self.next_force.abs() < force_cutoff {
            self.next_force = 0.0;
        }
        self.glyph = palette.glyph_for(self.next_force);
        std::mem::swap(&mut self.current_force, &mut self.next_force);
        self.is_moving()
    }

    /// Marks the cell as queued. Returns false if it already was.
    pub(crate) fn mark_pending(&mut self) -> bool {
        if self.pending_update {
            return false;
        }
        self.pending_update = true;
        true
    }

    /// Clears the queued flag as the recompute pass consumes the cell.
    pub(crate) fn clear_pending(&mut self) {
        self.pending_update = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FieldParams {
        FieldParams {
            dampening_ratio: 0.5,
            force_cutoff: 2.0,
            diagonal_weight: 0.5,
            max_ripple_strength: 100.0,
        }
    }

    #[test]
    fn new_cell_is_at_rest() {
        let cell = Cell::new(3, 4, ' ');
        assert_eq!((cell.x(), cell.y()), (3, 4));
        assert_eq!(cell.current_force(), 0.0);
        assert!(!cell.is_pending());
        assert!(!cell.is_moving());
        assert_eq!(cell.glyph(), ' ');
    }

    #[test]
    fn apply_force_sets_current_and_glyph() {
        let palette = ShadePalette::default();
        let mut cell = Cell::new(0, 0, ' ');
        cell.apply_force(100.0, &palette);
        assert_eq!(cell.current_force(), 100.0);
        assert_eq!(cell.glyph(), '@');
    }

    #[test]
    fn recompute_uses_weighted_average_and_previous_value() {
        let mut cell = Cell::new(1, 1, ' ');
        // cardinal 12, diagonal 8 at weight 0.5: (12 + 4) / 6 = 8/3; doubled 16/3; damped 8/3.
        cell.recompute(12.0, 8.0, &params());
        assert!((cell.next_force() - 8.0 / 3.0).abs() < 1e-12);
        // Second pass subtracts the working value left behind.
        cell.recompute(12.0, 8.0, &params());
        assert!((cell.next_force() - (16.0 / 3.0 - 8.0 / 3.0) * 0.5).abs() < 1e-12);
    }

    #[test]
    fn commit_swaps_buffers() {
        let palette = ShadePalette::default();
        let mut cell = Cell::new(0, 0, ' ');
        cell.apply_force(40.0, &palette);
        cell.recompute(0.0, 0.0, &params());
        cell.recompute(60.0, 0.0, &params());
        let pending = cell.next_force();
        assert!(cell.commit(2.0, &palette));
        assert_eq!(cell.current_force(), pending);
        assert_eq!(cell.next_force(), 40.0);
    }

    #[test]
    fn commit_snaps_sub_cutoff_values_to_zero() {
        let palette = ShadePalette::default();
        let mut cell = Cell::new(0, 0, ' ');
        // (4 / 6) * 2 * 0.5 = 0.67, below the cutoff of 2.
        cell.recompute(4.0, 0.0, &params());
        assert!(!cell.commit(2.0, &palette));
        assert_eq!(cell.current_force(), 0.0);
        assert_eq!(cell.glyph(), ' ');
    }

    #[test]
    fn commit_reports_motion_while_previous_value_remains() {
        let palette = ShadePalette::default();
        let mut cell = Cell::new(0, 0, ' ');
        cell.apply_force(30.0, &palette);
        // Working value stays 0, so after the swap current is 0 and previous 30.
        assert!(cell.commit(2.0, &palette));
        assert_eq!(cell.current_force(), 0.0);
        assert_eq!(cell.next_force(), 30.0);
    }

    #[test]
    fn mark_pending_is_idempotent_until_cleared() {
        let mut cell = Cell::new(0, 0, ' ');
        assert!(cell.mark_pending());
        assert!(!cell.mark_pending());
        cell.clear_pending();
        assert!(cell.mark_pending());
    }
}
