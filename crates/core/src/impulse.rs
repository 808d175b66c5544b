//! Force injection shapes and the seam ambient policies inject through.

/// A force injection centred on one cell.
///
/// Radius 0 is a single-cell ripple. Larger radii cover every cell within
/// Euclidean distance `radius + 0.5`, each receiving
/// `strength * max(falloff_floor, 1 - distance / (radius + 1))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub strength: f64,
    pub radius: usize,
    pub falloff_floor: f64,
}

impl Impulse {
    /// Single-cell injection at full `strength`.
    pub fn point(strength: f64) -> Self {
        Self {
            strength,
            radius: 0,
            falloff_floor: 0.0,
        }
    }

    /// Round injection decaying from the centre towards `falloff_floor`.
    pub fn splash(strength: f64, radius: usize, falloff_floor: f64) -> Self {
        Self {
            strength,
            radius,
            falloff_floor,
        }
    }

    /// Strength delivered at offset `(dx, dy)`, or `None` outside the shape.
    pub fn strength_at(&self, dx: isize, dy: isize) -> Option<f64> {
        let distance = ((dx * dx + dy * dy) as f64).sqrt();
        let r = self.radius as f64;
        if distance > r + 0.5 {
            return None;
        }
        let falloff = (1.0 - distance / (r + 1.0)).max(self.falloff_floor);
        Some(self.strength * falloff)
    }

    /// Every covered offset with its delivered strength, row by row.
    pub fn offsets(&self) -> impl Iterator<Item = (isize, isize, f64)> + '_ {
        let r = self.radius as isize;
        (-r..=r).flat_map(move |dy| {
            (-r..=r).filter_map(move |dx| self.strength_at(dx, dy).map(|s| (dx, dy, s)))
        })
    }
}

/// Anything a ripple can be injected into.
///
/// Implemented by [`Field`](crate::field::Field); ambient policies only see
/// this trait, never field internals.
pub trait ForceTarget {
    /// Grid width in cells.
    fn cols(&self) -> usize;

    /// Grid height in cells.
    fn rows(&self) -> usize;

    /// Injects `impulse` centred on `(x, y)`. Cells outside the grid are
    /// skipped. Returns how many cells received force.
    fn apply_force_at(&mut self, x: isize, y: isize, impulse: Impulse) -> usize;
}
