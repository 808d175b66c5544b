//! Ordered glyph palette that turns a force magnitude into a visible shade.
//!
//! Magnitudes are clamped to [0, [`FORCE_SCALE`]], normalized, eased by a
//! sub-linear exponent so mid-range ripples stay visible, then mapped to a
//! glyph by nearest-rank index. One palette is shared by every cell of a
//! [`Field`](crate::field::Field).

use crate::error::PuddleError;

/// Upper bound of the displayable force range.
pub const FORCE_SCALE: f64 = 100.0;

/// Default glyph ramp, from calm water to a full crest.
pub const DEFAULT_SHADES: &str = " .,:-=+*#%@";

/// Default easing exponent applied to the normalized magnitude.
pub const DEFAULT_SHADE_EXPONENT: f64 = 0.6;

/// An ordered, non-empty sequence of glyphs plus the easing exponent.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadePalette {
    glyphs: Vec<char>,
    exponent: f64,
}

impl ShadePalette {
    /// Creates a palette from the characters of `shades`.
    ///
    /// Requires at least one glyph and a finite exponent in (0, 1].
    pub fn new(shades: &str, exponent: f64) -> Result<Self, PuddleError> {
        let glyphs: Vec<char> = shades.chars().collect();
        if glyphs.is_empty() {
            return Err(PuddleError::InvalidPalette(
                "palette requires at least 1 glyph".to_string(),
            ));
        }
        if !exponent.is_finite() || exponent <= 0.0 || exponent > 1.0 {
            return Err(PuddleError::InvalidPalette(format!(
                "exponent must be in (0, 1], got {exponent}"
            )));
        }
        Ok(Self { glyphs, exponent })
    }

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The easing exponent.
    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Glyph shown for a cell at rest.
    pub fn bottom(&self) -> char {
        self.glyphs[0]
    }

    /// Glyph shown for a full-strength crest.
    pub fn top(&self) -> char {
        self.glyphs[self.glyphs.len() - 1]
    }

    /// All glyphs in rank order.
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Rank of the glyph for `magnitude`.
    ///
    /// Negative magnitudes (troughs) render as rest; NaN renders as rest.
    /// Monotonic non-decreasing in `magnitude`.
    pub fn index_for(&self, magnitude: f64) -> usize {
        let n = self.glyphs.len();
        if n == 1 || magnitude.is_nan() {
            return 0;
        }
        let t = (magnitude.clamp(0.0, FORCE_SCALE) / FORCE_SCALE).powf(self.exponent);
        ((t * (n - 1) as f64).ceil() as usize).min(n - 1)
    }

    /// Glyph for `magnitude`.
    pub fn glyph_for(&self, magnitude: f64) -> char {
        self.glyphs[self.index_for(magnitude)]
    }
}

impl Default for ShadePalette {
    fn default() -> Self {
        Self::new(DEFAULT_SHADES, DEFAULT_SHADE_EXPONENT)
            .expect("default shade ramp is non-empty with a valid exponent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_eleven_glyphs() {
        let p = ShadePalette::default();
        assert_eq!(p.len(), 11);
        assert_eq!(p.bottom(), ' ');
        assert_eq!(p.top(), '@');
    }

    #[test]
    fn new_rejects_empty_shades() {
        assert!(matches!(
            ShadePalette::new("", 0.6),
            Err(PuddleError::InvalidPalette(_))
        ));
    }

    #[test]
    fn new_rejects_bad_exponent() {
        assert!(ShadePalette::new(" .#", 0.0).is_err());
        assert!(ShadePalette::new(" .#", 1.5).is_err());
        assert!(ShadePalette::new(" .#", f64::NAN).is_err());
    }

    #[test]
    fn zero_and_negative_render_as_rest() {
        let p = ShadePalette::default();
        assert_eq!(p.glyph_for(0.0), ' ');
        assert_eq!(p.glyph_for(-40.0), ' ');
        assert_eq!(p.glyph_for(f64::NAN), ' ');
    }

    #[test]
    fn full_scale_and_beyond_render_as_top() {
        let p = ShadePalette::default();
        assert_eq!(p.glyph_for(100.0), '@');
        assert_eq!(p.glyph_for(250.0), '@');
    }

    #[test]
    fn any_positive_force_leaves_rest() {
        let p = ShadePalette::default();
        assert_ne!(p.glyph_for(0.01), ' ');
    }

    #[test]
    fn easing_lifts_mid_range() {
        // Linear mapping would put 25 at rank 3 (ceil 2.5); easing pushes it higher.
        let p = ShadePalette::default();
        assert!(p.index_for(25.0) > 3, "got {}", p.index_for(25.0));
    }

    #[test]
    fn linear_exponent_matches_threshold_ranks() {
        let p = ShadePalette::new(" .,:-=+*#%@", 1.0).unwrap();
        assert_eq!(p.index_for(10.0), 1);
        assert_eq!(p.index_for(10.5), 2);
        assert_eq!(p.index_for(50.0), 5);
    }

    #[test]
    fn single_glyph_palette_always_returns_it() {
        let p = ShadePalette::new("~", 0.5).unwrap();
        assert_eq!(p.glyph_for(0.0), '~');
        assert_eq!(p.glyph_for(100.0), '~');
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn index_is_monotonic(a in 0.0_f64..=100.0, b in 0.0_f64..=100.0, exp in 0.05_f64..=1.0) {
                let p = ShadePalette::new(DEFAULT_SHADES, exp).unwrap();
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(
                    p.index_for(lo) <= p.index_for(hi),
                    "index({lo}) = {} > index({hi}) = {}",
                    p.index_for(lo),
                    p.index_for(hi)
                );
            }

            #[test]
            fn index_always_in_range(m in prop::num::f64::ANY) {
                let p = ShadePalette::default();
                prop_assert!(p.index_for(m) < p.len());
            }
        }
    }
}
