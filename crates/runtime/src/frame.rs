//! Text frames from a [`Field`]'s rendered glyphs.

use puddle_core::{Cell, Field};

/// One string per grid row, left to right.
pub fn render_rows(field: &Field) -> Vec<String> {
    field
        .cells()
        .chunks(field.cols())
        .map(|row| row.iter().map(Cell::glyph).collect())
        .collect()
}

/// The whole grid as newline-separated rows (no trailing newline).
pub fn render_text(field: &Field) -> String {
    render_rows(field).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use puddle_core::{FieldParams, ShadePalette};

    fn field(cols: usize, rows: usize) -> Field {
        Field::new(cols, rows, FieldParams::default(), ShadePalette::default()).unwrap()
    }

    #[test]
    fn rows_match_dimensions() {
        let rows = render_rows(&field(7, 3));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.chars().count() == 7));
    }

    #[test]
    fn resting_field_is_blank() {
        assert_eq!(render_text(&field(3, 2)), "   \n   ");
    }

    #[test]
    fn crest_shows_top_glyph_in_place() {
        let mut f = field(5, 3);
        f.apply_force(3, 1, 100.0);
        let rows = render_rows(&f);
        assert_eq!(rows[1], "   @ ");
        assert_eq!(rows[0], "     ");
    }
}
