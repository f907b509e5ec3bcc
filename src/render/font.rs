//! Built-in 3x5 bitmap font for axis labels.
//!
//! Covers digits, capital letters and the symbols used by chart labels.
//! Lowercase input is drawn with the uppercase glyphs.

/// Glyph cell columns.
pub const GLYPH_COLUMNS: usize = 3;

/// Glyph cell rows.
pub const GLYPH_ROWS: usize = 5;

/// Horizontal advance per character, in cells (glyph plus one cell spacing).
const ADVANCE_CELLS: f32 = 4.0;

/// Font size to cell size ratio.
const CELLS_PER_EM: f32 = 6.0;

/// Size of a laid-out string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtents {
    /// Ink width.
    pub width: f32,
    /// Ink height (cap height).
    pub height: f32,
    /// Distance the current point moves after showing the text.
    pub x_advance: f32,
}

/// Edge length of one glyph cell at `font_size`.
#[must_use]
pub fn cell_size(font_size: f32) -> f32 {
    font_size / CELLS_PER_EM
}

/// Measure `text` at `font_size`.
#[must_use]
pub fn measure(text: &str, font_size: f32) -> TextExtents {
    let cell = cell_size(font_size);
    let count = text.chars().count() as f32;
    if count == 0.0 {
        return TextExtents::default();
    }
    TextExtents {
        width: (count * ADVANCE_CELLS - 1.0) * cell,
        height: GLYPH_ROWS as f32 * cell,
        x_advance: count * ADVANCE_CELLS * cell,
    }
}

/// Horizontal offset of the `index`-th character, in cells.
#[must_use]
pub fn char_offset_cells(index: usize) -> f32 {
    index as f32 * ADVANCE_CELLS
}

/// Row bitmaps for `c`, top row first, most significant of the low three bits
/// is the left column. Returns `None` for characters without a glyph.
#[must_use]
pub fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
    let rows = match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '°' => [0b010, 0b101, 0b010, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => [0; GLYPH_ROWS],
        _ => return None,
    };
    Some(rows)
}

/// Lit cells of `c` as `(column, row)` pairs.
pub fn lit_cells(c: char) -> impl Iterator<Item = (usize, usize)> {
    let rows = glyph(c).unwrap_or([0; GLYPH_ROWS]);
    (0..GLYPH_ROWS).flat_map(move |row| {
        (0..GLYPH_COLUMNS)
            .filter(move |col| rows[row] & (0b100 >> col) != 0)
            .map(move |col| (col, row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_scales_with_length() {
        let one = measure("0", 12.0);
        let three = measure("100", 12.0);
        assert!(three.width > one.width);
        assert!((three.x_advance - 3.0 * one.x_advance).abs() < 1e-4);
        assert!((one.height - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_measure_empty() {
        assert_eq!(measure("", 10.0), TextExtents::default());
    }

    #[test]
    fn test_lowercase_uses_uppercase_glyph() {
        assert_eq!(glyph('t'), glyph('T'));
        assert!(glyph('~').is_none());
    }

    #[test]
    fn test_lit_cells_of_one() {
        let cells: Vec<_> = lit_cells('1').collect();
        // 1 + 2 + 1 + 1 + 3 lit cells
        assert_eq!(cells.len(), 8);
        assert!(cells.contains(&(1, 0)));
        assert!(cells.contains(&(0, 4)));
    }

    #[test]
    fn test_every_label_character_has_a_glyph() {
        for c in "Temperature Duty 0123456789°C%".chars() {
            assert!(glyph(c).is_some(), "missing glyph for {c:?}");
        }
    }
}
