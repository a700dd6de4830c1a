//! 5x7 bitmap font for chart captions.
//!
//! Covers the Latin letters, digits and the punctuation used in chart
//! titles, axis labels and tick values. Letters are drawn in upper case;
//! characters outside the set advance like a space.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, one blank column included.
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Row bitmaps for `c`, top row first; bit 4 is the leftmost column.
pub fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        _ => [0; 7],
    }
}

/// Width in pixels of `text` drawn at `scale`, without trailing spacing.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * ADVANCE - 1) * scale
}

/// Lit pixels of `text` at `scale`, as `(dx, dy)` offsets from its top-left
/// corner.
pub fn lit_pixels(text: &str, scale: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
    text.chars().enumerate().flat_map(move |(i, c)| {
        let rows = glyph(c);
        let origin = i as u32 * ADVANCE * scale;
        (0..GLYPH_HEIGHT).flat_map(move |row| {
            (0..GLYPH_WIDTH)
                .filter(move |&col| (rows[row as usize] >> (GLYPH_WIDTH - 1 - col)) & 1 == 1)
                .flat_map(move |col| {
                    (0..scale * scale).map(move |k| {
                        (origin + col * scale + k % scale, row * scale + k / scale)
                    })
                })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 1), 11);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn test_lower_case_drawn_as_upper() {
        assert_eq!(glyph('r'), glyph('R'));
        assert_eq!(glyph('q'), glyph('Q'));
    }

    #[test]
    fn test_caption_characters_are_covered() {
        let captions = [
            "Simulated Returns Distribution (Frame 990)",
            "Frequency",
            "Portfolio Returns",
            "Benchmark Returns",
            "-0.25",
        ];
        for c in captions.iter().flat_map(|s| s.chars()).filter(|c| *c != ' ') {
            assert_ne!(glyph(c), [0; 7], "no glyph for {:?}", c);
        }
    }

    #[test]
    fn test_lit_pixels_stay_inside_box() {
        let text = "Frame 10";
        let width = text_width(text, 3);
        let pixels: Vec<_> = lit_pixels(text, 3).collect();
        assert!(!pixels.is_empty());
        assert!(pixels
            .iter()
            .all(|&(x, y)| x < width && y < GLYPH_HEIGHT * 3));
    }

    #[test]
    fn test_scale_multiplies_lit_area() {
        let single = lit_pixels("8", 1).count();
        assert_eq!(lit_pixels("8", 2).count(), single * 4);
        assert_eq!(lit_pixels(" ", 2).count(), 0);
    }
}
