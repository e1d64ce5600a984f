//! Tile value model: how a tile value looks on screen.
//!
//! Pure lookups keyed by the tile exponent; nothing here knows about layout.

use std::fmt::Write;

use arrayvec::ArrayString;

use crate::fb::{CellStyle, Rgb};
use crate::types::Tile;

const DARK_TEXT: Rgb = Rgb::new(119, 110, 101);
const LIGHT_TEXT: Rgb = Rgb::new(249, 246, 242);

/// Background of an empty cell.
pub const EMPTY_STYLE: CellStyle = CellStyle::new(Rgb::new(90, 84, 78), Rgb::new(60, 56, 52));

// Indexed by exponent: 2^1 .. 2^11.
const PALETTE: [Rgb; 11] = [
    Rgb::new(238, 228, 218),
    Rgb::new(237, 224, 200),
    Rgb::new(242, 177, 121),
    Rgb::new(245, 149, 99),
    Rgb::new(246, 124, 95),
    Rgb::new(246, 94, 59),
    Rgb::new(237, 207, 114),
    Rgb::new(237, 204, 97),
    Rgb::new(237, 200, 80),
    Rgb::new(237, 197, 63),
    Rgb::new(237, 194, 46),
];

const BEYOND: Rgb = Rgb::new(60, 58, 50);

/// Style for a tile value; `0` gives [`EMPTY_STYLE`].
pub fn tile_style(value: Tile) -> CellStyle {
    if value == 0 {
        return EMPTY_STYLE;
    }
    let exponent = value.trailing_zeros() as usize;
    let bg = PALETTE.get(exponent.wrapping_sub(1)).copied().unwrap_or(BEYOND);
    let fg = if exponent <= 2 { DARK_TEXT } else { LIGHT_TEXT };
    CellStyle::new(fg, bg).bold()
}

/// Compact label: values up to 4 digits verbatim, then `k`/`M` suffixes
/// (16384 → `16k`, 131072 → `128k`). Empty cells have an empty label.
pub fn tile_label(value: Tile) -> ArrayString<8> {
    let mut out = ArrayString::new();
    // Every label fits in 8 bytes, so the write cannot fail.
    let _ = if value == 0 {
        Ok(())
    } else if value < 10_000 {
        write!(out, "{value}")
    } else if value < 1 << 20 {
        write!(out, "{}k", value >> 10)
    } else {
        write!(out, "{}M", value >> 20)
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(tile_label(0).as_str(), "");
        assert_eq!(tile_label(2).as_str(), "2");
        assert_eq!(tile_label(2048).as_str(), "2048");
        assert_eq!(tile_label(8192).as_str(), "8192");
        assert_eq!(tile_label(16384).as_str(), "16k");
        assert_eq!(tile_label(131072).as_str(), "128k");
        assert_eq!(tile_label(1 << 20).as_str(), "1M");
        assert_eq!(tile_label(1 << 31).as_str(), "2048M");
    }

    #[test]
    fn test_styles_by_exponent() {
        assert_eq!(tile_style(0), EMPTY_STYLE);
        assert_eq!(tile_style(2).fg, DARK_TEXT);
        assert_eq!(tile_style(8).fg, LIGHT_TEXT);
        assert_eq!(tile_style(2048).bg, Rgb::new(237, 194, 46));
        assert_eq!(tile_style(4096).bg, BEYOND);
        assert_ne!(tile_style(2).bg, tile_style(4).bg);
        assert!(tile_style(16).bold);
    }
}
