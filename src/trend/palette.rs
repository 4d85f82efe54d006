//! Line and map colours.

use crate::domain::Rgb;

/// Qualitative palette for transportation modes, indexed by mode position.
pub const LINE_PALETTE: [Rgb; 10] = [
    Rgb(0x63, 0x6E, 0xFA),
    Rgb(0xEF, 0x55, 0x3B),
    Rgb(0x00, 0xCC, 0x96),
    Rgb(0xAB, 0x63, 0xFA),
    Rgb(0xFF, 0xA1, 0x5A),
    Rgb(0x19, 0xD3, 0xF3),
    Rgb(0xFF, 0x66, 0x92),
    Rgb(0xB6, 0xE8, 0x80),
    Rgb(0xFF, 0x97, 0xFF),
    Rgb(0xFE, 0xCB, 0x52),
];

/// Sequential orange-yellow scale, reversed: deepest red for the lowest value.
const MAP_SCALE: [Rgb; 7] = [
    Rgb(238, 77, 90),
    Rgb(246, 99, 86),
    Rgb(249, 123, 87),
    Rgb(247, 148, 93),
    Rgb(243, 173, 106),
    Rgb(239, 196, 126),
    Rgb(236, 218, 154),
];

/// Colour for the mode at `index`; wraps around for more modes than colours.
pub fn mode_color(index: usize) -> Rgb {
    LINE_PALETTE[index % LINE_PALETTE.len()]
}

/// Colour of `value` on the map scale spanning `[min, max]`.
pub fn scale_color(value: f64, min: f64, max: f64) -> Rgb {
    let span = max - min;
    let u = if span.is_finite() && span > 0.0 && value.is_finite() {
        ((value - min) / span).clamp(0.0, 1.0)
    } else {
        0.5
    };

    let pos = u * (MAP_SCALE.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(MAP_SCALE.len() - 1);
    let t = pos - lo as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    let (a, b) = (MAP_SCALE[lo], MAP_SCALE[hi]);
    Rgb(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_three_modes_use_the_classic_colours() {
        assert_eq!(mode_color(0).hex(), "#636EFA");
        assert_eq!(mode_color(1).hex(), "#EF553B");
        assert_eq!(mode_color(2).hex(), "#00CC96");
        assert_eq!(mode_color(10), mode_color(0));
    }

    #[test]
    fn scale_endpoints_and_midpoint() {
        assert_eq!(scale_color(-80.0, -80.0, 20.0), MAP_SCALE[0]);
        assert_eq!(scale_color(20.0, -80.0, 20.0), MAP_SCALE[6]);
        assert_eq!(scale_color(-30.0, -80.0, 20.0), MAP_SCALE[3]);
        // Out-of-range values clamp.
        assert_eq!(scale_color(500.0, -80.0, 20.0), MAP_SCALE[6]);
    }

    #[test]
    fn degenerate_scale_uses_the_middle() {
        assert_eq!(scale_color(1.0, 5.0, 5.0), MAP_SCALE[3]);
        assert_eq!(scale_color(f64::NAN, 0.0, 1.0), MAP_SCALE[3]);
    }
}
