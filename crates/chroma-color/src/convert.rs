//! Conversions between RGB, CMYKW and HSL
//!
//! All functions are pure and never fail. Rounding is always to the
//! nearest integer, half away from zero (`f64::round`), in every function.
//!
//! RGB <-> CMYKW is deliberately lossy: CMYKW is a device-control
//! representation derived from RGB, so only the pure black and pure white
//! extremes round-trip exactly.

use crate::color::{Cmykw, Hsl, Rgb};

/// Scale a 0.0..=1.0 fraction to a rounded percentage.
#[inline]
fn to_percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Scale a 0.0..=1.0 fraction to a rounded, clamped 8-bit channel.
#[inline]
fn to_channel(fraction: f64) -> u8 {
    (fraction * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert an RGB color to CMYKW ink percentages.
///
/// Pure white maps to the white channel only and pure black to the key
/// channel only. Every other color has `w == 0` and channels in 0..=100.
///
/// ```
/// use chroma_color::{rgb_to_cmykw, Cmykw, Rgb};
/// assert_eq!(rgb_to_cmykw(Rgb::WHITE), Cmykw::WHITE);
/// assert_eq!(rgb_to_cmykw(Rgb::new(0, 255, 255)), Cmykw::new(100, 0, 0, 0, 0));
/// ```
pub fn rgb_to_cmykw(rgb: Rgb) -> Cmykw {
    if rgb == Rgb::WHITE {
        return Cmykw::WHITE;
    }
    if rgb == Rgb::BLACK {
        return Cmykw::BLACK;
    }

    let c0 = 1.0 - f64::from(rgb.r) / 255.0;
    let m0 = 1.0 - f64::from(rgb.g) / 255.0;
    let y0 = 1.0 - f64::from(rgb.b) / 255.0;
    let k = c0.min(m0).min(y0);

    let (c, m, y) = if k < 1.0 {
        (
            (c0 - k) / (1.0 - k),
            (m0 - k) / (1.0 - k),
            (y0 - k) / (1.0 - k),
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    Cmykw::new(to_percent(c), to_percent(m), to_percent(y), to_percent(k), 0)
}

/// Convert CMYKW ink percentages to RGB.
///
/// Any non-zero white channel yields pure white. Channels above 100 are
/// not rejected; the result is clamped into 0..=255.
pub fn cmykw_to_rgb(cmykw: Cmykw) -> Rgb {
    if cmykw.is_white() {
        return Rgb::WHITE;
    }

    let c = f64::from(cmykw.c) / 100.0;
    let m = f64::from(cmykw.m) / 100.0;
    let y = f64::from(cmykw.y) / 100.0;
    let k = f64::from(cmykw.k) / 100.0;

    Rgb::new(
        to_channel((1.0 - c) * (1.0 - k)),
        to_channel((1.0 - m) * (1.0 - k)),
        to_channel((1.0 - y) * (1.0 - k)),
    )
}

/// Convert RGB to HSL (hue in 0.0..360.0, saturation and lightness in 0.0..=100.0).
///
/// Achromatic colors get `h == s == 0`.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }

    let delta = max - min;
    let s = if l <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsl::new(h * 60.0, s * 100.0, l * 100.0)
}

/// Blend one channel from a hue position `t` measured in turns.
fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Convert HSL to RGB.
///
/// The hue wraps modulo 360; saturation and lightness are clamped into
/// 0..=100 before conversion.
///
/// ```
/// use chroma_color::{hsl_to_rgb, Hsl, Rgb};
/// assert_eq!(hsl_to_rgb(Hsl::new(120.0, 100.0, 50.0)), Rgb::new(0, 255, 0));
/// assert_eq!(hsl_to_rgb(Hsl::new(480.0, 100.0, 50.0)), Rgb::new(0, 255, 0));
/// ```
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h.rem_euclid(360.0) / 360.0;
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        let v = to_channel(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb::new(
        to_channel(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_channel(p, q, h)),
        to_channel(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

impl From<Rgb> for Cmykw {
    fn from(rgb: Rgb) -> Self {
        rgb_to_cmykw(rgb)
    }
}

impl From<Cmykw> for Rgb {
    fn from(cmykw: Cmykw) -> Self {
        cmykw_to_rgb(cmykw)
    }
}

impl From<Rgb> for Hsl {
    fn from(rgb: Rgb) -> Self {
        rgb_to_hsl(rgb)
    }
}

impl From<Hsl> for Rgb {
    fn from(hsl: Hsl) -> Self {
        hsl_to_rgb(hsl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_cmykw_special_cases() {
        assert_eq!(rgb_to_cmykw(Rgb::new(255, 255, 255)), Cmykw::new(0, 0, 0, 0, 100));
        assert_eq!(rgb_to_cmykw(Rgb::new(0, 0, 0)), Cmykw::new(0, 0, 0, 100, 0));
    }

    #[test]
    fn test_rgb_to_cmykw_primaries() {
        assert_eq!(rgb_to_cmykw(Rgb::new(255, 0, 0)), Cmykw::new(0, 100, 100, 0, 0));
        assert_eq!(rgb_to_cmykw(Rgb::new(0, 255, 0)), Cmykw::new(100, 0, 100, 0, 0));
        assert_eq!(rgb_to_cmykw(Rgb::new(0, 0, 255)), Cmykw::new(100, 100, 0, 0, 0));
    }

    #[test]
    fn test_rgb_to_cmykw_gray_is_key_only() {
        // 1 - 128/255 = 0.498 -> 50%
        assert_eq!(rgb_to_cmykw(Rgb::new(128, 128, 128)), Cmykw::new(0, 0, 0, 50, 0));
    }

    #[test]
    fn test_rgb_to_cmykw_gold() {
        // k = 1 - 212/255 = 0.1686; m = (0.3137 - 0.1686) / 0.8314 = 0.1745
        // y = (0.7843 - 0.1686) / 0.8314 = 0.7406
        assert_eq!(rgb_to_cmykw(Rgb::new(212, 175, 55)), Cmykw::new(0, 17, 74, 17, 0));
    }

    #[test]
    fn test_cmykw_to_rgb_white_override() {
        assert_eq!(cmykw_to_rgb(Cmykw::new(100, 100, 100, 100, 1)), Rgb::WHITE);
        assert_eq!(cmykw_to_rgb(Cmykw::new(0, 0, 0, 0, 100)), Rgb::WHITE);
    }

    #[test]
    fn test_cmykw_to_rgb_general() {
        assert_eq!(cmykw_to_rgb(Cmykw::new(0, 100, 100, 0, 0)), Rgb::new(255, 0, 0));
        assert_eq!(cmykw_to_rgb(Cmykw::new(0, 0, 0, 100, 0)), Rgb::BLACK);
        // 255 * 0.5 = 127.5 rounds away from zero
        assert_eq!(cmykw_to_rgb(Cmykw::new(0, 0, 0, 50, 0)), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_cmykw_to_rgb_clamps_out_of_range_input() {
        // 150% cyan would give a negative red channel
        assert_eq!(cmykw_to_rgb(Cmykw::new(150, 0, 0, 0, 0)), Rgb::new(0, 255, 255));
        // two out-of-range factors multiply back to a positive value above 255
        assert_eq!(cmykw_to_rgb(Cmykw::new(255, 0, 0, 255, 0)), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_rgb_to_hsl_known_values() {
        assert_eq!(rgb_to_hsl(Rgb::new(255, 0, 0)), Hsl::new(0.0, 100.0, 50.0));
        assert_eq!(rgb_to_hsl(Rgb::new(0, 0, 0)), Hsl::new(0.0, 0.0, 0.0));
        assert_eq!(rgb_to_hsl(Rgb::new(255, 255, 255)), Hsl::new(0.0, 0.0, 100.0));
        assert_eq!(rgb_to_hsl(Rgb::new(0, 255, 0)).rounded(), (120, 100, 50));
        assert_eq!(rgb_to_hsl(Rgb::new(0, 0, 255)).rounded(), (240, 100, 50));
        // red max with g < b wraps into the top of the hue range
        assert_eq!(rgb_to_hsl(Rgb::new(255, 0, 128)).rounded(), (330, 100, 50));
    }

    #[test]
    fn test_rgb_to_hsl_light_saturation_branch() {
        // l > 0.5 uses delta / (2 - max - min)
        let hsl = rgb_to_hsl(Rgb::new(255, 128, 128));
        assert_eq!(hsl.rounded(), (0, 100, 75));
    }

    #[test]
    fn test_hsl_to_rgb_known_values() {
        assert_eq!(hsl_to_rgb(Hsl::new(120.0, 100.0, 50.0)), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 100.0, 50.0)), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(240.0, 100.0, 50.0)), Rgb::new(0, 0, 255));
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 0.0, 100.0)), Rgb::WHITE);
        assert_eq!(hsl_to_rgb(Hsl::new(200.0, 0.0, 50.0)), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_hsl_to_rgb_wraps_and_clamps() {
        assert_eq!(
            hsl_to_rgb(Hsl::new(-240.0, 100.0, 50.0)),
            hsl_to_rgb(Hsl::new(120.0, 100.0, 50.0))
        );
        assert_eq!(
            hsl_to_rgb(Hsl::new(720.0, 250.0, 50.0)),
            hsl_to_rgb(Hsl::new(0.0, 100.0, 50.0))
        );
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 50.0, -20.0)), Rgb::BLACK);
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 50.0, 180.0)), Rgb::WHITE);
    }

    #[test]
    fn test_hsl_to_rgb_non_finite_does_not_panic() {
        let _ = hsl_to_rgb(Hsl::new(f64::NAN, 50.0, 50.0));
        let _ = hsl_to_rgb(Hsl::new(f64::INFINITY, f64::NAN, 50.0));
    }

    #[test]
    fn test_from_impls_delegate() {
        let rgb = Rgb::new(10, 200, 30);
        assert_eq!(Cmykw::from(rgb), rgb_to_cmykw(rgb));
        assert_eq!(Hsl::from(rgb), rgb_to_hsl(rgb));
        assert_eq!(Rgb::from(Cmykw::BLACK), Rgb::BLACK);
        assert_eq!(Rgb::from(Hsl::new(0.0, 0.0, 0.0)), Rgb::BLACK);
    }
}
