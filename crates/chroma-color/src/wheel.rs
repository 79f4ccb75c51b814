//! Hue wheel geometry
//!
//! Maps points on a circular hue/saturation picker to HSL values and back.
//! Offsets are measured from the wheel centre in screen coordinates
//! (y grows downwards). Hue 0 (red) sits on the left edge, and saturation
//! grows linearly from 0 at the centre to 100 on the rim.

use crate::color::{Hsl, Rgb};
use crate::convert::hsl_to_rgb;

/// Lightness used when painting the wheel.
pub const WHEEL_LIGHTNESS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueWheel {
    radius: f64,
}

impl HueWheel {
    /// Create a wheel with the given radius in pixels.
    ///
    /// Non-positive or non-finite radii are replaced by 1.0 so that the
    /// geometry never divides by zero.
    pub fn new(radius: f64) -> Self {
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            1.0
        };
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Hue and saturation under the offset `(dx, dy)`, or `None` outside the rim.
    pub fn pick(&self, dx: f64, dy: f64) -> Option<(f64, f64)> {
        let distance = dx.hypot(dy);
        if !(distance <= self.radius) {
            return None;
        }

        let hue = (180.0 - dy.atan2(dx).to_degrees()).rem_euclid(360.0);
        let saturation = distance / self.radius * 100.0;
        Some((hue, saturation))
    }

    /// Offset of the selection marker for a hue/saturation pair.
    ///
    /// Saturation is clamped to the rim.
    pub fn marker(&self, hue: f64, saturation: f64) -> (f64, f64) {
        let angle = (180.0 - hue).to_radians();
        let distance = (saturation / 100.0).clamp(0.0, 1.0) * self.radius;
        (distance * angle.cos(), distance * angle.sin())
    }

    /// Marker offset for a full HSL color (lightness is ignored).
    pub fn marker_for(&self, hsl: Hsl) -> (f64, f64) {
        self.marker(hsl.h, hsl.s)
    }

    /// Color painted at `(dx, dy)`, or `None` outside the rim.
    pub fn swatch(&self, dx: f64, dy: f64) -> Option<Rgb> {
        self.pick(dx, dy)
            .map(|(hue, saturation)| hsl_to_rgb(Hsl::new(hue, saturation, WHEEL_LIGHTNESS)))
    }
}

impl Default for HueWheel {
    /// The 200 px picker: radius 90 leaves a 10 px margin.
    fn default() -> Self {
        Self::new(90.0)
    }
}
