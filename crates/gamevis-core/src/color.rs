//! Colors for point clouds and markers
//!
//! Entity colors are 8-bit intensity triples. They are held as `i16` because
//! interactive input may legitimately carry an unchecked value into the first
//! two channels; narrowing to 8 bits happens when points are painted.

use serde::{Deserialize, Serialize};

/// RGB intensity triple owned by one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorTriple {
    pub r: i16,
    pub g: i16,
    pub b: i16,
}

impl ColorTriple {
    pub const fn new(r: i16, g: i16, b: i16) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as i16, g as i16, b as i16)
    }

    /// Whether every channel is a valid 8-bit intensity
    pub fn is_in_range(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0..=255).contains(c))
    }

    /// Narrow to the 8-bit channels stored on points (truncating)
    pub fn to_point_rgb(&self) -> (u8, u8, u8) {
        (self.r as u8, self.g as u8, self.b as u8)
    }

    /// Marker tint: channels divided by 255, full opacity.
    /// Out-of-range channels are not clamped.
    pub fn normalized(&self) -> ColorRgba {
        ColorRgba {
            r: self.r as f32 / 255.0,
            g: self.g as f32 / 255.0,
            b: self.b as f32 / 255.0,
            a: 1.0,
        }
    }
}

impl From<[u8; 3]> for ColorTriple {
    fn from(c: [u8; 3]) -> Self {
        ColorTriple::from_u8(c[0], c[1], c[2])
    }
}

/// Floating point RGBA color (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    pub const TRANSPARENT: ColorRgba = ColorRgba::new(0.0, 0.0, 0.0, 0.0);
    pub const NEUTRAL_GRAY: ColorRgba = ColorRgba::new(0.5, 0.5, 0.5, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_in_range_triples_normalize_to_unit(r in 0i16..=255, g in 0i16..=255, b in 0i16..=255) {
            let c = ColorTriple::new(r, g, b);
            prop_assert!(c.is_in_range());
            let n = c.normalized();
            for v in [n.r, n.g, n.b] {
                prop_assert!((0.0..=1.0).contains(&v));
            }
            prop_assert_eq!(c.to_point_rgb(), (r as u8, g as u8, b as u8));
        }
    }

    #[test]
    fn test_normalized_palette() {
        let c = ColorTriple::new(102, 194, 165).normalized();
        assert!((c.r - 102.0 / 255.0).abs() < 1e-6);
        assert!((c.g - 194.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 165.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_range_and_narrowing() {
        let ok = ColorTriple::new(0, 128, 255);
        assert!(ok.is_in_range());
        assert_eq!(ok.to_point_rgb(), (0, 128, 255));

        let wide = ColorTriple::new(300, 20, 30);
        assert!(!wide.is_in_range());
        assert_eq!(wide.to_point_rgb(), (44, 20, 30));
    }

    #[test]
    fn test_gray_with_alpha() {
        let c = ColorRgba::NEUTRAL_GRAY.with_alpha(0.25);
        assert_eq!(c, ColorRgba::new(0.5, 0.5, 0.5, 0.25));
    }
}
