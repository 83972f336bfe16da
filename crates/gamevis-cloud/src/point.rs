//! Points and clouds

use gamevis_core::ColorTriple;

/// Position + 8-bit color
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointXyzRgb {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PointXyzRgb {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    pub fn with_rgb(mut self, r: u8, g: u8, b: u8) -> Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self
    }

    /// Packed `0x00RRGGBB`
    #[inline]
    pub fn packed_rgb(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub fn set_packed_rgb(&mut self, rgb: u32) {
        self.r = ((rgb >> 16) & 0xff) as u8;
        self.g = ((rgb >> 8) & 0xff) as u8;
        self.b = (rgb & 0xff) as u8;
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// A colored point cloud
///
/// Organized clouds have `height > 1`; everything produced by appending is
/// unorganized (`height == 1`, `width == len`).
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub points: Vec<PointXyzRgb>,
    pub width: u32,
    pub height: u32,
    pub is_dense: bool,
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloud {
    /// Empty unorganized cloud
    pub fn new() -> Self {
        PointCloud {
            points: Vec::new(),
            width: 0,
            height: 1,
            is_dense: true,
        }
    }

    pub fn from_points(points: Vec<PointXyzRgb>) -> Self {
        let mut cloud = PointCloud {
            points,
            width: 0,
            height: 1,
            is_dense: true,
        };
        cloud.reshape_unorganized();
        cloud
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: PointXyzRgb) {
        self.points.push(point);
        self.reshape_unorganized();
    }

    /// Recolor every point to one color
    pub fn paint(&mut self, color: ColorTriple) {
        let (r, g, b) = color.to_point_rgb();
        for p in &mut self.points {
            p.r = r;
            p.g = g;
            p.b = b;
        }
    }

    /// Concatenate another cloud onto this one
    pub fn append(&mut self, other: &PointCloud) {
        self.points.extend_from_slice(&other.points);
        self.is_dense &= other.is_dense;
        self.reshape_unorganized();
    }

    /// True when every point has exactly this color
    pub fn is_uniform(&self, color: ColorTriple) -> bool {
        let rgb = color.to_point_rgb();
        self.points.iter().all(|p| p.rgb() == rgb)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointXyzRgb> {
        self.points.iter()
    }

    fn reshape_unorganized(&mut self) {
        self.width = self.points.len() as u32;
        self.height = 1;
    }
}

impl FromIterator<PointXyzRgb> for PointCloud {
    fn from_iter<I: IntoIterator<Item = PointXyzRgb>>(iter: I) -> Self {
        PointCloud::from_points(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(n: usize) -> PointCloud {
        (0..n).map(|i| PointXyzRgb::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_paint() {
        let mut cloud = line(5);
        let color = ColorTriple::new(10, 20, 30);
        cloud.paint(color);
        assert!(cloud.is_uniform(color));
        assert_eq!(cloud.points[3].rgb(), (10, 20, 30));
        assert_eq!(cloud.points[3].x, 3.0);
    }

    #[test]
    fn test_append_accumulates() {
        let mut cloud = line(3);
        cloud.append(&line(4));
        assert_eq!(cloud.len(), 7);
        assert_eq!(cloud.width, 7);
        assert_eq!(cloud.height, 1);
    }

    #[test]
    fn test_packed_rgb() {
        let mut p = PointXyzRgb::new(0.0, 0.0, 0.0).with_rgb(0x12, 0x34, 0x56);
        assert_eq!(p.packed_rgb(), 0x0012_3456);
        p.set_packed_rgb(0xff00_ff00);
        assert_eq!(p.rgb(), (0x00, 0xff, 0x00));
    }

    proptest! {
        #[test]
        fn prop_append_adds_lengths(a in 0usize..200, b in 0usize..200, r in any::<u8>()) {
            let mut left = line(a);
            left.paint(ColorTriple::from_u8(r, 0, 0));
            let right = line(b);
            left.append(&right);
            prop_assert_eq!(left.len(), a + b);
            prop_assert_eq!(left.width as usize, a + b);
            prop_assert_eq!(left.height, 1);
            prop_assert!(left.points[..a].iter().all(|p| p.rgb() == (r, 0, 0)));
        }
    }
}
