//! Bounding-box types and coordinate denormalization.

use serde::{Deserialize, Serialize};

use crate::dimensions::PageDimensions;

/// A normalized bounding box: all fields are fractions of the page size,
/// in `[0, 1]`, independent of pixel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormBox {
    /// Distance from the left page edge
    pub left: f64,

    /// Distance from the top page edge
    pub top: f64,

    /// Box width
    pub width: f64,

    /// Box height
    pub height: f64,
}

impl NormBox {
    /// Create a normalized box.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (`left + width`).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (`top + height`).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the box has positive extent and non-negative origin.
    /// Boxes failing this are dropped during indexing.
    pub fn is_renderable(&self) -> bool {
        self.left >= 0.0 && self.top >= 0.0 && self.width > 0.0 && self.height > 0.0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &NormBox) -> NormBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        NormBox::new(left, top, right - left, bottom - top)
    }

    /// Whether the vertical intervals of the two boxes overlap by any
    /// positive amount. Touching edges do not count as overlap.
    pub fn overlaps_vertically(&self, other: &NormBox) -> bool {
        self.top < other.bottom() && self.bottom() > other.top
    }

    /// Denormalize into pixel space.
    ///
    /// Each edge is scaled by the page dimension and rounded with
    /// round-half-away-from-zero (`f64::round`). The result is clamped into
    /// the page rectangle, and degenerate results (an edge collapsing after
    /// rounding) are widened to a minimum 1-pixel extent so every rendered
    /// element carries a non-empty bbox. Returns the box and whether
    /// clamping to the minimum extent was needed.
    pub fn to_pixels(&self, dimensions: PageDimensions) -> (PixelBox, bool) {
        let width = dimensions.width;
        let height = dimensions.height;

        let scale = |value: f64, limit: u32| -> u32 {
            ((value * f64::from(limit)).round() as i64).clamp(0, i64::from(limit)) as u32
        };

        let mut left = scale(self.left, width);
        let mut right = scale(self.right(), width);
        let mut top = scale(self.top, height);
        let mut bottom = scale(self.bottom(), height);

        let mut clamped = false;
        if right <= left {
            clamped = true;
            if left >= width {
                left = width.saturating_sub(1);
            }
            right = left + 1;
        }
        if bottom <= top {
            clamped = true;
            if top >= height {
                top = height.saturating_sub(1);
            }
            bottom = top + 1;
        }

        (
            PixelBox {
                left,
                top,
                right,
                bottom,
            },
            clamped,
        )
    }
}

/// A pixel-space bounding box, edges in hOCR order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Left edge in pixels
    pub left: u32,

    /// Top edge in pixels
    pub top: u32,

    /// Right edge in pixels
    pub right: u32,

    /// Bottom edge in pixels
    pub bottom: u32,
}

impl PixelBox {
    /// Render as an hOCR `bbox` property value: `bbox left top right bottom`.
    pub fn to_property(&self) -> String {
        format!("bbox {} {} {} {}", self.left, self.top, self.right, self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> PageDimensions {
        PageDimensions::new(width, height)
    }

    #[test]
    fn test_to_pixels_basic() {
        let bbox = NormBox::new(0.1, 0.2, 0.3, 0.4);
        let (px, clamped) = bbox.to_pixels(dims(1000, 1000));
        assert_eq!(
            px,
            PixelBox {
                left: 100,
                top: 200,
                right: 400,
                bottom: 600
            }
        );
        assert!(!clamped);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 0.0005 * 1000 = 0.5 rounds up, not to even
        let bbox = NormBox::new(0.0005, 0.0015, 0.5, 0.5);
        let (px, _) = bbox.to_pixels(dims(1000, 1000));
        assert_eq!(px.left, 1);
        assert_eq!(px.top, 2);
    }

    #[test]
    fn test_degenerate_box_clamped_to_one_pixel() {
        // Narrower than half a pixel: both edges round to the same value
        let bbox = NormBox::new(0.5, 0.5, 0.0001, 0.0001);
        let (px, clamped) = bbox.to_pixels(dims(1000, 1000));
        assert!(clamped);
        assert_eq!(px.right, px.left + 1);
        assert_eq!(px.bottom, px.top + 1);
    }

    #[test]
    fn test_degenerate_box_at_page_edge() {
        let bbox = NormBox::new(0.9999, 0.9999, 0.0001, 0.0001);
        let (px, clamped) = bbox.to_pixels(dims(100, 100));
        assert!(clamped);
        assert!(px.right <= 100);
        assert!(px.bottom <= 100);
        assert_eq!(px.right, px.left + 1);
        assert_eq!(px.bottom, px.top + 1);
    }

    #[test]
    fn test_pixels_contained_in_page() {
        // left + width slightly over 1.0 must still clamp into the page
        let bbox = NormBox::new(0.95, 0.95, 0.1, 0.1);
        let (px, _) = bbox.to_pixels(dims(800, 600));
        assert!(px.right <= 800);
        assert!(px.bottom <= 600);
    }

    #[test]
    fn test_union() {
        let a = NormBox::new(0.1, 0.1, 0.2, 0.1);
        let b = NormBox::new(0.2, 0.15, 0.3, 0.2);
        let u = a.union(&b);
        assert_eq!(u.left, 0.1);
        assert_eq!(u.top, 0.1);
        assert!((u.right() - 0.5).abs() < 1e-9);
        assert!((u.bottom() - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_overlap() {
        let a = NormBox::new(0.0, 0.1, 1.0, 0.1);
        let overlapping = NormBox::new(0.0, 0.15, 1.0, 0.1);
        let touching = NormBox::new(0.0, 0.2, 1.0, 0.1);
        let disjoint = NormBox::new(0.0, 0.5, 1.0, 0.1);

        assert!(a.overlaps_vertically(&overlapping));
        assert!(!a.overlaps_vertically(&touching));
        assert!(!a.overlaps_vertically(&disjoint));
    }

    #[test]
    fn test_is_renderable() {
        assert!(NormBox::new(0.0, 0.0, 0.1, 0.1).is_renderable());
        assert!(!NormBox::new(0.0, 0.0, 0.0, 0.1).is_renderable());
        assert!(!NormBox::new(-0.1, 0.0, 0.1, 0.1).is_renderable());
    }

    #[test]
    fn test_bbox_property_format() {
        let px = PixelBox {
            left: 10,
            top: 20,
            right: 30,
            bottom: 40,
        };
        assert_eq!(px.to_property(), "bbox 10 20 30 40");
    }
}
