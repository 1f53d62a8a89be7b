// src/geometry.rs

//! Pixel rectangles and the clip-rect algebra shared by every drawing
//! primitive.

use serde::{Deserialize, Serialize};

/// An axis-aligned pixel rectangle. `w` and `h` are never negative for
/// rectangles produced by this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle anchored at the origin.
    pub const fn sized(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Clips `self` against `active`, one axis at a time.
    ///
    /// If the rectangle starts before the clip it loses the overhang and its
    /// start moves to the clip start; if it ends after the clip it is cut
    /// back to the clip end. Extents never go below zero, so the result is
    /// always a valid (possibly empty) rectangle lying inside both inputs
    /// whenever it is non-empty.
    pub fn intersect(&self, active: &Rect) -> Rect {
        let (x, w) = clip_axis(self.x, self.w, active.x, active.w);
        let (y, h) = clip_axis(self.y, self.h, active.y, active.h);
        Rect { x, y, w, h }
    }
}

fn clip_axis(start: i32, extent: i32, clip_start: i32, clip_extent: i32) -> (i32, i32) {
    let mut start = start;
    let mut extent = extent;
    if start < clip_start {
        extent = (start + extent - clip_start).max(0);
        start = clip_start;
    }
    if start + extent > clip_start + clip_extent {
        extent = (clip_start + clip_extent - start).max(0);
    }
    (start, extent)
}

/// Horizontal placement of a blit or text run inside its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of a blit or text run inside its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn intersect_inside_is_identity() {
        let r = Rect::new(10, 10, 5, 5);
        assert_eq!(r.intersect(&Rect::sized(100, 100)), r);
    }

    #[test]
    fn intersect_trims_leading_overhang() {
        let r = Rect::new(-4, 2, 10, 3);
        assert_eq!(r.intersect(&Rect::sized(20, 20)), Rect::new(0, 2, 6, 3));
    }

    #[test]
    fn intersect_trims_trailing_overhang() {
        let r = Rect::new(15, 18, 10, 10);
        assert_eq!(r.intersect(&Rect::sized(20, 20)), Rect::new(15, 18, 5, 2));
    }

    #[test]
    fn disjoint_rectangles_produce_empty_extent() {
        let clipped = Rect::new(50, 50, 10, 10).intersect(&Rect::sized(20, 20));
        assert!(clipped.is_empty());
        assert!(clipped.w >= 0 && clipped.h >= 0);

        let before = Rect::new(-30, -30, 10, 10).intersect(&Rect::new(5, 5, 20, 20));
        assert_eq!((before.w, before.h), (0, 0));
    }

    #[test]
    fn intersection_lies_within_both_rectangles() {
        let samples = [-7, -1, 0, 3, 9, 16];
        let extents = [0, 1, 4, 12];
        for &x in &samples {
            for &y in &samples {
                for &w in &extents {
                    for &h in &extents {
                        let r = Rect::new(x, y, w, h);
                        let c = Rect::new(2, -3, 10, 8);
                        let i = r.intersect(&c);
                        assert!(i.w >= 0 && i.h >= 0, "{:?} ∩ {:?} = {:?}", r, c, i);
                        if !i.is_empty() {
                            for bound in [r, c] {
                                assert!(i.x >= bound.x && i.right() <= bound.right(), "{:?} in {:?}", i, bound);
                                assert!(i.y >= bound.y && i.bottom() <= bound.bottom(), "{:?} in {:?}", i, bound);
                            }
                        }
                    }
                }
            }
        }
    }
}
