// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integer sizes and pixel rectangles.

/// A two-dimensional size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
}

impl Extent2D {
    /// Creates a new extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The number of pixels covered by the extent.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A pixel rectangle in window coordinates, origin at the lower-left corner.
///
/// Used for viewports, clip rectangles and scissor boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin covering `extent`.
    pub const fn from_extent(extent: Extent2D) -> Self {
        Self::new(0, 0, extent.width, extent.height)
    }

    /// The exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// The exclusive top edge.
    pub fn top(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns the overlapping area of two rectangles.
    ///
    /// Disjoint rectangles produce an empty rectangle positioned at the
    /// corner where they would have met, which scissors everything away.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.top().min(other.top());
        Rect {
            x: x0,
            y: y0,
            width: (x1 - x0 as i64).max(0) as u32,
            height: (y1 - y0 as i64).max(0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0, 0, 100, 50);
        let b = Rect::new(40, 10, 100, 100);
        assert_eq!(a.intersection(&b), Rect::new(40, 10, 60, 40));
        assert_eq!(b.intersection(&a), Rect::new(40, 10, 60, 40));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 5, 5);
        let i = a.intersection(&b);
        assert_eq!(i.width, 0);
        assert_eq!(i.height, 0);
    }

    #[test]
    fn rect_from_extent() {
        let r = Rect::from_extent(Extent2D::new(640, 480));
        assert_eq!(r, Rect::new(0, 0, 640, 480));
        assert_eq!(Extent2D::new(640, 480).area(), 307_200);
    }
}
