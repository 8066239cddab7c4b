//! Integer 2D vectors and axis-aligned bounding boxes.
//!
//! `BBox` uses half-open extents: `min` is inclusive and `max` is exclusive,
//! so `size() == max - min`. The default box `(0, 0)-(0, 0)` has zero area
//! and doubles as the "nothing here" value. Search regions handed to the
//! correlators are the one exception: there both corners are inclusive
//! displacements (see `CorrelationConfig`).

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Integer 2D vector used for positions, sizes and displacements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2 {
    /// Horizontal component (column).
    pub x: i32,
    /// Vertical component (row).
    pub y: i32,
}

impl Vec2 {
    /// Creates a vector from its components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a vector with both components equal to `v`.
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v }
    }

    /// Returns the larger component.
    pub fn max_elem(self) -> i32 {
        self.x.max(self.y)
    }

    /// Returns the smaller component.
    pub fn min_elem(self) -> i32 {
        self.x.min(self.y)
    }

    /// Product of the components, widened to avoid overflow.
    pub fn prod(self) -> i64 {
        i64::from(self.x) * i64::from(self.y)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: i32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<i32> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: i32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Axis-aligned integer rectangle with inclusive `min` and exclusive `max`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BBox {
    /// Inclusive minimum corner.
    pub min: Vec2,
    /// Exclusive maximum corner.
    pub max: Vec2,
}

impl BBox {
    /// Creates a box from its corners.
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a box from a corner and a size.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Creates a box anchored at the origin.
    pub const fn from_size(size: Vec2) -> Self {
        Self {
            min: Vec2::new(0, 0),
            max: size,
        }
    }

    /// Extent of the box (may be negative for inverted boxes).
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Width of the box.
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    /// Height of the box.
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Number of cells covered; zero for empty or inverted boxes.
    pub fn area(&self) -> i64 {
        let size = self.size();
        if size.x <= 0 || size.y <= 0 {
            return 0;
        }
        size.prod()
    }

    /// Returns true when the box covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Returns true when `p` lies inside the box.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x < self.max.x && p.y < self.max.y
    }

    /// Returns true when `other` lies entirely inside the box.
    pub fn contains_box(&self, other: &BBox) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Grows both corners outward by `amount`.
    pub fn expand(&self, amount: i32) -> BBox {
        self.expand_by(Vec2::splat(amount))
    }

    /// Grows both corners outward by a per-axis amount.
    pub fn expand_by(&self, amount: Vec2) -> BBox {
        BBox::new(self.min - amount, self.max + amount)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Overlap of both boxes, or `None` when they do not overlap.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let clipped = BBox::new(self.min.max(other.min), self.max.min(other.max));
        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }

    /// Returns true when the two boxes share at least one cell.
    pub fn overlaps(&self, other: &BBox) -> bool {
        self.intersection(other).is_some()
    }
}

impl Add<Vec2> for BBox {
    type Output = BBox;

    fn add(self, rhs: Vec2) -> BBox {
        BBox::new(self.min + rhs, self.max + rhs)
    }
}

impl Sub<Vec2> for BBox {
    type Output = BBox;

    fn sub(self, rhs: Vec2) -> BBox {
        BBox::new(self.min - rhs, self.max - rhs)
    }
}

impl Mul<i32> for BBox {
    type Output = BBox;

    fn mul(self, rhs: i32) -> BBox {
        BBox::new(self.min * rhs, self.max * rhs)
    }
}

impl Div<i32> for BBox {
    type Output = BBox;

    fn div(self, rhs: i32) -> BBox {
        BBox::new(self.min / rhs, self.max / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::{BBox, Vec2};

    #[test]
    fn default_box_is_empty() {
        let b = BBox::default();
        assert!(b.is_empty());
        assert_eq!(b.area(), 0);
    }

    #[test]
    fn inverted_box_has_zero_area() {
        let b = BBox::new(Vec2::new(5, 5), Vec2::new(2, 8));
        assert_eq!(b.area(), 0);
        assert!(b.is_empty());
    }

    #[test]
    fn union_and_intersection() {
        let a = BBox::from_xywh(0, 0, 4, 4);
        let b = BBox::from_xywh(2, 3, 4, 4);
        assert_eq!(a.union(&b), BBox::from_xywh(0, 0, 6, 7));
        assert_eq!(a.intersection(&b), Some(BBox::from_xywh(2, 3, 2, 1)));
        let c = BBox::from_xywh(4, 0, 2, 2);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn expand_grows_both_corners() {
        let b = BBox::from_xywh(2, 2, 2, 2).expand(1);
        assert_eq!(b, BBox::from_xywh(1, 1, 4, 4));
        let k = BBox::from_xywh(0, 0, 3, 3).expand_by(Vec2::new(1, 2));
        assert_eq!(k.size(), Vec2::new(5, 7));
    }

    #[test]
    fn scaling_and_translation() {
        let b = BBox::from_xywh(1, 2, 3, 4);
        assert_eq!(b * 2, BBox::from_xywh(2, 4, 6, 8));
        assert_eq!((b * 2) / 2, b);
        assert_eq!(b + Vec2::new(-1, 1), BBox::from_xywh(0, 3, 3, 4));
    }
}
