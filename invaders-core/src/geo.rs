//! Simple geometry primitives.

/// A tiny absolute pixel position.
///
/// Pixel positions may be negative or past the screen edge; drawing clips them.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A tiny 2D vector with floating point coordinates.
///
/// Used for sprite positions, sizes and movement deltas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2D {
    pub x: f32,
    pub y: f32,
}

/// A tiny absolute rectangle based on two corners.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub p1: Vec2D,
    pub p2: Vec2D,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Rounds to the nearest pixel.
impl From<Vec2D> for Point {
    fn from(v: Vec2D) -> Point {
        Point::new(v.x.round() as i32, v.y.round() as i32)
    }
}

impl Vec2D {
    /// Create a 2D vector.
    pub const fn new(x: f32, y: f32) -> Vec2D {
        Vec2D { x, y }
    }
}

impl std::ops::Add for Vec2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::AddAssign for Vec2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl std::ops::Sub for Vec2D {
    type Output = Vec2D;

    fn sub(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul for Vec2D {
    type Output = Vec2D;

    fn mul(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x * other.x, self.y * other.y)
    }
}

impl From<Point> for Vec2D {
    fn from(p: Point) -> Vec2D {
        Vec2D::new(p.x as f32, p.y as f32)
    }
}

impl Rect {
    /// Create a rectangle from two corners.
    pub fn new(p1: Vec2D, p2: Vec2D) -> Rect {
        Rect { p1, p2 }
    }

    /// Create a rectangle from a position and a size.
    pub fn from_size(pos: Vec2D, size: Vec2D) -> Rect {
        Rect {
            p1: pos,
            p2: pos + size,
        }
    }

    /// Test for intersections between two rectangles.
    ///
    /// Edges are inclusive: rectangles that merely touch intersect.
    pub fn intersects(&self, other: Rect) -> bool {
        let (top1, right1, bottom1, left1) = self.get_bounds();
        let (top2, right2, bottom2, left2) = other.get_bounds();

        !(left1 > right2 || right1 < left2 || top1 > bottom2 || bottom1 < top2)
    }

    /// Compute the bounding box for this rectangle.
    ///
    /// # Returns
    ///
    /// Tuple of `(top, right, bottom, left)`, e.g. in CSS clockwise order.
    pub fn get_bounds(&self) -> (f32, f32, f32, f32) {
        (self.p1.y, self.p2.x, self.p2.y, self.p1.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_intersect() {
        let rect_size = Vec2D::new(10.0, 10.0);
        let r1 = Rect::from_size(rect_size, rect_size);

        // Test intersection between equal-sized rectangles
        for y in 0..3 {
            for x in 0..3 {
                let pos = Vec2D::new((x * 5 + 5) as f32, (y * 5 + 5) as f32);
                let r2 = Rect::from_size(pos, rect_size);

                assert!(r1.intersects(r2), "Should intersect");
                assert!(r2.intersects(r1), "Should intersect");
            }
        }

        // Test non-intersections, one pixel beyond the touching edges
        for y in 0..3 {
            for x in 0..3 {
                if x == 1 && y == 1 {
                    continue;
                }

                let pos = Vec2D::new((x * 11 - 1) as f32, (y * 11 - 1) as f32);
                let r2 = Rect::from_size(pos, rect_size);

                assert!(!r1.intersects(r2), "Should not intersect");
                assert!(!r2.intersects(r1), "Should not intersect");
            }
        }

        // Test intersection between different-sized rectangles
        let r2 = Rect::new(Vec2D::new(0.0, 0.0), Vec2D::new(30.0, 30.0));

        assert!(r1.intersects(r2), "Should intersect");
        assert!(r2.intersects(r1), "Should intersect");
    }

    #[test]
    fn rect_touching_edges_intersect() {
        let r1 = Rect::from_size(Vec2D::new(0.0, 0.0), Vec2D::new(20.0, 20.0));
        let r2 = Rect::from_size(Vec2D::new(20.0, 20.0), Vec2D::new(5.0, 5.0));

        assert!(r1.intersects(r2));
        assert!(r2.intersects(r1));
    }

    #[test]
    fn vector2d_point_conversion() {
        let v = Vec2D::new(-2.0, 4.4);
        let p = Point::new(10, 10);

        // Point + Vec2D
        let t = Point::from(Vec2D::from(p) + v);
        assert_eq!(t, Point::new(8, 14));

        // Point - Vec2D
        let t = Point::from(Vec2D::from(p) - v);
        assert_eq!(t, Point::new(12, 6));

        // Point * Vec2D
        let t = Point::from(Vec2D::from(p) * v);
        assert_eq!(t, Point::new(-20, 44));
    }
}
