use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
///
/// Used by consumers to describe the container a pointer sample is
/// measured against (a parallax section, a card).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.size.x * 0.5,
            self.origin.y + self.size.y * 0.5,
        )
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.origin.x + self.size.x
            && p.y < self.origin.y + self.size.y
    }

    /// Maps `p` into the rectangle's unit space: `origin` → (0, 0),
    /// bottom-right corner → (1, 1). Points outside map outside `[0, 1]`.
    ///
    /// An empty rectangle maps every point to (0.5, 0.5).
    #[inline]
    pub fn relative(self, p: Vec2) -> Vec2 {
        if self.is_empty() {
            return Vec2::new(0.5, 0.5);
        }
        Vec2::new(
            (p.x - self.origin.x) / self.size.x,
            (p.y - self.origin.y) / self.size.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    // ── relative ──────────────────────────────────────────────────────────

    #[test]
    fn relative_maps_corners_to_unit_square() {
        let rect = r(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.relative(Vec2::new(100.0, 50.0)), Vec2::new(0.0, 0.0));
        assert_eq!(rect.relative(Vec2::new(300.0, 150.0)), Vec2::new(1.0, 1.0));
        assert_eq!(rect.relative(rect.center()), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn relative_outside_points_leave_unit_range() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rect.relative(Vec2::new(-5.0, 20.0)), Vec2::new(-0.5, 2.0));
    }

    #[test]
    fn relative_on_empty_rect_is_centered() {
        assert_eq!(r(5.0, 5.0, 0.0, 10.0).relative(Vec2::new(1.0, 1.0)), Vec2::new(0.5, 0.5));
    }
}
