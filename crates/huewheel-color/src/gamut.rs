//! Color gamut triangles in CIE 1931 chromaticity space.
//!
//! Bulbs only reproduce chromaticities inside their gamut triangle. Points
//! outside are clamped to the closest point on the triangle's edge before
//! being sent to the hardware, which is also what the bridge firmware would
//! do on its own.

use crate::xy::Xy;

/// Sign-test slack so points sitting exactly on an edge count as inside.
const EDGE_EPSILON: f64 = 1e-12;

/// A triangular gamut, described by the chromaticities of its primaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gamut {
    pub red: Xy,
    pub green: Xy,
    pub blue: Xy,
}

impl Gamut {
    /// Gamut B, shared by the classic color bulbs this controller targets.
    pub const HUE_BULB: Gamut = Gamut {
        red: Xy::new(0.674, 0.322),
        green: Xy::new(0.408, 0.517),
        blue: Xy::new(0.168, 0.041),
    };

    pub const fn new(red: Xy, green: Xy, blue: Xy) -> Self {
        Self { red, green, blue }
    }

    /// Whether `point` lies inside the triangle (edges included).
    pub fn contains(&self, point: Xy) -> bool {
        let d1 = edge_side(point, self.red, self.green);
        let d2 = edge_side(point, self.green, self.blue);
        let d3 = edge_side(point, self.blue, self.red);

        let has_neg = d1 < -EDGE_EPSILON || d2 < -EDGE_EPSILON || d3 < -EDGE_EPSILON;
        let has_pos = d1 > EDGE_EPSILON || d2 > EDGE_EPSILON || d3 > EDGE_EPSILON;
        !(has_neg && has_pos)
    }

    /// Returns `point` unchanged when it is inside the gamut, otherwise the
    /// closest point on the triangle's boundary.
    pub fn clamp(&self, point: Xy) -> Xy {
        if self.contains(point) {
            return point;
        }

        let candidates = [
            closest_on_segment(point, self.red, self.green),
            closest_on_segment(point, self.green, self.blue),
            closest_on_segment(point, self.blue, self.red),
        ];

        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if point.distance(*candidate) < point.distance(best) {
                best = *candidate;
            }
        }
        best
    }
}

/// Cross product of `b - a` and `p - a`; the sign says which side of the
/// directed edge `a -> b` the point falls on.
fn edge_side(p: Xy, a: Xy, b: Xy) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Closest point to `p` on the segment from `a` to `b`.
fn closest_on_segment(p: Xy, a: Xy, b: Xy) -> Xy {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    Xy::new(a.x + t * dx, a.y + t * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_point_is_contained() {
        assert!(Gamut::HUE_BULB.contains(Xy::new(0.4, 0.35)));
    }

    #[test]
    fn test_corners_are_contained() {
        let gamut = Gamut::HUE_BULB;
        assert!(gamut.contains(gamut.red));
        assert!(gamut.contains(gamut.green));
        assert!(gamut.contains(gamut.blue));
    }

    #[test]
    fn test_saturated_srgb_green_is_outside() {
        // sRGB green sits well past the bulb's green primary.
        assert!(!Gamut::HUE_BULB.contains(Xy::new(0.17, 0.75)));
    }

    #[test]
    fn test_clamp_keeps_interior_points() {
        let point = Xy::new(0.4, 0.35);
        assert_eq!(Gamut::HUE_BULB.clamp(point), point);
    }

    #[test]
    fn test_clamp_pulls_outside_points_onto_boundary() {
        let gamut = Gamut::HUE_BULB;
        let clamped = gamut.clamp(Xy::new(0.17, 0.75));
        assert!(gamut.contains(clamped));
        // The clamp lands near the green corner rather than across the triangle.
        assert!(clamped.distance(gamut.green) < 0.15);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let gamut = Gamut::HUE_BULB;
        let once = gamut.clamp(Xy::new(0.05, 0.9));
        let twice = gamut.clamp(once);
        assert!(once.distance(twice) < 1e-9);
    }
}
