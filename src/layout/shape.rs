//! Bounding shapes and their pairwise overlap geometry.
//!
//! Two overlapping shapes are separated by their minimum translation vector
//! (MTV): the shortest translation of the second shape that leaves the pair
//! touching. Circles separate along the line between their centers, boxes
//! along the axis of least penetration. Mixed pairs are treated as boxes.

use super::placement::separation_direction;

/// Penetration depth below which two shapes count as touching, not overlapping.
pub const OVERLAP_TOLERANCE: f64 = 1e-6;

/// Bounding shape of a node, centered on its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    Box { half_width: f64, half_height: f64 },
}

impl Shape {
    /// Half extents of the axis-aligned envelope.
    pub fn half_extents(&self) -> (f64, f64) {
        match *self {
            Shape::Circle { radius } => (radius, radius),
            Shape::Box {
                half_width,
                half_height,
            } => (half_width, half_height),
        }
    }

    /// Extents must be finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        let (w, h) = self.half_extents();
        w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0
    }

    /// Envelope corners for a shape centered at `(x, y)`.
    pub fn envelope(&self, x: f64, y: f64) -> ([f64; 2], [f64; 2]) {
        let (w, h) = self.half_extents();
        ([x - w, y - h], [x + w, y + h])
    }
}

/// Overlap between two placed shapes `i < j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub i: usize,
    pub j: usize,
    /// Translation of `j` relative to `i` that separates the pair.
    pub mtv: (f64, f64),
    /// Intersection area of the two shapes.
    pub area: f64,
}

/// Compute the contact between shape `a` at slot `i` and shape `b` at slot `j`.
///
/// Returns `None` when the shapes do not overlap by more than
/// [`OVERLAP_TOLERANCE`].
pub fn contact(
    i: usize,
    a: (f64, f64, Shape),
    j: usize,
    b: (f64, f64, Shape),
) -> Option<Contact> {
    let (ax, ay, sa) = a;
    let (bx, by, sb) = b;
    match (sa, sb) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let dx = bx - ax;
            let dy = by - ay;
            let dist = (dx * dx + dy * dy).sqrt();
            let penetration = ra + rb - dist;
            if penetration <= OVERLAP_TOLERANCE {
                return None;
            }
            let (ux, uy) = if dist > OVERLAP_TOLERANCE {
                (dx / dist, dy / dist)
            } else {
                separation_direction(i, j)
            };
            Some(Contact {
                i,
                j,
                mtv: (ux * penetration, uy * penetration),
                area: circle_intersection_area(ra, rb, dist),
            })
        }
        _ => {
            let (aw, ah) = sa.half_extents();
            let (bw, bh) = sb.half_extents();
            let dx = bx - ax;
            let dy = by - ay;
            let px = aw + bw - dx.abs();
            let py = ah + bh - dy.abs();
            if px <= OVERLAP_TOLERANCE || py <= OVERLAP_TOLERANCE {
                return None;
            }
            let mtv = if px < py {
                (axis_sign(dx, i, j, true) * px, 0.0)
            } else {
                (0.0, axis_sign(dy, i, j, false) * py)
            };
            let width = px.min(2.0 * aw).min(2.0 * bw);
            let height = py.min(2.0 * ah).min(2.0 * bh);
            Some(Contact {
                i,
                j,
                mtv,
                area: width * height,
            })
        }
    }
}

/// Direction along one axis, falling back to the deterministic pair direction
/// when the centers line up on that axis.
fn axis_sign(delta: f64, i: usize, j: usize, x_axis: bool) -> f64 {
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else {
        let (ux, uy) = separation_direction(i, j);
        let component = if x_axis { ux } else { uy };
        if component < 0.0 { -1.0 } else { 1.0 }
    }
}

/// Area of the lens formed by two circles whose centers are `dist` apart.
pub fn circle_intersection_area(ra: f64, rb: f64, dist: f64) -> f64 {
    if dist >= ra + rb {
        return 0.0;
    }
    if dist <= (ra - rb).abs() {
        let r = ra.min(rb);
        return std::f64::consts::PI * r * r;
    }

    let ca = ((dist * dist + ra * ra - rb * rb) / (2.0 * dist * ra)).clamp(-1.0, 1.0);
    let cb = ((dist * dist + rb * rb - ra * ra) / (2.0 * dist * rb)).clamp(-1.0, 1.0);
    let kite = (-dist + ra + rb) * (dist + ra - rb) * (dist - ra + rb) * (dist + ra + rb);

    ra * ra * ca.acos() + rb * rb * cb.acos() - 0.5 * kite.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn circle(r: f64) -> Shape {
        Shape::Circle { radius: r }
    }

    fn rect(w: f64, h: f64) -> Shape {
        Shape::Box {
            half_width: w,
            half_height: h,
        }
    }

    #[test]
    fn test_disjoint_circles_have_no_contact() {
        assert!(contact(0, (0.0, 0.0, circle(5.0)), 1, (20.0, 0.0, circle(5.0))).is_none());
        // Touching is not overlapping
        assert!(contact(0, (0.0, 0.0, circle(5.0)), 1, (10.0, 0.0, circle(5.0))).is_none());
    }

    #[test]
    fn test_circle_mtv_points_away() {
        let c = contact(0, (0.0, 0.0, circle(5.0)), 1, (6.0, 0.0, circle(5.0))).unwrap();
        assert!((c.mtv.0 - 4.0).abs() < 1e-12);
        assert_eq!(c.mtv.1, 0.0);
        assert!(c.area > 0.0);
    }

    #[test]
    fn test_coincident_circles_deterministic() {
        let a = contact(3, (1.0, 1.0, circle(2.0)), 8, (1.0, 1.0, circle(2.0))).unwrap();
        let b = contact(3, (1.0, 1.0, circle(2.0)), 8, (1.0, 1.0, circle(2.0))).unwrap();
        assert_eq!(a, b);
        let len = (a.mtv.0 * a.mtv.0 + a.mtv.1 * a.mtv.1).sqrt();
        assert!((len - 4.0).abs() < 1e-12);
        assert!((a.area - PI * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_box_mtv_least_penetration_axis() {
        // Overlap of 2 on x, 9 on y: separate along x.
        let c = contact(0, (0.0, 0.0, rect(5.0, 5.0)), 1, (8.0, 1.0, rect(5.0, 5.0))).unwrap();
        assert_eq!(c.mtv, (2.0, 0.0));
        assert!((c.area - 2.0 * 9.0).abs() < 1e-12);

        // Second shape is left of the first: push it further left.
        let c = contact(0, (0.0, 0.0, rect(5.0, 5.0)), 1, (-8.0, 1.0, rect(5.0, 5.0))).unwrap();
        assert_eq!(c.mtv, (-2.0, 0.0));
    }

    #[test]
    fn test_box_contained_area_is_smaller_box() {
        let c = contact(0, (0.0, 0.0, rect(10.0, 10.0)), 1, (1.0, 1.0, rect(2.0, 3.0))).unwrap();
        assert!((c.area - 4.0 * 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_pair_uses_boxes() {
        let c = contact(0, (0.0, 0.0, circle(5.0)), 1, (0.0, 9.0, rect(5.0, 5.0))).unwrap();
        assert_eq!(c.mtv, (0.0, 1.0));
    }

    #[test]
    fn test_circle_intersection_area_limits() {
        assert_eq!(circle_intersection_area(1.0, 1.0, 3.0), 0.0);
        assert!((circle_intersection_area(1.0, 3.0, 0.5) - PI).abs() < 1e-12);
        // Two unit circles one radius apart: 2π/3 - √3/2
        let expected = 2.0 * PI / 3.0 - 3f64.sqrt() / 2.0;
        assert!((circle_intersection_area(1.0, 1.0, 1.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_shape_validation() {
        assert!(circle(0.0).is_well_formed());
        assert!(!circle(-1.0).is_well_formed());
        assert!(!rect(f64::NAN, 1.0).is_well_formed());
        assert_eq!(rect(2.0, 3.0).envelope(1.0, 1.0), ([-1.0, -2.0], [3.0, 4.0]));
    }
}
