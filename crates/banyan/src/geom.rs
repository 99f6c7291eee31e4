pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// Unit vector pointing from `from` towards `to`.
///
/// `None` when the points coincide or either one is not finite. Far-apart finite points still get
/// a direction even when their difference overflows.
pub fn direction(from: Point, to: Point) -> Option<Vector> {
    if from == to || !is_finite(from) || !is_finite(to) {
        return None;
    }
    let mut delta = to - from;
    if !(delta.x.is_finite() && delta.y.is_finite()) {
        delta = to.to_vector() * 0.5 - from.to_vector() * 0.5;
    }
    let scale = delta.x.abs().max(delta.y.abs());
    let unit = delta / scale;
    Some(unit / unit.x.hypot(unit.y))
}

/// Euclidean distance without intermediate overflow. Infinite only when the true distance does
/// not fit in an `f64`.
pub fn distance(a: Point, b: Point) -> f64 {
    let delta = b - a;
    delta.x.hypot(delta.y)
}

pub fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Manhattan magnitude `|x| + |y|`, the quantity the convergence check sums per node.
pub fn manhattan(v: Vector) -> f64 {
    v.x.abs() + v.y.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let d = direction(point(1.0, 1.0), point(4.0, 5.0)).unwrap();
        assert!((d.x - 0.6).abs() < 1e-12);
        assert!((d.y - 0.8).abs() < 1e-12);
    }

    #[test]
    fn direction_of_coincident_points_is_none() {
        assert!(direction(point(2.0, 3.0), point(2.0, 3.0)).is_none());
    }

    #[test]
    fn far_apart_points_keep_a_direction() {
        let d = direction(point(0.0, 0.0), point(1e200, 1e200)).unwrap();
        assert!((d.x - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((d.y - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        let d = distance(point(0.0, 0.0), point(1e200, 1e200));
        assert!((d / 1e200 - 2f64.sqrt()).abs() < 1e-12);

        // The difference itself overflows here.
        let d = direction(point(-f64::MAX, 0.0), point(f64::MAX, 0.0)).unwrap();
        assert_eq!(d, vector(1.0, 0.0));
    }

    #[test]
    fn tiny_separations_are_not_coincidence() {
        let a = point(0.0, 0.0);
        let b = point(f64::from_bits(1), 0.0);
        assert_eq!(direction(a, b), Some(vector(1.0, 0.0)));
        assert!(distance(a, b) > 0.0);
    }

    #[test]
    fn non_finite_points_have_no_direction() {
        assert!(direction(point(0.0, 0.0), point(f64::NAN, 1.0)).is_none());
        assert!(direction(point(f64::INFINITY, 0.0), point(0.0, 1.0)).is_none());
    }

    #[test]
    fn manhattan_sums_absolute_components() {
        assert_eq!(manhattan(vector(-3.0, 4.5)), 7.5);
    }
}
