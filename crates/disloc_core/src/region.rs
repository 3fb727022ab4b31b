//! Region of interest: the bounded 2D observation window.
//!
//! Two geometries are supported:
//! - `Circle`: centered at the origin, characteristic size = radius
//! - `Square`: lower-left corner at the origin, characteristic size = side
//!
//! The region supplies the containment test, the exact area and the
//! distance metric (plain Euclidean or toroidal for the square) shared by
//! the generation models and the spatial analysis.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Geometry of the region of interest. Sizes are in nanometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Region {
    Circle { radius: f64 },
    Square { side: f64 },
}

impl Region {
    /// Circle of the given radius centered at the origin.
    pub fn circle(radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "circle radius must be strictly positive, got {}",
                radius
            )));
        }
        Ok(Region::Circle { radius })
    }

    /// Square of the given side with its lower-left corner at the origin.
    pub fn square(side: f64) -> Result<Self> {
        if !side.is_finite() || side <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "square side must be strictly positive, got {}",
                side
            )));
        }
        Ok(Region::Square { side })
    }

    /// Characteristic size: radius for a circle, side for a square.
    pub fn size(&self) -> f64 {
        match self {
            Region::Circle { radius } => *radius,
            Region::Square { side } => *side,
        }
    }

    /// Exact area of the region [nm^2].
    pub fn area(&self) -> f64 {
        match self {
            Region::Circle { radius } => std::f64::consts::PI * radius * radius,
            Region::Square { side } => side * side,
        }
    }

    /// Containment test, boundary inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Region::Circle { radius } => x * x + y * y <= radius * radius,
            Region::Square { side } => x >= 0.0 && x <= *side && y >= 0.0 && y <= *side,
        }
    }

    /// Distance between two points.
    ///
    /// With `periodic` set, the square is treated as a torus and each axis
    /// wraps independently with wrap length equal to the side; this equals
    /// the minimum Euclidean distance over the 3x3 toroidal images. The
    /// flag has no meaning for a circle and is ignored there.
    pub fn distance(&self, p: (f64, f64), q: (f64, f64), periodic: bool) -> f64 {
        match self {
            Region::Square { side } if periodic => {
                let mut dx = (p.0 - q.0).abs();
                let mut dy = (p.1 - q.1).abs();
                dx = dx.min(side - dx);
                dy = dy.min(side - dy);
                (dx * dx + dy * dy).sqrt()
            }
            _ => {
                let dx = p.0 - q.0;
                let dy = p.1 - q.1;
                (dx * dx + dy * dy).sqrt()
            }
        }
    }

    /// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        match self {
            Region::Circle { radius } => (-radius, -radius, *radius, *radius),
            Region::Square { side } => (0.0, 0.0, *side, *side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_reject_non_positive_sizes() {
        assert!(Region::circle(0.0).is_err());
        assert!(Region::circle(-1.0).is_err());
        assert!(Region::circle(f64::NAN).is_err());
        assert!(Region::square(0.0).is_err());
        assert!(Region::square(-5.0).is_err());
        assert!(Region::circle(1000.0).is_ok());
        assert!(Region::square(2000.0).is_ok());
    }

    #[test]
    fn test_area_is_exact() {
        let c = Region::circle(10.0).unwrap();
        assert!((c.area() - std::f64::consts::PI * 100.0).abs() < 1e-12);
        let s = Region::square(10.0).unwrap();
        assert_eq!(s.area(), 100.0);
    }

    #[test]
    fn test_contains_circle() {
        let c = Region::circle(10.0).unwrap();
        assert!(c.contains(0.0, 0.0));
        assert!(c.contains(10.0, 0.0)); // boundary inclusive
        assert!(c.contains(-6.0, 8.0));
        assert!(!c.contains(10.1, 0.0));
        assert!(!c.contains(8.0, 8.0));
    }

    #[test]
    fn test_contains_square() {
        let s = Region::square(10.0).unwrap();
        assert!(s.contains(0.0, 0.0));
        assert!(s.contains(10.0, 10.0)); // boundary inclusive
        assert!(s.contains(5.0, 5.0));
        assert!(!s.contains(-0.1, 5.0));
        assert!(!s.contains(5.0, 10.1));
    }

    #[test]
    fn test_periodic_distance_wraps_both_axes() {
        let s = Region::square(10.0).unwrap();
        let p = (1.0, 1.0);
        let q = (9.0, 9.0);
        let plain = s.distance(p, q, false);
        let wrapped = s.distance(p, q, true);
        assert!((plain - 128.0f64.sqrt()).abs() < 1e-12);
        assert!((wrapped - 8.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_distance_never_exceeds_plain() {
        let s = Region::square(7.0).unwrap();
        let pts = [(0.5, 0.5), (6.5, 0.2), (3.5, 3.5), (0.1, 6.9), (5.0, 2.0)];
        for &p in &pts {
            for &q in &pts {
                let plain = s.distance(p, q, false);
                let wrapped = s.distance(p, q, true);
                assert!(wrapped <= plain + 1e-12);
                assert!((wrapped - s.distance(q, p, true)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_periodic_flag_ignored_for_circle() {
        let c = Region::circle(10.0).unwrap();
        let p = (-9.0, 0.0);
        let q = (9.0, 0.0);
        assert_eq!(c.distance(p, q, true), c.distance(p, q, false));
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the periodic metric is symmetric and bounded by the plain one.
            #[test]
            fn prop_periodic_metric(
                px in 0.0f64..10.0, py in 0.0f64..10.0,
                qx in 0.0f64..10.0, qy in 0.0f64..10.0,
            ) {
                let s = Region::square(10.0).unwrap();
                let w = s.distance((px, py), (qx, qy), true);
                prop_assert!(w <= s.distance((px, py), (qx, qy), false) + 1e-12);
                prop_assert!((w - s.distance((qx, qy), (px, py), true)).abs() < 1e-12);
            }

            /// Property: contains agrees with the geometric definition.
            #[test]
            fn prop_contains_circle(x in -20.0f64..20.0, y in -20.0f64..20.0) {
                let c = Region::circle(10.0).unwrap();
                prop_assert_eq!(c.contains(x, y), x * x + y * y <= 100.0);
            }
        }
    }
}
