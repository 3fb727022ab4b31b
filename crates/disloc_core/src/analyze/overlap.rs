//! Overlapping areas of a probe disk with the region of interest.
//!
//! These areas drive the edge-correction weights: the expected neighbor
//! count of a center near the boundary must be rescaled by the fraction of
//! its probe disk that lies inside the observation window.

use std::f64::consts::PI;

/// Overlapping area of two circles with radii `ra`, `rb` whose centers are
/// a distance `d` apart.
pub(super) fn circle_circle(ra: f64, rb: f64, d: f64) -> f64 {
    if ra + rb <= d {
        return 0.0;
    }
    if d + ra <= rb {
        return PI * ra * ra;
    }
    if d + rb <= ra {
        return PI * rb * rb;
    }
    let (r2a, r2b, d2) = (ra * ra, rb * rb, d * d);
    let lens_a = r2a * ((d2 + r2a - r2b) / (2.0 * d * ra)).clamp(-1.0, 1.0).acos();
    let lens_b = r2b * ((d2 + r2b - r2a) / (2.0 * d * rb)).clamp(-1.0, 1.0).acos();
    let chord = ((ra + rb - d) * (ra + rb + d) * (ra - rb + d) * (rb - ra + d))
        .max(0.0)
        .sqrt();
    lens_a + lens_b - chord / 2.0
}

/// Overlapping area of a disk of radius `r` centered at `(x, y)` inside a
/// square of side `s` with its lower-left corner at the origin.
///
/// The full disk area is reduced by the four corner excesses; each corner
/// contributes either a quarter-disk complement or two half circular
/// segments, depending on whether the corner lies inside the disk.
pub(super) fn circle_square(x: f64, y: f64, r: f64, s: f64) -> f64 {
    let r2 = r * r;
    let edges = [s - x, s - y, x, y];
    let mut area = PI * r2;
    for k in 0..4 {
        let d1 = edges[k];
        let d2 = edges[(k + 1) % 4];
        let excess = if d1 * d1 + d2 * d2 <= r2 {
            PI * r2 / 4.0 - d1 * d2
        } else {
            let mut e = 0.0;
            if d1 < r {
                e += (r2 * (d1 / r).acos() - d1 * (r2 - d1 * d1).sqrt()) / 2.0;
            }
            if d2 < r {
                e += (r2 * (d2 / r).acos() - d2 * (r2 - d2 * d2).sqrt()) / 2.0;
            }
            e
        };
        area -= excess;
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_contained() {
        assert!((circle_circle(1.0, 10.0, 0.0) - PI).abs() < 1e-12);
        assert!((circle_circle(1.0, 10.0, 5.0) - PI).abs() < 1e-12);
        assert!((circle_circle(10.0, 1.0, 5.0) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_circle_circle_disjoint() {
        assert_eq!(circle_circle(1.0, 2.0, 3.0), 0.0);
        assert_eq!(circle_circle(1.0, 2.0, 4.0), 0.0);
    }

    #[test]
    fn test_circle_circle_lens_closed_form() {
        // unit circles one radius apart: 2*pi/3 - sqrt(3)/2
        let expected = 2.0 * PI / 3.0 - 3.0f64.sqrt() / 2.0;
        assert!((circle_circle(1.0, 1.0, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_circle_square_disk_inside() {
        let a = circle_square(5.0, 5.0, 2.0, 10.0);
        assert!((a - PI * 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_circle_square_quarter_disk_at_corner() {
        let a = circle_square(0.0, 0.0, 1.0, 10.0);
        assert!((a - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_circle_square_half_disk_on_edge() {
        let a = circle_square(0.0, 5.0, 1.0, 10.0);
        assert!((a - PI / 2.0).abs() < 1e-12);
    }
}
