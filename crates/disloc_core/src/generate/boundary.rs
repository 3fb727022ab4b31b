//! Boundary companions: image and replica dislocations.
//!
//! Companions are non-physical points kept alongside a distribution for
//! the benefit of the diffraction simulation; they never enter the
//! spatial statistics.

use crate::dislocation::Dislocation;

/// Circle-inversion images for a circle of radius `radius`.
///
/// Each dislocation at distance d from the center maps to radius^2/d along
/// the same polar angle, with opposite sense. A dislocation at the exact
/// center has no image.
pub(super) fn images(radius: f64, dislocations: &[Dislocation]) -> Vec<Dislocation> {
    dislocations
        .iter()
        .filter_map(|d| {
            let norm2 = d.x * d.x + d.y * d.y;
            if norm2 == 0.0 {
                return None;
            }
            let scale = radius * radius / norm2;
            Some(Dislocation::new(d.x * scale, d.y * scale, d.sense.opposite()))
        })
        .collect()
}

/// Ring replications for a square of side `side`.
///
/// Enumerates the (2*order+1)^2 - 1 translated copies of the pattern in
/// the rings of order 1..=order around the region, senses unchanged.
pub(super) fn replications(
    side: f64,
    dislocations: &[Dislocation],
    order: u32,
) -> Vec<Dislocation> {
    let order = order as i64;
    let mut shifts: Vec<(f64, f64)> = Vec::new();
    for i in 1..=order {
        for j in 0..2 * i {
            for k in [1i64, -1] {
                shifts.push(((-i * k) as f64, ((i - j) * k) as f64));
                shifts.push((((i - j) * k) as f64, (i * k) as f64));
            }
        }
    }
    let mut out = Vec::with_capacity(shifts.len() * dislocations.len());
    for &(sx, sy) in &shifts {
        for d in dislocations {
            out.push(Dislocation::new(d.x + side * sx, d.y + side * sy, d.sense));
        }
    }
    out
}
