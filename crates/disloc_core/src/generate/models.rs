//! Position placement for the three stochastic models.
//!
//! Placement works in the generation frame: the region itself, or the
//! region enlarged by the overgeneration margin. Cropping back to the true
//! region is the caller's responsibility (it depends on the sign variant).

use super::{BoundaryPolicy, CountRule, GeneratorConfig, Model, SignVariant};
use crate::error::{CoreError, Result};
use crate::region::Region;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use std::f64::consts::PI;

/// Retry budget per point of the restricted model.
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000;

/// Place positions according to the configured model, in the true frame.
pub(super) fn place(
    region: &Region,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Result<Vec<(f64, f64)>> {
    let (frame, shift) = generation_frame(region, &config.boundary);
    let even = config.sign_variant == SignVariant::Dipolar;
    let mut positions = match config.model {
        Model::Independent { density, count } => {
            let n = target_count(density * frame.area(), count, even, rng)?;
            (0..n).map(|_| uniform_position(&frame, rng)).collect()
        }
        Model::Restricted { density, min_separation } => {
            let n = target_count(density * frame.area(), CountRule::Fixed, even, rng)?;
            let periodic = matches!(config.boundary, BoundaryPolicy::Periodic { .. });
            place_restricted(&frame, n, min_separation, periodic, rng)?
        }
        Model::Cellular { density, cell_side, wall_thickness, dipole_length } => place_cellular(
            &frame,
            density,
            cell_side,
            wall_thickness,
            even.then_some(dipole_length),
            rng,
        ),
    };
    if shift != (0.0, 0.0) {
        for p in &mut positions {
            p.0 += shift.0;
            p.1 += shift.1;
        }
    }
    Ok(positions)
}

/// Generation frame and the translation mapping it back to the true frame.
fn generation_frame(region: &Region, boundary: &BoundaryPolicy) -> (Region, (f64, f64)) {
    match (region, boundary) {
        (Region::Circle { radius }, BoundaryPolicy::Overgenerate { margin }) => {
            (Region::Circle { radius: radius + margin }, (0.0, 0.0))
        }
        (Region::Square { side }, BoundaryPolicy::Overgenerate { margin }) => {
            (Region::Square { side: side + 2.0 * margin }, (-margin, -margin))
        }
        _ => (*region, (0.0, 0.0)),
    }
}

/// Draw the dislocation count for a run with mean `lambda`.
fn target_count(
    lambda: f64,
    rule: CountRule,
    even: bool,
    rng: &mut impl Rng,
) -> Result<usize> {
    let mut n = match rule {
        CountRule::Fixed => lambda.round() as usize,
        CountRule::Poisson => {
            let poisson = Poisson::new(lambda).map_err(|_| {
                CoreError::InvalidParameter(format!("invalid Poisson mean {}", lambda))
            })?;
            poisson.sample(rng) as usize
        }
    };
    // dipole pairing needs an even population
    if even && n % 2 == 1 {
        n += 1;
    }
    Ok(n)
}

/// Uniform position inside the frame.
fn uniform_position(frame: &Region, rng: &mut impl Rng) -> (f64, f64) {
    match frame {
        Region::Circle { radius } => {
            let phi = 2.0 * PI * rng.gen::<f64>();
            let rad = radius * rng.gen::<f64>().sqrt();
            (rad * phi.cos(), rad * phi.sin())
        }
        Region::Square { side } => (side * rng.gen::<f64>(), side * rng.gen::<f64>()),
    }
}

/// Rejection sampling with a minimum-separation constraint.
fn place_restricted(
    frame: &Region,
    n: usize,
    min_separation: f64,
    periodic: bool,
    rng: &mut impl Rng,
) -> Result<Vec<(f64, f64)>> {
    let mut accepted: Vec<(f64, f64)> = Vec::with_capacity(n);
    let mut attempts = 0usize;
    while accepted.len() < n {
        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            attempts += 1;
            let candidate = uniform_position(frame, rng);
            if accepted
                .iter()
                .all(|&p| frame.distance(candidate, p, periodic) >= min_separation)
            {
                accepted.push(candidate);
                placed = true;
                break;
            }
        }
        if !placed {
            return Err(CoreError::GenerationInfeasible { placed: accepted.len(), attempts });
        }
    }
    log::debug!("restricted placement: {} points in {} attempts", n, attempts);
    Ok(accepted)
}

/// Cell-partitioned placement inside the four wall bricks of each cell.
///
/// With `dipole` set, each wall point is the midpoint of a +/- pair
/// separated by the dipole length at a uniform random orientation; the two
/// partners are pushed consecutively so that generation order carries the
/// pairing.
fn place_cellular(
    frame: &Region,
    density: f64,
    cell_side: f64,
    wall_thickness: f64,
    dipole: Option<f64>,
    rng: &mut impl Rng,
) -> Vec<(f64, f64)> {
    let fill = cell_fill(density, cell_side);
    let ticks = cell_ticks(frame, cell_side);
    let mut positions = Vec::with_capacity(fill * ticks.len() * ticks.len());
    for &cy in &ticks {
        for &cx in &ticks {
            if let Some(length) = dipole {
                for _ in 0..fill / 2 {
                    let (wx, wy) = wall_position(cell_side, wall_thickness, rng);
                    let phi = 2.0 * PI * rng.gen::<f64>();
                    let (ux, uy) = (0.5 * length * phi.cos(), 0.5 * length * phi.sin());
                    positions.push((cx + wx + ux, cy + wy + uy));
                    positions.push((cx + wx - ux, cy + wy - uy));
                }
            } else {
                for _ in 0..fill {
                    let (wx, wy) = wall_position(cell_side, wall_thickness, rng);
                    positions.push((cx + wx, cy + wy));
                }
            }
        }
    }
    positions
}

/// Dislocations per cell: density-derived, even, at least two.
fn cell_fill(density: f64, cell_side: f64) -> usize {
    let f = (density * cell_side * cell_side).round();
    (2.0 * (f / 2.0).round().max(1.0)) as usize
}

/// Lower-left corner coordinates of the cell grid along one axis.
fn cell_ticks(frame: &Region, cell_side: f64) -> Vec<f64> {
    let size = frame.size();
    let m = (size / cell_side).ceil();
    if ((m * cell_side - size) / size).abs() > 1e-4 {
        log::warn!(
            "cell side {} is not a divisor of the region size {}",
            cell_side,
            size
        );
    }
    let m = m as i64;
    match frame {
        Region::Circle { .. } => (-m..m).map(|k| k as f64 * cell_side).collect(),
        Region::Square { .. } => (0..m).map(|k| k as f64 * cell_side).collect(),
    }
}

/// Uniform position inside one of the four wall bricks of a cell,
/// relative to the cell's lower-left corner.
fn wall_position(cell_side: f64, wall_thickness: f64, rng: &mut impl Rng) -> (f64, f64) {
    let l1 = wall_thickness / 2.0;
    let l2 = cell_side - l1;
    let (ux, uy) = (rng.gen::<f64>(), rng.gen::<f64>());
    match rng.gen_range(0..4) {
        0 => (l1 + l2 * ux, l1 * uy),
        1 => (l2 * ux, l2 + l1 * uy),
        2 => (l1 * ux, l2 * uy),
        _ => (l2 + l1 * ux, l1 + l2 * uy),
    }
}
