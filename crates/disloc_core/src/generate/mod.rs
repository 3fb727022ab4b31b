//! Random generation of dislocation distributions.
//!
//! A generation run is configured along three independent axes:
//! - [`Model`]: how positions are placed (independent, restricted, cellular)
//! - [`SignVariant`]: how Burgers vector senses are assigned
//! - [`BoundaryPolicy`]: how the region boundary is treated
//!
//! The generator dispatches on the product of these enumerations with
//! explicit matches. All parameters are validated eagerly, before any
//! random draw.

mod boundary;
mod models;
mod signs;

use crate::dislocation::Dislocation;
use crate::error::{CoreError, Result};
use crate::region::Region;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the dislocation count of a run is drawn from `density * area`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountRule {
    /// Deterministic count, rounded to the nearest integer.
    Fixed,
    /// Poisson-distributed count with mean `density * area`.
    Poisson,
}

/// Stochastic placement model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Model {
    /// Uniform placement over the generation domain.
    Independent { density: f64, count: CountRule },
    /// Uniform placement with a minimum-separation constraint enforced by
    /// rejection sampling with a bounded retry budget.
    Restricted { density: f64, min_separation: f64 },
    /// Regular grid of square cells; dislocations are placed inside the
    /// four wall bricks of each cell. With the dipolar sign variant each
    /// wall point becomes a +/- pair separated by `dipole_length`.
    Cellular {
        density: f64,
        cell_side: f64,
        wall_thickness: f64,
        dipole_length: f64,
    },
}

impl Model {
    pub fn density(&self) -> f64 {
        match self {
            Model::Independent { density, .. }
            | Model::Restricted { density, .. }
            | Model::Cellular { density, .. } => *density,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Model::Independent { .. } => "independent",
            Model::Restricted { .. } => "restricted",
            Model::Cellular { .. } => "cellular",
        }
    }
}

/// Burgers vector sense assignment, applied once positions are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignVariant {
    /// Each sense drawn independently and uniformly.
    Random,
    /// Sense counts differ by at most one; order randomized.
    Balanced,
    /// Opposite senses assigned to consecutive pairs in generation order.
    Dipolar,
}

impl SignVariant {
    pub fn name(&self) -> &'static str {
        match self {
            SignVariant::Random => "random",
            SignVariant::Balanced => "balanced",
            SignVariant::Dipolar => "dipolar",
        }
    }
}

/// Treatment of the region boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// No boundary treatment; points strictly inside the region.
    Plain,
    /// Square only: the region is treated as a torus during generation
    /// (rejection checks of the restricted model use the periodic metric).
    /// With `replicas >= 1` the pattern is additionally replicated in the
    /// surrounding rings of translated copies; replicas are kept as
    /// non-physical companion points.
    Periodic { replicas: u32 },
    /// Circle only: the circle-inversion image of every dislocation is
    /// appended with opposite sense, as a non-physical companion point.
    Images,
    /// The placement domain is enlarged by `margin` on every side; points
    /// outside the true region are cropped after sign assignment.
    Overgenerate { margin: f64 },
}

impl BoundaryPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryPolicy::Plain => "plain",
            BoundaryPolicy::Periodic { .. } => "periodic",
            BoundaryPolicy::Images => "images",
            BoundaryPolicy::Overgenerate { .. } => "overgenerate",
        }
    }
}

/// Full configuration of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub model: Model,
    pub sign_variant: SignVariant,
    pub boundary: BoundaryPolicy,
}

impl GeneratorConfig {
    pub fn new(model: Model, sign_variant: SignVariant, boundary: BoundaryPolicy) -> Self {
        Self { model, sign_variant, boundary }
    }

    /// Validate the configuration against a region. Fails before any
    /// generation work begins.
    pub fn validate(&self, region: &Region) -> Result<()> {
        let density = self.model.density();
        if !density.is_finite() || density <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "density must be strictly positive, got {}",
                density
            )));
        }
        match self.model {
            Model::Independent { .. } => {}
            Model::Restricted { min_separation, .. } => {
                if !min_separation.is_finite() || min_separation <= 0.0 {
                    return Err(CoreError::InvalidParameter(format!(
                        "minimum separation must be strictly positive, got {}",
                        min_separation
                    )));
                }
                // Exclusion-disk packing fraction. Random sequential
                // placement jams near 0.547; above 0.5 the retry budget
                // has no realistic chance.
                let packing =
                    density * std::f64::consts::PI * min_separation * min_separation / 4.0;
                if packing > 0.5 {
                    return Err(CoreError::InvalidParameter(format!(
                        "minimum separation {} is infeasible at density {} (packing fraction {:.3})",
                        min_separation, density, packing
                    )));
                }
            }
            Model::Cellular { cell_side, wall_thickness, dipole_length, .. } => {
                if !cell_side.is_finite() || cell_side <= 0.0 {
                    return Err(CoreError::InvalidParameter(format!(
                        "cell side must be strictly positive, got {}",
                        cell_side
                    )));
                }
                if !wall_thickness.is_finite() || wall_thickness <= 0.0 {
                    return Err(CoreError::InvalidParameter(format!(
                        "wall thickness must be strictly positive, got {}",
                        wall_thickness
                    )));
                }
                if wall_thickness > cell_side / 2.0 {
                    return Err(CoreError::InvalidParameter(format!(
                        "wall thickness {} inconsistent with cell side {}",
                        wall_thickness, cell_side
                    )));
                }
                if self.sign_variant == SignVariant::Dipolar
                    && (!dipole_length.is_finite() || dipole_length <= 0.0)
                {
                    return Err(CoreError::InvalidParameter(format!(
                        "dipole length must be strictly positive, got {}",
                        dipole_length
                    )));
                }
            }
        }
        match self.boundary {
            BoundaryPolicy::Plain => {}
            BoundaryPolicy::Periodic { .. } => {
                if !matches!(region, Region::Square { .. }) {
                    return Err(CoreError::InvalidParameter(
                        "periodic boundary policy requires a square region".into(),
                    ));
                }
            }
            BoundaryPolicy::Images => {
                if !matches!(region, Region::Circle { .. }) {
                    return Err(CoreError::InvalidParameter(
                        "image boundary policy requires a circular region".into(),
                    ));
                }
            }
            BoundaryPolicy::Overgenerate { margin } => {
                if !margin.is_finite() || margin <= 0.0 {
                    return Err(CoreError::InvalidParameter(format!(
                        "overgeneration margin must be strictly positive, got {}",
                        margin
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Outcome of one generation run, before being wrapped in a distribution.
pub(crate) struct Generated {
    pub dislocations: Vec<Dislocation>,
    pub companions: Vec<Dislocation>,
}

/// Run the generator once. Positions are placed by the model, senses are
/// assigned by the variant, then the boundary policy crops the pattern
/// and/or appends its non-physical companion points.
pub(crate) fn realize(
    region: &Region,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Result<Generated> {
    config.validate(region)?;

    let positions = models::place(region, config, rng)?;

    // Dipole pairs must be formed before cropping so that edge truncation
    // can split a pair; the balanced variant assigns after cropping so the
    // sense-count invariant survives the crop.
    let dislocations = match config.sign_variant {
        SignVariant::Dipolar => {
            let mut placed = signs::assign(SignVariant::Dipolar, positions, rng);
            placed.retain(|d| region.contains(d.x, d.y));
            placed
        }
        variant => {
            let mut positions = positions;
            positions.retain(|&(x, y)| region.contains(x, y));
            signs::assign(variant, positions, rng)
        }
    };

    let companions = match config.boundary {
        BoundaryPolicy::Images => match region {
            Region::Circle { radius } => boundary::images(*radius, &dislocations),
            Region::Square { .. } => unreachable!("validated: images requires a circle"),
        },
        BoundaryPolicy::Periodic { replicas } if replicas > 0 => match region {
            Region::Square { side } => boundary::replications(*side, &dislocations, replicas),
            Region::Circle { .. } => unreachable!("validated: periodic requires a square"),
        },
        _ => Vec::new(),
    };

    Ok(Generated { dislocations, companions })
}
