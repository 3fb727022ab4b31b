//! # disloc_core - Dislocation Distribution Engine
//!
//! This library generates synthetic two-dimensional dislocation patterns
//! (position + Burgers vector sense) inside a bounded region and computes
//! edge-corrected spatial-correlation statistics of the generated
//! patterns, for comparison against physical samples.
//!
//! ## Features
//! - Three stochastic placement models (independent, restricted, cellular)
//!   composed with sign-assignment variants and boundary policies
//! - Deterministic generation (same seed = same pattern), with one
//!   independent substream per distribution when generating in parallel
//! - Pair correlation g(r), Ripley K(r) and their symmetric/antisymmetric
//!   sense decomposition, averaged over samples of distributions
//! - Standardized record export for the X-ray diffraction simulation
//!   program

pub mod analyze;
pub mod dislocation;
pub mod distribution;
pub mod error;
pub mod export;
pub mod generate;
pub mod region;

pub use analyze::{
    Analyzer, DistributionStats, EdgeCorrection, RadiusBins, SenseCurves, SensePair,
    SpatialAnalysis,
};
pub use dislocation::{Dislocation, Sense};
pub use distribution::{Distribution, Sample};
pub use error::{CoreError, Result};
pub use export::{DislocationCharacter, ExportConfig};
pub use generate::{BoundaryPolicy, CountRule, GeneratorConfig, Model, SignVariant};
pub use region::Region;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
