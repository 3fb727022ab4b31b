//! Distributions and samples of distributions.
//!
//! A [`Distribution`] is the immutable result of one generation run. A
//! [`Sample`] is an ordered collection of independently generated
//! distributions sharing the same region and configuration, used to
//! average statistics over repetitions.

use crate::dislocation::{Dislocation, Sense};
use crate::error::{CoreError, Result};
use crate::generate::{self, GeneratorConfig};
use crate::region::Region;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seed mixing constant for per-distribution substreams.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// One generated dislocation pattern within a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    region: Region,
    config: GeneratorConfig,
    dislocations: Vec<Dislocation>,
    companions: Vec<Dislocation>,
}

impl Distribution {
    /// Generate a distribution with the given configuration.
    pub fn generate(
        region: Region,
        config: &GeneratorConfig,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let generated = generate::realize(&region, config, rng)?;
        Ok(Self {
            region,
            config: *config,
            dislocations: generated.dislocations,
            companions: generated.companions,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Physical dislocations, all inside the region.
    pub fn dislocations(&self) -> &[Dislocation] {
        &self.dislocations
    }

    /// Non-physical companion points (boundary images or replicas). They
    /// are exported to the diffraction simulation but never analyzed.
    pub fn companions(&self) -> &[Dislocation] {
        &self.companions
    }

    /// Physical dislocations followed by companions, in export order.
    pub fn all_points(&self) -> impl Iterator<Item = &Dislocation> {
        self.dislocations.iter().chain(self.companions.iter())
    }

    /// Number of physical dislocations.
    pub fn len(&self) -> usize {
        self.dislocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dislocations.is_empty()
    }

    /// Realized density of physical dislocations [nm^-2].
    pub fn density(&self) -> f64 {
        self.dislocations.len() as f64 / self.region.area()
    }

    /// Mean inter-dislocation distance 1/sqrt(density) [nm].
    pub fn inter_distance(&self) -> f64 {
        1.0 / self.density().sqrt()
    }

    pub fn sense_count(&self, sense: Sense) -> usize {
        self.dislocations.iter().filter(|d| d.sense == sense).count()
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Distribution:")?;
        writeln!(f, "- region: {:?}", self.region)?;
        writeln!(
            f,
            "- model: {} / {} / {}",
            self.config.model.name(),
            self.config.sign_variant.name(),
            self.config.boundary.name()
        )?;
        writeln!(f, "- population: {} dislocations", self.len())?;
        writeln!(f, "- density: {:.3e} nm^-2", self.density())?;
        writeln!(f, "- inter-dislocation distance: {:.1} nm", self.inter_distance())?;
        write!(
            f,
            "- senses: {} plus / {} minus",
            self.sense_count(Sense::Plus),
            self.sense_count(Sense::Minus)
        )
    }
}

/// An ordered collection of independently generated distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    region: Region,
    config: GeneratorConfig,
    distributions: Vec<Distribution>,
}

impl Sample {
    /// Generate `n` distributions sequentially from one shared stream.
    ///
    /// The stream advances monotonically across distributions; no
    /// sub-stream is reused.
    pub fn generate(
        n: usize,
        region: Region,
        config: &GeneratorConfig,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if n == 0 {
            return Err(CoreError::InvalidParameter(
                "sample size must be strictly positive".into(),
            ));
        }
        let mut distributions = Vec::with_capacity(n);
        for _ in 0..n {
            distributions.push(Distribution::generate(region, config, rng)?);
        }
        Ok(Self { region, config: *config, distributions })
    }

    /// Generate `n` distributions in parallel, one independent seeded
    /// substream per distribution index. Deterministic for a given seed.
    pub fn generate_seeded(
        n: usize,
        region: Region,
        config: &GeneratorConfig,
        seed: u64,
    ) -> Result<Self> {
        if n == 0 {
            return Err(CoreError::InvalidParameter(
                "sample size must be strictly positive".into(),
            ));
        }
        let distributions = (0..n as u64)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed ^ i.wrapping_mul(SEED_MIX));
                Distribution::generate(region, config, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { region, config: *config, distributions })
    }

    /// Wrap independently generated distributions into a sample. All
    /// members must share the same region and configuration.
    pub fn from_distributions(distributions: Vec<Distribution>) -> Result<Self> {
        let first = distributions.first().ok_or_else(|| {
            CoreError::InvalidParameter("sample size must be strictly positive".into())
        })?;
        let (region, config) = (first.region, first.config);
        if distributions.iter().any(|d| d.region != region || d.config != config) {
            return Err(CoreError::InvalidParameter(
                "all distributions of a sample must share region and configuration".into(),
            ));
        }
        Ok(Self { region, config, distributions })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    /// Density averaged over the sample [nm^-2].
    pub fn mean_density(&self) -> f64 {
        let sum: f64 = self.distributions.iter().map(|d| d.density()).sum();
        sum / self.distributions.len() as f64
    }

    /// Inter-dislocation distance averaged over the sample [nm].
    pub fn mean_inter_distance(&self) -> f64 {
        let sum: f64 = self.distributions.iter().map(|d| d.inter_distance()).sum();
        sum / self.distributions.len() as f64
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Sample: {} distributions", self.len())?;
        writeln!(f, "- region: {:?}", self.region)?;
        writeln!(
            f,
            "- model: {} / {} / {}",
            self.config.model.name(),
            self.config.sign_variant.name(),
            self.config.boundary.name()
        )?;
        writeln!(f, "- mean density: {:.3e} nm^-2", self.mean_density())?;
        write!(f, "- mean inter-dislocation distance: {:.1} nm", self.mean_inter_distance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{BoundaryPolicy, CountRule, Model, SignVariant};

    fn config() -> GeneratorConfig {
        GeneratorConfig::new(
            Model::Independent { density: 1e-4, count: CountRule::Fixed },
            SignVariant::Balanced,
            BoundaryPolicy::Plain,
        )
    }

    #[test]
    fn test_sample_rejects_zero_size() {
        let region = Region::square(500.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(Sample::generate(0, region, &config(), &mut rng).is_err());
    }

    #[test]
    fn test_sample_generates_n_independent_distributions() {
        let region = Region::square(500.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let sample = Sample::generate(4, region, &config(), &mut rng).unwrap();
        assert_eq!(sample.len(), 4);
        // independent realizations differ
        let a = sample.distributions()[0].dislocations();
        let b = sample.distributions()[1].dislocations();
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let region = Region::circle(500.0).unwrap();
        let s1 = Sample::generate_seeded(6, region, &config(), 42).unwrap();
        let s2 = Sample::generate_seeded(6, region, &config(), 42).unwrap();
        for (a, b) in s1.distributions().iter().zip(s2.distributions()) {
            assert_eq!(a.dislocations(), b.dislocations());
        }
        let s3 = Sample::generate_seeded(6, region, &config(), 43).unwrap();
        assert_ne!(
            s1.distributions()[0].dislocations(),
            s3.distributions()[0].dislocations()
        );
    }

    #[test]
    fn test_from_distributions_requires_uniform_configuration() {
        let region = Region::square(500.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let d1 = Distribution::generate(region, &config(), &mut rng).unwrap();
        let other = Region::square(600.0).unwrap();
        let d2 = Distribution::generate(other, &config(), &mut rng).unwrap();
        assert!(Sample::from_distributions(vec![d1.clone()]).is_ok());
        assert!(Sample::from_distributions(vec![d1, d2]).is_err());
        assert!(Sample::from_distributions(Vec::new()).is_err());
    }

    #[test]
    fn test_density_and_inter_distance() {
        let region = Region::square(1000.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let d = Distribution::generate(region, &config(), &mut rng).unwrap();
        assert_eq!(d.len(), 100);
        assert!((d.density() - 1e-4).abs() < 1e-12);
        assert!((d.inter_distance() - 100.0).abs() < 1e-9);
    }
}
