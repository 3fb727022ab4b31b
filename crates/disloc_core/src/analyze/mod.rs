//! Edge-corrected spatial statistics of dislocation distributions.
//!
//! For each ordered sense pair (a, b) the analyzer accumulates, over every
//! dislocation of sense a, the corrected cumulative count of sense-b
//! neighbors per analysis radius:
//!
//! - M_ab(r): mean corrected neighbor count within radius r
//! - K_ab(r): Ripley-style cumulative correlation, M_ab normalized by the
//!   counted population's density
//! - g_ab(r): pair correlation, the radial derivative of K_ab normalized
//!   by the perimeter 2*pi*r
//!
//! The four sense-pair curves recombine into a symmetric component (sign
//! blind clustering) and an antisymmetric component (the like-sign versus
//! opposite-sign contrast). Curves average arithmetically over a sample;
//! a distribution with no dislocation of a required sense contributes
//! nothing to the affected curves, and a curve with no contributor at all
//! is reported as an explicit no-data marker rather than zero.

mod grid;
mod overlap;

use crate::dislocation::Sense;
use crate::distribution::{Distribution, Sample};
use crate::error::{CoreError, Result};
use crate::region::Region;
use grid::CellGrid;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Below this population size the direct pairwise scan beats the grid.
const GRID_MIN_POINTS: usize = 128;

/// Ascending analysis radii [nm].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusBins {
    radii: Vec<f64>,
}

impl RadiusBins {
    /// Validate an explicit radius sequence: finite, non-negative,
    /// strictly ascending, with a positive maximum.
    pub fn new(radii: Vec<f64>) -> Result<Self> {
        if radii.is_empty() {
            return Err(CoreError::InvalidParameter("no analysis radii".into()));
        }
        if radii.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(CoreError::InvalidParameter(
                "analysis radii must be finite and non-negative".into(),
            ));
        }
        if radii.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CoreError::InvalidParameter(
                "analysis radii must be strictly ascending".into(),
            ));
        }
        if *radii.last().unwrap() <= 0.0 {
            return Err(CoreError::InvalidParameter(
                "maximum analysis radius must be positive".into(),
            ));
        }
        Ok(Self { radii })
    }

    /// `count` evenly spaced radii from 0 to `max` inclusive.
    pub fn uniform(max: f64, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(CoreError::InvalidParameter(
                "at least two analysis radii are required".into(),
            ));
        }
        if !max.is_finite() || max <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "maximum analysis radius must be positive, got {}",
                max
            )));
        }
        let step = max / (count - 1) as f64;
        Ok(Self { radii: (0..count).map(|i| i as f64 * step).collect() })
    }

    /// Default span for a pattern with the given mean inter-dislocation
    /// distance inside a region of the given characteristic size: radii up
    /// to half the region size, with a bin density of one hundred bins per
    /// four inter-dislocation distances.
    pub fn suggested(inter_distance: f64, size: f64) -> Result<Self> {
        let max = size / 2.0;
        let count = (max * 100.0 / (4.0 * inter_distance)).round() as usize;
        Self::uniform(max, count.max(2))
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    pub fn max_radius(&self) -> f64 {
        *self.radii.last().unwrap()
    }
}

/// Compensation for neighborhoods truncated by the region boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeCorrection {
    /// Raw counts; biased near the boundary, fast.
    None,
    /// Each center's contribution at radius r is divided by the fraction
    /// of the probe disk of radius r that lies inside the region.
    OverlapWeighting,
}

/// Ordered sense pair (center sense, counted sense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensePair {
    PlusPlus,
    PlusMinus,
    MinusPlus,
    MinusMinus,
}

impl SensePair {
    pub fn label(&self) -> &'static str {
        match self {
            SensePair::PlusPlus => "++",
            SensePair::PlusMinus => "+-",
            SensePair::MinusPlus => "-+",
            SensePair::MinusMinus => "--",
        }
    }
}

/// One curve per ordered sense pair; `None` marks a curve with no
/// contributing data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenseCurves {
    pub pp: Option<Vec<f64>>,
    pub pm: Option<Vec<f64>>,
    pub mp: Option<Vec<f64>>,
    pub mm: Option<Vec<f64>>,
}

impl SenseCurves {
    pub fn get(&self, pair: SensePair) -> Option<&[f64]> {
        match pair {
            SensePair::PlusPlus => self.pp.as_deref(),
            SensePair::PlusMinus => self.pm.as_deref(),
            SensePair::MinusPlus => self.mp.as_deref(),
            SensePair::MinusMinus => self.mm.as_deref(),
        }
    }

    /// The curve for `pair`, or [`CoreError::UndefinedStatistic`] if no
    /// distribution contributed to it.
    pub fn require(&self, pair: SensePair) -> Result<&[f64]> {
        self.get(pair).ok_or_else(|| {
            CoreError::UndefinedStatistic(format!(
                "no contributing pairs for sense combination {}",
                pair.label()
            ))
        })
    }
}

/// Statistics of a single distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionStats {
    pub plus_count: usize,
    pub minus_count: usize,
    /// M_ab: mean corrected cumulative neighbor counts.
    pub neighbor_counts: SenseCurves,
    /// K_ab: Ripley cumulative correlation.
    pub ripley_k: SenseCurves,
    /// g_ab: pair correlation (endpoints are NaN, the centered difference
    /// is undefined there).
    pub pair_correlation: SenseCurves,
    /// Gs: sign-blind combination of the four M curves.
    pub symmetric: Option<Vec<f64>>,
    /// Ga: like-sign versus opposite-sign contrast.
    pub antisymmetric: Option<Vec<f64>>,
}

/// Sample-averaged statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialAnalysis {
    pub radii: Vec<f64>,
    pub distributions: usize,
    pub mean_plus_count: f64,
    pub mean_minus_count: f64,
    pub neighbor_counts: SenseCurves,
    pub ripley_k: SenseCurves,
    pub pair_correlation: SenseCurves,
    pub symmetric: Option<Vec<f64>>,
    pub antisymmetric: Option<Vec<f64>>,
}

impl SpatialAnalysis {
    /// Serialized curves for the plotting collaborator.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::SerializationError(e.to_string()))
    }
}

/// Stateless computation of sample-averaged spatial statistics.
#[derive(Debug, Clone)]
pub struct Analyzer {
    bins: RadiusBins,
    correction: EdgeCorrection,
}

impl Analyzer {
    pub fn new(bins: RadiusBins, correction: EdgeCorrection) -> Self {
        Self { bins, correction }
    }

    pub fn bins(&self) -> &RadiusBins {
        &self.bins
    }

    /// Analyze a sample: per-distribution statistics in parallel, then a
    /// curve-wise arithmetic average.
    pub fn analyze(&self, sample: &Sample) -> Result<SpatialAnalysis> {
        self.analyze_all(sample.distributions())
    }

    /// Analyze an explicit list of distributions.
    pub fn analyze_all(&self, distributions: &[Distribution]) -> Result<SpatialAnalysis> {
        if distributions.is_empty() {
            return Err(CoreError::EmptySample);
        }
        let stats: Vec<DistributionStats> = distributions
            .par_iter()
            .map(|d| self.distribution_stats(d))
            .collect();

        let len = self.bins.len();
        let mut acc = AnalysisAccum::new(len);
        for s in &stats {
            acc.add(s);
        }
        Ok(acc.finish(self.bins.radii().to_vec(), stats.len()))
    }

    /// Statistics of one distribution. Curves whose center population is
    /// empty (or whose counted population is empty, for the normalized
    /// quantities) come back as `None`.
    pub fn distribution_stats(&self, distribution: &Distribution) -> DistributionStats {
        let region = distribution.region();
        let area = region.area();
        let radii = self.bins.radii();
        let rmax = self.bins.max_radius();

        let plus: Vec<(f64, f64)> = distribution
            .dislocations()
            .iter()
            .filter(|d| d.sense == Sense::Plus)
            .map(|d| d.position())
            .collect();
        let minus: Vec<(f64, f64)> = distribution
            .dislocations()
            .iter()
            .filter(|d| d.sense == Sense::Minus)
            .map(|d| d.position())
            .collect();
        let (cp, cm) = (plus.len(), minus.len());

        let plus_grid = (cp >= GRID_MIN_POINTS)
            .then(|| CellGrid::build(&plus, region.bounding_box(), rmax));
        let minus_grid = (cm >= GRID_MIN_POINTS)
            .then(|| CellGrid::build(&minus, region.bounding_box(), rmax));

        let m = SenseCurves {
            pp: (cp > 0).then(|| {
                self.corrected_counts(region, &plus, &plus, plus_grid.as_ref())
            }),
            pm: (cp > 0).then(|| {
                self.corrected_counts(region, &plus, &minus, minus_grid.as_ref())
            }),
            mp: (cm > 0).then(|| {
                self.corrected_counts(region, &minus, &plus, plus_grid.as_ref())
            }),
            mm: (cm > 0).then(|| {
                self.corrected_counts(region, &minus, &minus, minus_grid.as_ref())
            }),
        };

        // K_ab normalizes by the counted population's density
        let normalize = |curve: &Option<Vec<f64>>, counted: usize| -> Option<Vec<f64>> {
            let curve = curve.as_ref()?;
            (counted > 0).then(|| {
                let density = counted as f64 / area;
                curve.iter().map(|v| v / density).collect()
            })
        };
        let k = SenseCurves {
            pp: normalize(&m.pp, cp),
            pm: normalize(&m.pm, cm),
            mp: normalize(&m.mp, cp),
            mm: normalize(&m.mm, cm),
        };

        let g = SenseCurves {
            pp: k.pp.as_ref().map(|k| pair_correlation_curve(k, radii)),
            pm: k.pm.as_ref().map(|k| pair_correlation_curve(k, radii)),
            mp: k.mp.as_ref().map(|k| pair_correlation_curve(k, radii)),
            mm: k.mm.as_ref().map(|k| pair_correlation_curve(k, radii)),
        };

        // both senses must be populated for the combined curves
        let (symmetric, antisymmetric) = if cp > 0 && cm > 0 {
            let (fp, fm) = (cp as f64, cm as f64);
            let (m_pp, m_pm) = (m.pp.as_ref().unwrap(), m.pm.as_ref().unwrap());
            let (m_mp, m_mm) = (m.mp.as_ref().unwrap(), m.mm.as_ref().unwrap());
            let mut gs = Vec::with_capacity(radii.len());
            let mut ga = Vec::with_capacity(radii.len());
            for j in 0..radii.len() {
                gs.push(fp * (m_pp[j] + m_pm[j]) + fm * (m_mm[j] + m_mp[j]));
                ga.push(fp * (m_pp[j] - m_pm[j]) + fm * (m_mm[j] - m_mp[j]));
            }
            (Some(gs), Some(ga))
        } else {
            (None, None)
        };

        DistributionStats {
            plus_count: cp,
            minus_count: cm,
            neighbor_counts: m,
            ripley_k: k,
            pair_correlation: g,
            symmetric,
            antisymmetric,
        }
    }

    /// Mean corrected cumulative neighbor count around `centers`, counting
    /// `counted`, per analysis radius. A counted point coinciding with the
    /// center (the center itself included) is not counted.
    fn corrected_counts(
        &self,
        region: &Region,
        centers: &[(f64, f64)],
        counted: &[(f64, f64)],
        grid: Option<&CellGrid>,
    ) -> Vec<f64> {
        let radii = self.bins.radii();
        let rmax = self.bins.max_radius();
        let rmax2 = rmax * rmax;
        let mut sums = vec![0.0; radii.len()];
        let mut d2s: Vec<f64> = Vec::new();
        let mut candidates: Vec<u32> = Vec::new();
        for &(x, y) in centers {
            d2s.clear();
            let mut push = |px: f64, py: f64| {
                let d2 = (px - x) * (px - x) + (py - y) * (py - y);
                if d2 > 0.0 && d2 <= rmax2 {
                    d2s.push(d2);
                }
            };
            match grid {
                Some(grid) => {
                    grid.gather(x, y, rmax, &mut candidates);
                    for &i in &candidates {
                        let (px, py) = counted[i as usize];
                        push(px, py);
                    }
                }
                None => {
                    for &(px, py) in counted {
                        push(px, py);
                    }
                }
            }
            d2s.sort_unstable_by(f64::total_cmp);
            let counts = cumulative_counts(radii, &d2s);
            match self.correction {
                EdgeCorrection::None => {
                    for (s, c) in sums.iter_mut().zip(&counts) {
                        *s += c;
                    }
                }
                EdgeCorrection::OverlapWeighting => {
                    for j in 0..radii.len() {
                        sums[j] += edge_weight(region, (x, y), radii[j]) * counts[j];
                    }
                }
            }
        }
        let n = centers.len() as f64;
        sums.iter_mut().for_each(|s| *s /= n);
        sums
    }
}

/// Cumulative counts of squared distances per radius bin (bin boundary
/// inclusive: d <= r counts at r).
fn cumulative_counts(radii: &[f64], sorted_d2: &[f64]) -> Vec<f64> {
    let mut counts = vec![0.0; radii.len()];
    let mut j = 0;
    for &d2 in sorted_d2 {
        while d2 > radii[j] * radii[j] {
            j += 1;
        }
        counts[j] += 1.0;
    }
    let mut total = 0.0;
    for c in counts.iter_mut() {
        total += *c;
        *c = total;
    }
    counts
}

/// Edge-correction weight of a center at probe radius r: the inverse of
/// the in-region fraction of the probe disk. Unity at r = 0.
fn edge_weight(region: &Region, center: (f64, f64), r: f64) -> f64 {
    if r <= 0.0 {
        return 1.0;
    }
    let probe_area = PI * r * r;
    let inside = match region {
        Region::Circle { radius } => {
            let d = (center.0 * center.0 + center.1 * center.1).sqrt();
            overlap::circle_circle(r, *radius, d)
        }
        Region::Square { side } => overlap::circle_square(center.0, center.1, r, *side),
    };
    probe_area / inside
}

/// Pair correlation from a cumulative K curve by centered differences.
/// The endpoints have no centered difference and are NaN.
fn pair_correlation_curve(k: &[f64], radii: &[f64]) -> Vec<f64> {
    let n = k.len();
    let mut g = vec![f64::NAN; n];
    for j in 1..n.saturating_sub(1) {
        let dk = k[j + 1] - k[j - 1];
        let dr = radii[j + 1] - radii[j - 1];
        let perimeter = if radii[j] != 0.0 { 2.0 * PI * radii[j] } else { 1.0 };
        g[j] = dk / dr / perimeter;
    }
    g
}

/// Curve-wise running mean that tracks how many distributions contributed.
struct CurveMean {
    sum: Vec<f64>,
    n: usize,
}

impl CurveMean {
    fn new(len: usize) -> Self {
        Self { sum: vec![0.0; len], n: 0 }
    }

    fn add(&mut self, values: Option<&Vec<f64>>) {
        if let Some(values) = values {
            for (s, v) in self.sum.iter_mut().zip(values) {
                *s += v;
            }
            self.n += 1;
        }
    }

    fn mean(self) -> Option<Vec<f64>> {
        (self.n > 0).then(|| {
            let n = self.n as f64;
            self.sum.into_iter().map(|s| s / n).collect()
        })
    }
}

struct AnalysisAccum {
    m: [CurveMean; 4],
    k: [CurveMean; 4],
    g: [CurveMean; 4],
    gs: CurveMean,
    ga: CurveMean,
    plus_total: usize,
    minus_total: usize,
}

impl AnalysisAccum {
    fn new(len: usize) -> Self {
        Self {
            m: std::array::from_fn(|_| CurveMean::new(len)),
            k: std::array::from_fn(|_| CurveMean::new(len)),
            g: std::array::from_fn(|_| CurveMean::new(len)),
            gs: CurveMean::new(len),
            ga: CurveMean::new(len),
            plus_total: 0,
            minus_total: 0,
        }
    }

    fn add(&mut self, s: &DistributionStats) {
        let m = &s.neighbor_counts;
        let k = &s.ripley_k;
        let g = &s.pair_correlation;
        for (i, curves) in [m, k, g].into_iter().enumerate() {
            let dst = match i {
                0 => &mut self.m,
                1 => &mut self.k,
                _ => &mut self.g,
            };
            dst[0].add(curves.pp.as_ref());
            dst[1].add(curves.pm.as_ref());
            dst[2].add(curves.mp.as_ref());
            dst[3].add(curves.mm.as_ref());
        }
        self.gs.add(s.symmetric.as_ref());
        self.ga.add(s.antisymmetric.as_ref());
        self.plus_total += s.plus_count;
        self.minus_total += s.minus_count;
    }

    fn finish(self, radii: Vec<f64>, distributions: usize) -> SpatialAnalysis {
        let [m_pp, m_pm, m_mp, m_mm] = self.m;
        let [k_pp, k_pm, k_mp, k_mm] = self.k;
        let [g_pp, g_pm, g_mp, g_mm] = self.g;
        SpatialAnalysis {
            radii,
            distributions,
            mean_plus_count: self.plus_total as f64 / distributions as f64,
            mean_minus_count: self.minus_total as f64 / distributions as f64,
            neighbor_counts: SenseCurves {
                pp: m_pp.mean(),
                pm: m_pm.mean(),
                mp: m_mp.mean(),
                mm: m_mm.mean(),
            },
            ripley_k: SenseCurves {
                pp: k_pp.mean(),
                pm: k_pm.mean(),
                mp: k_mp.mean(),
                mm: k_mm.mean(),
            },
            pair_correlation: SenseCurves {
                pp: g_pp.mean(),
                pm: g_pm.mean(),
                mp: g_mp.mean(),
                mm: g_mm.mean(),
            },
            symmetric: self.gs.mean(),
            antisymmetric: self.ga.mean(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{BoundaryPolicy, CountRule, GeneratorConfig, Model, SignVariant};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample(region: Region, config: &GeneratorConfig, n: usize, seed: u64) -> Sample {
        Sample::generate_seeded(n, region, config, seed).unwrap()
    }

    fn balanced_config(density: f64) -> GeneratorConfig {
        GeneratorConfig::new(
            Model::Independent { density, count: CountRule::Fixed },
            SignVariant::Balanced,
            BoundaryPolicy::Plain,
        )
    }

    #[test]
    fn test_bins_validation() {
        assert!(RadiusBins::new(vec![]).is_err());
        assert!(RadiusBins::new(vec![0.0]).is_err()); // max must be positive
        assert!(RadiusBins::new(vec![1.0, 1.0]).is_err());
        assert!(RadiusBins::new(vec![2.0, 1.0]).is_err());
        assert!(RadiusBins::new(vec![-1.0, 1.0]).is_err());
        assert!(RadiusBins::new(vec![0.0, 1.0, 2.0]).is_ok());
        let u = RadiusBins::uniform(10.0, 5).unwrap();
        assert_eq!(u.radii(), &[0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn test_suggested_bins_span_half_the_region() {
        let bins = RadiusBins::suggested(100.0, 1000.0).unwrap();
        assert!((bins.max_radius() - 500.0).abs() < 1e-9);
        assert_eq!(bins.len(), 125);
    }

    #[test]
    fn test_cumulative_counts_bin_boundaries() {
        let radii = [0.0, 1.0, 2.0, 3.0];
        // distances 0.5, 1.0 (on boundary, counts at r=1), 2.5
        let d2 = [0.25, 1.0, 6.25];
        let counts = cumulative_counts(&radii, &d2);
        assert_eq!(counts, vec![0.0, 2.0, 2.0, 3.0]);
    }

    #[test]
    fn test_edge_weight_unity_far_from_boundary() {
        let region = Region::square(10_000.0).unwrap();
        let w = edge_weight(&region, (5_000.0, 5_000.0), 50.0);
        assert!((w - 1.0).abs() < 1e-12);
        let circle = Region::circle(10_000.0).unwrap();
        let w = edge_weight(&circle, (100.0, -200.0), 50.0);
        assert!((w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_weight_doubles_on_square_edge() {
        // half the probe disk is outside
        let region = Region::square(1000.0).unwrap();
        let w = edge_weight(&region, (0.0, 500.0), 10.0);
        assert!((w - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_and_direct_scan_agree() {
        let region = Region::square(1000.0).unwrap();
        let config = balanced_config(5e-4); // 500 points, above the grid threshold
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let d = Distribution::generate(region, &config, &mut rng).unwrap();
        let analyzer = Analyzer::new(
            RadiusBins::uniform(80.0, 17).unwrap(),
            EdgeCorrection::OverlapWeighting,
        );
        let points: Vec<(f64, f64)> =
            d.dislocations().iter().map(|p| p.position()).collect();
        let grid = CellGrid::build(&points, region.bounding_box(), 80.0);
        let direct = analyzer.corrected_counts(&region, &points, &points, None);
        let pruned = analyzer.corrected_counts(&region, &points, &points, Some(&grid));
        for (a, b) in direct.iter().zip(&pruned) {
            assert!((a - b).abs() < 1e-9, "grid {} direct {}", b, a);
        }
    }

    #[test]
    fn test_decomposition_recombines_exactly() {
        let region = Region::circle(800.0).unwrap();
        let config = balanced_config(2e-4);
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let d = Distribution::generate(region, &config, &mut rng).unwrap();
        let analyzer =
            Analyzer::new(RadiusBins::uniform(200.0, 21).unwrap(), EdgeCorrection::None);
        let stats = analyzer.distribution_stats(&d);
        let (fp, fm) = (stats.plus_count as f64, stats.minus_count as f64);
        let m = &stats.neighbor_counts;
        let gs = stats.symmetric.as_ref().unwrap();
        let ga = stats.antisymmetric.as_ref().unwrap();
        for j in 0..21 {
            let like = 2.0 * (fp * m.pp.as_ref().unwrap()[j] + fm * m.mm.as_ref().unwrap()[j]);
            let opposite =
                2.0 * (fp * m.pm.as_ref().unwrap()[j] + fm * m.mp.as_ref().unwrap()[j]);
            assert!((gs[j] + ga[j] - like).abs() < 1e-9 * like.abs().max(1.0));
            assert!((gs[j] - ga[j] - opposite).abs() < 1e-9 * opposite.abs().max(1.0));
        }
    }

    #[test]
    fn test_single_sense_distribution_yields_no_data_markers() {
        // density low enough for a single dislocation: one sense is empty
        let region = Region::square(100.0).unwrap();
        let config = GeneratorConfig::new(
            Model::Independent { density: 1e-4, count: CountRule::Fixed },
            SignVariant::Random,
            BoundaryPolicy::Plain,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let d = Distribution::generate(region, &config, &mut rng).unwrap();
        assert_eq!(d.len(), 1);
        let analyzer =
            Analyzer::new(RadiusBins::uniform(50.0, 6).unwrap(), EdgeCorrection::None);
        let stats = analyzer.distribution_stats(&d);
        assert!(stats.neighbor_counts.pp.is_some() ^ stats.neighbor_counts.mm.is_some());
        assert!(stats.symmetric.is_none());
        assert!(stats.antisymmetric.is_none());
        let missing = if stats.neighbor_counts.pp.is_none() {
            SensePair::PlusPlus
        } else {
            SensePair::MinusMinus
        };
        assert!(matches!(
            stats.neighbor_counts.require(missing),
            Err(CoreError::UndefinedStatistic(_))
        ));
    }

    #[test]
    fn test_analyze_all_rejects_empty_input() {
        let analyzer =
            Analyzer::new(RadiusBins::uniform(10.0, 3).unwrap(), EdgeCorrection::None);
        assert!(matches!(analyzer.analyze_all(&[]), Err(CoreError::EmptySample)));
    }

    #[test]
    fn test_sample_average_matches_manual_mean() {
        let region = Region::square(1000.0).unwrap();
        let config = balanced_config(1e-4);
        let s = sample(region, &config, 3, 31);
        let analyzer =
            Analyzer::new(RadiusBins::uniform(100.0, 11).unwrap(), EdgeCorrection::None);
        let averaged = analyzer.analyze(&s).unwrap();
        let per: Vec<DistributionStats> = s
            .distributions()
            .iter()
            .map(|d| analyzer.distribution_stats(d))
            .collect();
        let manual: f64 = per
            .iter()
            .map(|p| p.neighbor_counts.pp.as_ref().unwrap()[5])
            .sum::<f64>()
            / 3.0;
        let got = averaged.neighbor_counts.pp.as_ref().unwrap()[5];
        assert!((got - manual).abs() < 1e-12);
    }
}
