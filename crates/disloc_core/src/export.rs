//! Standardized input records for the X-ray diffraction simulation program.
//!
//! One record per distribution: a fixed-order header (crystallographic
//! directions, contrast coefficient, cell parameter, region size, sampling
//! step, Poisson's ratio, dislocation count) followed by one line per
//! dislocation with its sense and coordinates. The consumer depends on
//! exact column semantics, so numbers are written in C-style scientific
//! notation with fixed widths.

use crate::distribution::{Distribution, Sample};
use crate::error::{CoreError, Result};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Character of the dislocations of a file, fixing the default direction
/// vectors and the contrast factor formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DislocationCharacter {
    Screw,
    Edge,
}

impl DislocationCharacter {
    /// Default line vector direction l [uvw].
    pub fn default_line(&self) -> [i32; 3] {
        match self {
            DislocationCharacter::Screw => [1, 1, 0],
            DislocationCharacter::Edge => [1, -1, -2],
        }
    }

    /// Default direction of the Fourier variable L [uvw].
    pub fn default_travel(&self) -> [i32; 3] {
        match self {
            DislocationCharacter::Screw => [-1, 1, 0],
            DislocationCharacter::Edge => [1, 1, 0],
        }
    }
}

/// Parameters of the exported record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub character: DislocationCharacter,
    /// Diffraction vector direction g (hkl).
    pub diffraction_vector: [i32; 3],
    /// Burgers vector direction b [uvw].
    pub burgers_direction: [i32; 3],
    /// Line vector direction l [uvw]; defaults per character.
    pub line_direction: Option<[i32; 3]>,
    /// Direction of the Fourier variable L [uvw]; defaults per character.
    pub travel_direction: Option<[i32; 3]>,
    /// Cell parameter a [nm].
    pub cell_parameter: f64,
    /// Step size a3 of L [nm]; defaults to max(2, i/12) with i the mean
    /// inter-dislocation distance.
    pub step: Option<f64>,
    /// Poisson's ratio.
    pub poisson_ratio: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            character: DislocationCharacter::Screw,
            diffraction_vector: [2, 0, 0],
            burgers_direction: [1, 1, 0],
            line_direction: None,
            travel_direction: None,
            cell_parameter: 0.40494,
            step: None,
            poisson_ratio: 0.345,
        }
    }
}

/// Contrast factor of a dislocation in an elastically isotropic crystal.
pub fn contrast_factor(
    character: DislocationCharacter,
    g: [i32; 3],
    l: [i32; 3],
    b: [i32; 3],
    nu: f64,
) -> f64 {
    let (g, l, b) = (to_f64(g), to_f64(l), to_f64(b));
    let psi = angle(g, l);
    match character {
        DislocationCharacter::Screw => (psi.sin() * psi.cos()).powi(2),
        DislocationCharacter::Edge => {
            let pg = reject(g, l);
            let pb = reject(b, l);
            let gamma = angle(pg, pb);
            psi.sin().powi(4) / (8.0 * (1.0 - nu).powi(2))
                * (1.0 - 4.0 * nu + 8.0 * nu * nu
                    + 4.0 * (1.0 - 2.0 * nu) * gamma.cos().powi(2))
        }
    }
}

/// Write the record of one distribution.
///
/// The inter-dislocation distance is passed explicitly because a sample
/// export uses the sample-averaged value rather than the distribution's
/// own.
pub fn write_distribution<W: Write>(
    out: &mut W,
    distribution: &Distribution,
    inter_distance: f64,
    config: &ExportConfig,
) -> Result<()> {
    let character = config.character;
    let l = config.line_direction.unwrap_or_else(|| character.default_line());
    let travel = config.travel_direction.unwrap_or_else(|| character.default_travel());
    let b = config.burgers_direction;
    let g = config.diffraction_vector;
    match character {
        DislocationCharacter::Screw => {
            if cross(l, b) != [0, 0, 0] {
                return Err(CoreError::InvalidParameter(
                    "screw character requires l parallel to b".into(),
                ));
            }
        }
        DislocationCharacter::Edge => {
            if dot(to_f64(l), to_f64(b)) != 0.0 {
                return Err(CoreError::InvalidParameter(
                    "edge character requires l perpendicular to b".into(),
                ));
            }
        }
    }
    let c = contrast_factor(character, g, l, b, config.poisson_ratio);
    let a3 = config.step.unwrap_or_else(|| (inter_distance / 12.0).max(2.0));
    let size_label = match distribution.region() {
        Region::Circle { .. } => "Cylinder radius",
        Region::Square { .. } => "Square side",
    };
    let count = distribution.len() + distribution.companions().len();

    writeln!(out, "{:>8} # disloc_core version", crate::VERSION)?;
    writeln!(
        out,
        "{} # dislocation density [m^-2]",
        sci(distribution.density() * 1e18, 2, 8)
    )?;
    writeln!(out, "{} # z: direction of 'l' (line vector) [uvw]", indices(l))?;
    writeln!(out, "{} # x: direction of 'L' (Fourier variable) [uvw]", indices(travel))?;
    writeln!(out, "{} # b: Burgers vector direction [uvw]", indices(b))?;
    writeln!(out, "{} # g: diffraction vector direction (hkl)", indices(g))?;
    writeln!(out, "{:8.6} # C: contrast coefficient [1]", c)?;
    writeln!(out, "{:8.6} # a: cell parameter [nm]", config.cell_parameter)?;
    writeln!(out, "{:8.0} # s: {} [nm]", distribution.region().size(), size_label)?;
    writeln!(out, "{:8.1} # a3: step size of 'L' along x [nm]", a3)?;
    writeln!(out, "{:8.3} # nu: Poisson's number [1]", config.poisson_ratio)?;
    writeln!(out, "{:8} # number of dislocations in this file", count)?;
    writeln!(
        out,
        "# Burgers vector senses and dislocation (x,y) coordinates [1], [nm], [nm]"
    )?;
    for d in distribution.all_points() {
        writeln!(
            out,
            "{:2} {} {}",
            d.sense.value() as i64,
            sci(d.x, 15, 22),
            sci(d.y, 15, 22)
        )?;
    }
    Ok(())
}

/// Export one distribution to a file.
pub fn export_distribution(
    path: &Path,
    distribution: &Distribution,
    config: &ExportConfig,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_distribution(&mut out, distribution, distribution.inter_distance(), config)?;
    out.flush()?;
    Ok(())
}

/// Export every distribution of a sample into `dir`, one zero-padded
/// numbered file per distribution, using the sample-averaged
/// inter-dislocation distance.
pub fn export_sample(dir: &Path, sample: &Sample, config: &ExportConfig) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let width = sample.len().to_string().len();
    let inter = sample.mean_inter_distance();
    for (i, distribution) in sample.distributions().iter().enumerate() {
        let path = dir.join(format!("{:0width$}.dat", i + 1, width = width));
        let mut out = BufWriter::new(File::create(&path)?);
        write_distribution(&mut out, distribution, inter, config)?;
        out.flush()?;
    }
    Ok(())
}

/// C-style `%{width}.{decimals}E` formatting: `d.dddE+XX` with a signed
/// two-digit exponent, right-justified. Rust's `{:E}` writes bare
/// single-digit exponents, which the record consumer does not accept.
fn sci(value: f64, decimals: usize, width: usize) -> String {
    let neg = value < 0.0;
    let v = value.abs();
    let (mut digits, mut exponent) = if v == 0.0 {
        (format!("{:.*}", decimals, 0.0), 0i32)
    } else {
        let e = v.log10().floor() as i32;
        (format!("{:.*}", decimals, v / 10f64.powi(e)), e)
    };
    // rounding can carry the mantissa to 10.x
    if digits.starts_with("10") {
        exponent += 1;
        digits = format!("{:.*}", decimals, v / 10f64.powi(exponent));
    }
    let body = format!(
        "{}{}E{}{:02}",
        if neg { "-" } else { "" },
        digits,
        if exponent < 0 { "-" } else { "+" },
        exponent.abs()
    );
    format!("{:>width$}", body, width = width)
}

fn indices(v: [i32; 3]) -> String {
    format!("{:2} {:2} {:2}", v[0], v[1], v[2])
}

fn to_f64(v: [i32; 3]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn angle(a: [f64; 3], b: [f64; 3]) -> f64 {
    (dot(a, b) / (norm(a) * norm(b))).clamp(-1.0, 1.0).acos()
}

fn cross(a: [i32; 3], b: [i32; 3]) -> [i32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Component of `a` perpendicular to `l`.
fn reject(a: [f64; 3], l: [f64; 3]) -> [f64; 3] {
    let f = dot(a, l) / dot(l, l);
    [a[0] - f * l[0], a[1] - f * l[1], a[2] - f * l[2]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{BoundaryPolicy, CountRule, GeneratorConfig, Model, SignVariant};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_distribution(seed: u64) -> Distribution {
        let region = Region::circle(1000.0).unwrap();
        let config = GeneratorConfig::new(
            Model::Independent { density: 5e-6, count: CountRule::Fixed },
            SignVariant::Balanced,
            BoundaryPolicy::Plain,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Distribution::generate(region, &config, &mut rng).unwrap()
    }

    #[test]
    fn test_sci_formatting() {
        assert_eq!(sci(157.0, 15, 22), " 1.570000000000000E+02");
        assert_eq!(sci(0.0, 15, 22), " 0.000000000000000E+00");
        assert_eq!(sci(-2.5e-7, 15, 22), "-2.500000000000000E-07");
        assert_eq!(sci(5e13, 2, 8), "5.00E+13");
        assert_eq!(sci(9.999e-6, 2, 8), "1.00E-05"); // mantissa overflow carries
    }

    #[test]
    fn test_contrast_factor_screw_reference_value() {
        let c = contrast_factor(
            DislocationCharacter::Screw,
            [2, 0, 0],
            [1, 1, 0],
            [1, 1, 0],
            0.345,
        );
        assert!((c - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_contrast_factor_edge_in_unit_range() {
        let c = contrast_factor(
            DislocationCharacter::Edge,
            [2, 0, 0],
            [1, -1, -2],
            [1, 1, 0],
            0.345,
        );
        assert!(c > 0.0 && c < 1.0, "C = {}", c);
    }

    #[test]
    fn test_record_layout() {
        let d = small_distribution(41);
        let mut buf: Vec<u8> = Vec::new();
        write_distribution(&mut buf, &d, d.inter_distance(), &ExportConfig::default())
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13 + d.len());
        assert!(lines[0].ends_with("# disloc_core version"));
        assert!(lines[1].ends_with("# dislocation density [m^-2]"));
        assert!(lines[8].contains("# s: Cylinder radius [nm]"));
        let count: usize = lines[11].split('#').next().unwrap().trim().parse().unwrap();
        assert_eq!(count, d.len());
        // fixed columns: sense(2) space sci(22) space sci(22)
        for line in &lines[13..] {
            assert_eq!(line.len(), 48, "bad point line: {:?}", line);
            let sense: i64 = line[..2].trim().parse().unwrap();
            assert!(sense == 1 || sense == -1);
            assert!(line[3..25].contains('E'));
            assert!(line[26..48].contains('E'));
        }
    }

    #[test]
    fn test_screw_rejects_non_parallel_directions() {
        let d = small_distribution(42);
        let config = ExportConfig {
            burgers_direction: [1, 0, 0],
            ..ExportConfig::default()
        };
        let mut buf: Vec<u8> = Vec::new();
        let err = write_distribution(&mut buf, &d, d.inter_distance(), &config);
        assert!(matches!(err, Err(CoreError::InvalidParameter(_))));
    }

    #[test]
    fn test_export_sample_writes_numbered_files() {
        let region = Region::square(500.0).unwrap();
        let config = GeneratorConfig::new(
            Model::Independent { density: 5e-5, count: CountRule::Fixed },
            SignVariant::Random,
            BoundaryPolicy::Plain,
        );
        let sample = Sample::generate_seeded(12, region, &config, 7).unwrap();
        let dir = tempfile::tempdir().unwrap();
        export_sample(dir.path(), &sample, &ExportConfig::default()).unwrap();
        for i in 1..=12 {
            assert!(dir.path().join(format!("{:02}.dat", i)).exists());
        }
    }
}
