//! Burgers vector sense assignment.

use super::SignVariant;
use crate::dislocation::{Dislocation, Sense};
use rand::seq::SliceRandom;
use rand::Rng;

/// Attach senses to placed positions according to the variant.
pub(super) fn assign(
    variant: SignVariant,
    positions: Vec<(f64, f64)>,
    rng: &mut impl Rng,
) -> Vec<Dislocation> {
    match variant {
        SignVariant::Random => positions
            .into_iter()
            .map(|(x, y)| {
                let sense = if rng.gen_bool(0.5) { Sense::Plus } else { Sense::Minus };
                Dislocation::new(x, y, sense)
            })
            .collect(),
        SignVariant::Balanced => {
            let n = positions.len();
            let mut senses = Vec::with_capacity(n);
            senses.resize(n / 2, Sense::Plus);
            senses.resize(n / 2 * 2, Sense::Minus);
            if n % 2 == 1 {
                senses.push(if rng.gen_bool(0.5) { Sense::Plus } else { Sense::Minus });
            }
            senses.shuffle(rng);
            positions
                .into_iter()
                .zip(senses)
                .map(|((x, y), sense)| Dislocation::new(x, y, sense))
                .collect()
        }
        SignVariant::Dipolar => positions
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                let sense = if i % 2 == 0 { Sense::Plus } else { Sense::Minus };
                Dislocation::new(x, y, sense)
            })
            .collect(),
    }
}
