//! Signed point representing a single crystal lattice defect.

use serde::{Deserialize, Serialize};

/// Burgers vector sense of a dislocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    Plus,
    Minus,
}

impl Sense {
    /// Numeric value of the sense: +1 or -1.
    pub fn value(self) -> f64 {
        match self {
            Sense::Plus => 1.0,
            Sense::Minus => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Sense::Plus => Sense::Minus,
            Sense::Minus => Sense::Plus,
        }
    }
}

/// A dislocation: a 2D position in nanometers and a Burgers vector sense.
///
/// A dislocation has no identity beyond its position and sense; it is owned
/// by the distribution that generated it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dislocation {
    pub x: f64,
    pub y: f64,
    pub sense: Sense,
}

impl Dislocation {
    pub fn new(x: f64, y: f64, sense: Sense) -> Self {
        Self { x, y, sense }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sense_value_and_opposite() {
        assert_eq!(Sense::Plus.value(), 1.0);
        assert_eq!(Sense::Minus.value(), -1.0);
        assert_eq!(Sense::Plus.opposite(), Sense::Minus);
        assert_eq!(Sense::Minus.opposite(), Sense::Plus);
    }
}
