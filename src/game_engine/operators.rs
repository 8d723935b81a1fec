//! Operand rules for each operator, plus the per-tier magnitude caps.
//!
//! Every rule draws from inclusive ranges only, so the bounds in the table
//! below are reachable values:
//!
//! | Tier   | add/sub | mult | div |
//! |--------|---------|------|-----|
//! | Easy   | 10      | 10   | 10  |
//! | Medium | 50      | 20   | 50  |
//! | Hard   | 100     | 30   | 100 |

use rand::Rng;
use crate::game_engine::models::{DifficultyTier, Operator, Problem};

/// Upper bounds used when drawing operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCaps {
    pub add_sub: i64,
    pub mult: i64,
    pub div: i64,
}

impl TierCaps {
    pub fn for_tier(tier: DifficultyTier) -> Self {
        match tier {
            DifficultyTier::Easy   => TierCaps { add_sub: 10,  mult: 10, div: 10 },
            DifficultyTier::Medium => TierCaps { add_sub: 50,  mult: 20, div: 50 },
            DifficultyTier::Hard   => TierCaps { add_sub: 100, mult: 30, div: 100 },
        }
    }

    /// Largest divisor/quotient for division problems. Easy yields 2.
    pub fn div_factor_cap(self) -> i64 {
        self.div / 5
    }
}

/// Both operands in `[1, cap]`.
pub fn addition<R: Rng>(rng: &mut R, caps: TierCaps) -> Problem {
    let a = rng.gen_range(1..=caps.add_sub);
    let b = rng.gen_range(1..=caps.add_sub);
    Problem::new(Operator::Add, a, b, a + b)
}

/// First operand in `[5, cap]`, second in `[1, first - 1]`: always positive.
pub fn subtraction<R: Rng>(rng: &mut R, caps: TierCaps) -> Problem {
    let a = rng.gen_range(5..=caps.add_sub);
    let b = rng.gen_range(1..=a - 1);
    Problem::new(Operator::Subtract, a, b, a - b)
}

/// Both operands in `[2, mult cap]`.
pub fn multiplication<R: Rng>(rng: &mut R, caps: TierCaps) -> Problem {
    let a = rng.gen_range(2..=caps.mult);
    let b = rng.gen_range(2..=caps.mult);
    Problem::new(Operator::Multiply, a, b, a * b)
}

/// Divisor and quotient in `[2, div cap / 5]`; shows `divisor × quotient ÷ divisor`.
pub fn division<R: Rng>(rng: &mut R, caps: TierCaps) -> Problem {
    let top = caps.div_factor_cap();
    let divisor = rng.gen_range(2..=top);
    let quotient = rng.gen_range(2..=top);
    Problem::new(Operator::Divide, divisor * quotient, divisor, quotient)
}
