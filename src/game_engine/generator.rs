use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::game_engine::{
    models::{DifficultyTier, Operator, Problem},
    operators::{self, TierCaps},
};

/// Parameters for a standalone problem draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemRequest {
    pub tier: DifficultyTier,
    /// `Some` reproduces the same problem every time; `None` uses entropy.
    pub rng_seed: Option<u64>,
}

impl ProblemRequest {
    pub fn new(tier: DifficultyTier) -> Self {
        ProblemRequest { tier, rng_seed: None }
    }
}

/// Draw one problem for `tier` from the supplied random source.
///
/// The operator is uniform over `+ - × ÷`; operand ranges come from the
/// tier's caps.
pub fn generate<R: Rng>(rng: &mut R, tier: DifficultyTier) -> Problem {
    let caps = TierCaps::for_tier(tier);
    let operator = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];

    match operator {
        Operator::Add      => operators::addition(rng, caps),
        Operator::Subtract => operators::subtraction(rng, caps),
        Operator::Multiply => operators::multiplication(rng, caps),
        Operator::Divide   => operators::division(rng, caps),
    }
}

/// Convenience entry point that owns its RNG.
pub fn generate_problem(request: ProblemRequest) -> Problem {
    let mut rng: StdRng = match request.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };
    generate(&mut rng, request.tier)
}
