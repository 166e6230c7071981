//! Mutation assignment for newly spawned cells.

use crate::cell::{Lifespan, MutationKind};
use crate::rng::RandomSource;

/// Outcome of a spawn event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationDecision {
    pub kind: MutationKind,
    pub lifespan: Lifespan,
}

/// Decides the mutation of a newly spawned cell and the lifespan it gets.
///
/// Consumes one draw when the cell stays unmutated and two when it mutates.
/// Call exactly once per successful spawn, never per failed attempt.
///
/// # Arguments
///
/// * `base_lifespan_ms` - The configured base lifespan
/// * `mutation_probability` - Chance in `[0, 1)` that a spawn mutates
/// * `rng` - Source of the draws
pub fn decide<R: RandomSource + ?Sized>(
    base_lifespan_ms: u64,
    mutation_probability: f64,
    rng: &mut R,
) -> MutationDecision {
    let kind = if rng.uniform01() >= mutation_probability {
        MutationKind::None
    } else {
        let slot = ((rng.uniform01() * 3.0) as usize).min(2);
        MutationKind::MUTATED[slot]
    };
    MutationDecision {
        kind,
        lifespan: kind.spawn_lifespan(base_lifespan_ms),
    }
}
