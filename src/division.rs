//! Spreading of living cells into their empty orthogonal neighbours.

use crate::cell::{Cell, Timestamp};
use crate::grid::Grid;
use crate::mutation;
use crate::rng::RandomSource;

/// Chance that a living cell divides into one given empty neighbour per tick.
pub const BASE_DIVISION_PROBABILITY: f64 = 0.05;

/// Runs one division pass.
///
/// Every cell alive in `snapshot` tries each of its in-bounds neighbours
/// independently. A neighbour already alive in `next` is skipped, which makes
/// cells spawned earlier in the pass visible to later parents. Each success
/// consults the mutation policy once and writes a cell born at `now`.
///
/// Returns the number of cells spawned.
pub fn divide<R: RandomSource + ?Sized>(
    snapshot: &Grid,
    next: &mut Grid,
    base_lifespan_ms: u64,
    mutation_probability: f64,
    now: Timestamp,
    rng: &mut R,
) -> usize {
    debug_assert_eq!(snapshot.size(), next.size());
    let mut births = 0;

    for (row, col) in snapshot.alive_coords() {
        for (x, y) in snapshot.neighbors4(row, col) {
            if next.is_alive(x, y) {
                continue;
            }
            if rng.uniform01() < BASE_DIVISION_PROBABILITY {
                let decision = mutation::decide(base_lifespan_ms, mutation_probability, rng);
                next.set(x, y, Cell::spawned(decision.kind, decision.lifespan, now));
                births += 1;
            }
        }
    }

    births
}
