//! Death by old age and reseeding of an empty lattice.

use rayon::prelude::*;

use crate::cell::{Cell, Lifespan, MutationKind, Timestamp};
use crate::grid::Grid;
use crate::rng::RandomSource;

/// Applies the death rule.
///
/// Only cells alive in `snapshot` are judged, so anything spawned into `next`
/// during the same tick is left alone. Expired cells are reset in `next` to a
/// dead cell carrying the current base lifespan. Immortal cells never expire.
///
/// Returns the number of cells that died.
pub fn apply_deaths(snapshot: &Grid, next: &mut Grid, base_lifespan_ms: u64, now: Timestamp) -> usize {
    debug_assert_eq!(snapshot.size(), next.size());
    next.cells_mut()
        .par_iter_mut()
        .zip(snapshot.cells().par_iter())
        .map(|(after, before)| {
            if before.is_expired(now) {
                *after = Cell::dead(base_lifespan_ms);
                1
            } else {
                0
            }
        })
        .sum()
}

/// Places a single unmutated cell at a uniformly random coordinate when the
/// grid holds no living cell.
///
/// Returns the seeded coordinate, or `None` if the grid was already populated.
pub fn seed_if_empty<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    base_lifespan_ms: u64,
    now: Timestamp,
    rng: &mut R,
) -> Option<(usize, usize)> {
    if grid.population() > 0 {
        return None;
    }
    let row = rng.index(grid.size());
    let col = rng.index(grid.size());
    grid.set(
        row,
        col,
        Cell::spawned(MutationKind::None, Lifespan::Millis(base_lifespan_ms), now),
    );
    Some((row, col))
}
