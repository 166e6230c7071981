//! Per-cell state of the lattice.

use serde::{Deserialize, Serialize};

/// Milliseconds on the engine clock.
///
/// The epoch is whatever the [`Clock`](crate::clock::Clock) in use chose; only
/// differences between timestamps carry meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Birth time stored on dead cells.
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`, clamped at zero.
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn shifted_by(self, millis: u64) -> Self {
        Timestamp(self.0.saturating_add(millis))
    }
}

/// How long a cell lives once born.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifespan {
    Millis(u64),
    /// Never expires.
    Unbounded,
}

impl Lifespan {
    /// Whether a cell born at `birth` has outlived this lifespan at `now`.
    pub fn expired(self, birth: Timestamp, now: Timestamp) -> bool {
        match self {
            Lifespan::Millis(ms) => now.millis_since(birth) >= ms,
            Lifespan::Unbounded => false,
        }
    }

    /// Milliseconds left before expiry, `None` when unbounded.
    ///
    /// Negative when the cell is already past its lifespan.
    pub fn remaining(self, birth: Timestamp, now: Timestamp) -> Option<i64> {
        match self {
            Lifespan::Millis(ms) => Some(ms as i64 - now.millis_since(birth) as i64),
            Lifespan::Unbounded => None,
        }
    }
}

/// Heritable variant assigned when a cell is spawned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    #[default]
    None,
    /// Lives half the base lifespan.
    Fast,
    /// Never dies of age.
    Immortal,
    /// Lives twice the base lifespan.
    DoubleLife,
}

impl MutationKind {
    /// The mutated kinds, in the order a uniform draw partitions them.
    pub const MUTATED: [MutationKind; 3] = [
        MutationKind::Fast,
        MutationKind::Immortal,
        MutationKind::DoubleLife,
    ];

    /// Lifespan of a freshly spawned cell of this kind.
    ///
    /// # Arguments
    ///
    /// * `base_lifespan_ms` - The configured base lifespan
    pub fn spawn_lifespan(self, base_lifespan_ms: u64) -> Lifespan {
        match self {
            MutationKind::None => Lifespan::Millis(base_lifespan_ms),
            MutationKind::Fast => Lifespan::Millis(base_lifespan_ms / 2),
            MutationKind::Immortal => Lifespan::Unbounded,
            MutationKind::DoubleLife => Lifespan::Millis(base_lifespan_ms.saturating_mul(2)),
        }
    }

    /// Lifespan an alive cell of this kind takes when the base lifespan is
    /// reconfigured at runtime.
    ///
    /// Only double-life cells keep a multiplier; fast cells are rescaled to
    /// the plain base value.
    pub fn rescaled_lifespan(self, base_lifespan_ms: u64) -> Lifespan {
        match self {
            MutationKind::Immortal => Lifespan::Unbounded,
            MutationKind::DoubleLife => Lifespan::Millis(base_lifespan_ms.saturating_mul(2)),
            MutationKind::None | MutationKind::Fast => Lifespan::Millis(base_lifespan_ms),
        }
    }
}

/// One lattice site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub alive: bool,
    pub mutation: MutationKind,
    pub birth_time: Timestamp,
    pub lifespan: Lifespan,
}

impl Cell {
    /// An empty site carrying the current base lifespan as its reset value.
    pub fn dead(base_lifespan_ms: u64) -> Self {
        Cell {
            alive: false,
            mutation: MutationKind::None,
            birth_time: Timestamp::ZERO,
            lifespan: Lifespan::Millis(base_lifespan_ms),
        }
    }

    pub fn spawned(mutation: MutationKind, lifespan: Lifespan, now: Timestamp) -> Self {
        Cell {
            alive: true,
            mutation,
            birth_time: now,
            lifespan,
        }
    }

    /// Whether this cell dies of age at `now`. Dead and immortal cells never do.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.alive && self.mutation != MutationKind::Immortal && self.lifespan.expired(self.birth_time, now)
    }

    /// Remaining life in milliseconds; `None` for dead or unbounded cells.
    pub fn remaining_life(&self, now: Timestamp) -> Option<i64> {
        if !self.alive {
            return None;
        }
        self.lifespan.remaining(self.birth_time, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_lifespan_follows_mutation_kind() {
        assert_eq!(MutationKind::None.spawn_lifespan(1000), Lifespan::Millis(1000));
        assert_eq!(MutationKind::Fast.spawn_lifespan(1000), Lifespan::Millis(500));
        assert_eq!(MutationKind::DoubleLife.spawn_lifespan(1000), Lifespan::Millis(2000));
        assert_eq!(MutationKind::Immortal.spawn_lifespan(1000), Lifespan::Unbounded);
    }

    #[test]
    fn rescale_flattens_fast_cells() {
        assert_eq!(MutationKind::Fast.rescaled_lifespan(4000), Lifespan::Millis(4000));
        assert_eq!(MutationKind::DoubleLife.rescaled_lifespan(4000), Lifespan::Millis(8000));
        assert_eq!(MutationKind::Immortal.rescaled_lifespan(4000), Lifespan::Unbounded);
    }

    #[test]
    fn expiry_is_inclusive_and_skips_immortals() {
        let cell = Cell::spawned(MutationKind::None, Lifespan::Millis(1000), Timestamp(0));
        assert!(!cell.is_expired(Timestamp(999)));
        assert!(cell.is_expired(Timestamp(1000)));

        let immortal = Cell::spawned(MutationKind::Immortal, Lifespan::Unbounded, Timestamp(0));
        assert!(!immortal.is_expired(Timestamp(u64::MAX)));
        assert!(!Cell::dead(1000).is_expired(Timestamp(5000)));
    }

    #[test]
    fn remaining_life_counts_down() {
        let cell = Cell::spawned(MutationKind::None, Lifespan::Millis(1000), Timestamp(100));
        assert_eq!(cell.remaining_life(Timestamp(400)), Some(700));
        assert_eq!(cell.remaining_life(Timestamp(1300)), Some(-200));
        assert_eq!(Cell::dead(1000).remaining_life(Timestamp(0)), None);
    }
}
