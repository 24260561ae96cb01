//! Core trait shared by everything a [`Population`](super::Population) holds.

/// A fitness-comparable member of a population.
///
/// Higher fitness is better. Both candidate alignments and the operators
/// that transform them are individuals: operators compete for selection the
/// same way alignments do.
///
/// `fitness` takes `&self` but is allowed to update internal bookkeeping
/// (alignments fill a cache, operators fold their pending score), so callers
/// should read it once per decision rather than repeatedly.
pub trait Individual {
    /// Current fitness of this individual.
    fn fitness(&self) -> f64;
}

/// Rounds half up, the way fitness values are rounded for wheel offsets and
/// stagnation checks.
pub(crate) fn round_fitness(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
