//! Fitness-proportionate selection wheel.
//!
//! The wheel is a discretized roulette: a fixed array of `10 · n` slots, each
//! holding the index of a population member. Spinning draws a slot uniformly.
//!
//! # Construction
//!
//! 1. Shift all fitnesses by an offset: `|round(worst)|` when the worst
//!    fitness is negative, `1` otherwise.
//! 2. Give every member one guaranteed slot.
//! 3. Split the remaining `9 · n` slots in proportion to each member's
//!    shifted fitness, rounding each share to the nearest whole slot. When
//!    the rounded shares overflow, the weakest members give slots back.
//! 4. Fill any slots left over by rounding with the best member.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, Ch. 1 (roulette wheel selection)

use super::types::round_fitness;
use rand::Rng;

/// Slots per member.
pub const SLOTS_PER_MEMBER: usize = 10;

/// A built selection wheel over a snapshot of member fitnesses.
///
/// The wheel does not observe its population: when fitnesses change, a new
/// wheel must be built.
#[derive(Debug, Clone)]
pub struct RouletteWheel {
    slots: Vec<usize>,
    fitnesses: Vec<f64>,
    offset: i64,
}

impl RouletteWheel {
    /// Builds a wheel for members with the given fitnesses (index order).
    ///
    /// # Complexity
    /// O(n) time, O(n) space
    pub fn build(fitnesses: &[f64]) -> Self {
        let n = fitnesses.len();
        if n == 0 {
            return Self {
                slots: Vec::new(),
                fitnesses: Vec::new(),
                offset: 1,
            };
        }

        let size = n * SLOTS_PER_MEMBER;
        let offset = wheel_offset(fitnesses);
        let mut slots = Vec::with_capacity(size);

        // Every member gets one slot.
        slots.extend(0..n);

        let total: f64 = fitnesses.iter().map(|&f| f + offset as f64).sum();
        let free = (size - n) as f64;

        if total > 0.0 && total.is_finite() {
            let mut counts: Vec<usize> = fitnesses
                .iter()
                .map(|&f| {
                    let share = (f + offset as f64) / total;
                    round_fitness(share * free).max(0) as usize
                })
                .collect();
            trim_overflow(&mut counts, fitnesses, size - n);
            for (i, &count) in counts.iter().enumerate() {
                slots.extend(std::iter::repeat(i).take(count));
            }
        }

        // Rounding leftovers go to the best member.
        let best = best_index(fitnesses);
        slots.resize(size, best);

        Self {
            slots,
            fitnesses: fitnesses.to_vec(),
            offset,
        }
    }

    /// Draws a member index. Returns `None` for an empty wheel.
    pub fn spin<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        Some(self.slots[rng.random_range(0..self.slots.len())])
    }

    /// Number of slots held by each member, in index order.
    pub fn slot_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.fitnesses.len()];
        for &i in &self.slots {
            counts[i] += 1;
        }
        counts
    }

    /// Total number of slots (`10 · n`).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Offset added to every fitness during construction.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Fitnesses the wheel was built from.
    pub fn fitnesses(&self) -> &[f64] {
        &self.fitnesses
    }

    /// Index of the fittest member in the snapshot (first on ties).
    pub fn best(&self) -> Option<usize> {
        if self.fitnesses.is_empty() {
            None
        } else {
            Some(best_index(&self.fitnesses))
        }
    }
}

/// Shift that makes every weight non-negative.
fn wheel_offset(fitnesses: &[f64]) -> i64 {
    let worst = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
    let worst = round_fitness(worst);
    if worst < 0 {
        -worst
    } else {
        1
    }
}

/// Takes rounding overflow back from the weakest members, one slot each in
/// ascending fitness order, so counts stay non-decreasing in fitness.
fn trim_overflow(counts: &mut [usize], fitnesses: &[f64], free: usize) {
    let mut excess = counts.iter().sum::<usize>().saturating_sub(free);
    if excess == 0 {
        return;
    }
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| fitnesses[a].total_cmp(&fitnesses[b]));
    while excess > 0 {
        let before = excess;
        for &i in &order {
            if excess == 0 {
                break;
            }
            if counts[i] > 0 {
                counts[i] -= 1;
                excess -= 1;
            }
        }
        if excess == before {
            break;
        }
    }
}

/// First index of the maximum fitness.
fn best_index(fitnesses: &[f64]) -> usize {
    let mut best = 0;
    for (i, &f) in fitnesses.iter().enumerate().skip(1) {
        if f > fitnesses[best] {
            best = i;
        }
    }
    best
}
