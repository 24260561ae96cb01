//! Populations of individuals with wheel-based selection.

use super::selection::RouletteWheel;
use super::types::Individual;
use rand::Rng;
use std::fmt::{self, Write};

/// An unordered collection of individuals plus a lazily built
/// [`RouletteWheel`] for fitness-proportionate draws.
///
/// The wheel is built on the first draw. It is **not** rebuilt when member
/// fitnesses change: call [`recalculate_probabilities`](Self::recalculate_probabilities)
/// after feeding new scores to the members. Adding a member discards the
/// wheel so the next draw includes it.
#[derive(Debug, Clone)]
pub struct Population<T> {
    members: Vec<T>,
    wheel: Option<RouletteWheel>,
}

impl<T> Default for Population<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Population<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            wheel: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            wheel: None,
        }
    }

    pub fn add(&mut self, individual: T) {
        self.members.push(individual);
        self.wheel = None;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.members.get(index)
    }

    /// Mutable access to a member. The wheel keeps its old probabilities.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.members.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.members
    }

    /// Moves every member of `other` into this population.
    ///
    /// `other` may hold a narrower type that converts into `T`.
    pub fn absorb<U: Into<T>>(&mut self, other: Population<U>) {
        self.members.extend(other.members.into_iter().map(Into::into));
        self.wheel = None;
    }

    /// Absorbs several populations at once.
    pub fn merge_from<U, I>(&mut self, others: I)
    where
        U: Into<T>,
        I: IntoIterator<Item = Population<U>>,
    {
        for other in others {
            self.absorb(other);
        }
    }
}

impl<T: Individual> Population<T> {
    /// Fittest member (first on ties).
    pub fn best(&self) -> Option<&T> {
        self.best_index().map(|i| &self.members[i])
    }

    /// Least fit member (first on ties).
    pub fn worst(&self) -> Option<&T> {
        let fitnesses = self.fitnesses();
        let mut worst = 0;
        for (i, &f) in fitnesses.iter().enumerate().skip(1) {
            if f < fitnesses[worst] {
                worst = i;
            }
        }
        self.members.get(worst)
    }

    /// Index of the fittest member (first on ties).
    pub fn best_index(&self) -> Option<usize> {
        let fitnesses = self.fitnesses();
        if fitnesses.is_empty() {
            return None;
        }
        let mut best = 0;
        for (i, &f) in fitnesses.iter().enumerate().skip(1) {
            if f > fitnesses[best] {
                best = i;
            }
        }
        Some(best)
    }

    /// Sum of member fitnesses.
    pub fn population_fitness(&self) -> f64 {
        self.members.iter().map(Individual::fitness).sum()
    }

    /// Draws a member index by fitness-proportionate selection, building the
    /// wheel first if needed. `None` for an empty population.
    pub fn select<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        if self.wheel.is_none() {
            self.recalculate_probabilities();
        }
        self.wheel.as_ref().and_then(|w| w.spin(rng))
    }

    /// Draws a member by fitness-proportionate selection.
    pub fn random_individual<R: Rng>(&mut self, rng: &mut R) -> Option<&T> {
        let index = self.select(rng)?;
        self.members.get(index)
    }

    /// Rebuilds the wheel from the members' current fitnesses.
    ///
    /// Each member's fitness is read exactly once.
    ///
    /// # Complexity
    /// O(n)
    pub fn recalculate_probabilities(&mut self) {
        self.wheel = Some(RouletteWheel::build(&self.fitnesses()));
    }

    /// The current wheel, if one has been built.
    pub fn wheel(&self) -> Option<&RouletteWheel> {
        self.wheel.as_ref()
    }

    /// Slot counts of the current wheel, one per member.
    pub fn slot_counts(&self) -> Option<Vec<usize>> {
        self.wheel.as_ref().map(RouletteWheel::slot_counts)
    }

    fn fitnesses(&self) -> Vec<f64> {
        self.members.iter().map(Individual::fitness).collect()
    }
}

impl<T: fmt::Display> Population<T> {
    /// Renders the wheel as one line per member for debug output.
    ///
    /// Uses the fitness snapshot taken when the wheel was built, so it does
    /// not read member fitnesses again.
    pub fn distribution(&self) -> String {
        let Some(wheel) = &self.wheel else {
            return "WHEEL DIST: (not built)".to_string();
        };
        let mut out = format!("WHEEL DIST: offset={}", wheel.offset());
        for ((member, fitness), slots) in self
            .members
            .iter()
            .zip(wheel.fitnesses())
            .zip(wheel.slot_counts())
        {
            let _ = write!(out, "\n\t({member}) {fitness}: {}", "X".repeat(slots));
        }
        out
    }
}

impl<T> FromIterator<T> for Population<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
            wheel: None,
        }
    }
}

impl<T> IntoIterator for Population<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Population<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl<T> std::ops::Index<usize> for Population<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.members[index]
    }
}

// ============================================================================
// Tests
// ============================================================================
