//! Alignment crossover and mutation operators.
//!
//! Every operator rearranges gaps only: a child always carries exactly its
//! parent's residues, in the same order, in every row.
//!
//! # Crossover Operators
//!
//! - [`Crossover::Noop`]: returns both parents unchanged
//! - [`Crossover::OnePoint`]: content-aware one-point cut, with seam filler
//!   placed at the beginning, middle, or end ([`GapPlacement`])
//!
//! # Mutation Operators
//!
//! - [`Mutation::Noop`]: returns the parent unchanged
//! - [`Mutation::BlockShuffle`]: swaps a gap run with a neighbouring residue run in one row
//! - [`Mutation::GapInsertion`]: inserts one gap in every row
//! - [`Mutation::GapDeletion`]: deletes one gap from every row (all or nothing)
//! - [`Mutation::GapColumnDeletion`]: removes every all-gap column
//!
//! An operator that finds nothing to edit returns its parent unchanged
//! instead of failing.
//!
//! # Adaptive operators
//!
//! [`Operator`] wraps an [`OperatorKind`] with a self-tuning fitness so the
//! operators themselves can be drawn from a [`Population`](super::Population).

use crate::alignment::{is_gap, Alignment, Sequence, GAP};
use crate::error::{AlignError, Result};
use rand::Rng;
use std::cell::Cell;
use std::fmt;

// ============================================================================
// Crossover operators
// ============================================================================

/// Where a one-point crossover puts the gap filler that keeps the child's
/// rows equal in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GapPlacement {
    /// Before the prefix.
    Beginning,
    /// At the seam between prefix and suffix.
    Middle,
    /// After the suffix.
    End,
}

/// Two parents in, two children out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crossover {
    Noop,
    OnePoint(GapPlacement),
}

impl Crossover {
    /// Every built-in crossover, in pool order.
    pub const ALL: [Crossover; 4] = [
        Crossover::Noop,
        Crossover::OnePoint(GapPlacement::Beginning),
        Crossover::OnePoint(GapPlacement::Middle),
        Crossover::OnePoint(GapPlacement::End),
    ];

    pub fn perform<R: Rng>(
        &self,
        mother: &Alignment,
        father: &Alignment,
        rng: &mut R,
    ) -> [Alignment; 2] {
        match self {
            Crossover::Noop => [mother.duplicate(), father.duplicate()],
            Crossover::OnePoint(placement) => one_point_crossover(mother, father, *placement, rng),
        }
    }
}

/// Content-aware one-point crossover.
///
/// # Algorithm
///
/// 1. Pick a cut column `c` in the mother uniformly from `0..width`.
///    `c == 0` leaves nothing to exchange: both parents are returned.
/// 2. For row `s`, count the residues `k` the mother holds before `c`, and
///    find the father's column `c2[s]` reached after the same `k` residues.
/// 3. Child 1 row `s` = mother prefix `..c` + father suffix `c2[s]..`, padded
///    with `c2[s] - min(c2)` gaps. Child 2 row `s` = father prefix `..c2[s]` +
///    mother suffix `c..`, padded with `max(c2) - c2[s]` gaps.
///
/// The padding makes every row of a child the same length.
///
/// # Complexity
/// O(n · L) for n rows of length L
fn one_point_crossover<R: Rng>(
    mother: &Alignment,
    father: &Alignment,
    placement: GapPlacement,
    rng: &mut R,
) -> [Alignment; 2] {
    let width = mother.width();
    let rows = mother.num_sequences();
    if width == 0 || rows != father.num_sequences() {
        return [mother.duplicate(), father.duplicate()];
    }

    let cut = rng.random_range(0..width);
    if cut == 0 {
        return [mother.duplicate(), father.duplicate()];
    }

    let father_cuts: Vec<usize> = mother
        .sequences()
        .iter()
        .zip(father.sequences())
        .map(|(m, f)| f.index_reaching_count(m.non_gap_count(cut)))
        .collect();
    let min_cut = father_cuts.iter().copied().min().unwrap_or(0);
    let max_cut = father_cuts.iter().copied().max().unwrap_or(0);

    let mut first = Alignment::new(mother.scorer().clone());
    let mut second = Alignment::new(mother.scorer().clone());

    for ((m, f), &c2) in mother.sequences().iter().zip(father.sequences()).zip(&father_cuts) {
        let c = cut.min(m.len());
        first.add_sequence(splice(
            m.subsequence(0, c),
            f.subsequence(c2, f.len()),
            c2 - min_cut,
            placement,
        ));
        second.add_sequence(splice(
            f.subsequence(0, c2),
            m.subsequence(c, m.len()),
            max_cut - c2,
            placement,
        ));
    }

    [first, second]
}

/// Joins `prefix` and `suffix` with `padding` gaps at the given placement.
fn splice(prefix: &[u8], suffix: &[u8], padding: usize, placement: GapPlacement) -> Sequence {
    let gaps = std::iter::repeat(GAP).take(padding);
    let mut row = Vec::with_capacity(prefix.len() + suffix.len() + padding);
    match placement {
        GapPlacement::Beginning => {
            row.extend(gaps);
            row.extend_from_slice(prefix);
            row.extend_from_slice(suffix);
        }
        GapPlacement::Middle => {
            row.extend_from_slice(prefix);
            row.extend(gaps);
            row.extend_from_slice(suffix);
        }
        GapPlacement::End => {
            row.extend_from_slice(prefix);
            row.extend_from_slice(suffix);
            row.extend(gaps);
        }
    }
    Sequence::from_gapped(row)
}

// ============================================================================
// Mutation operators
// ============================================================================

/// One parent in, one child out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Noop,
    BlockShuffle,
    GapInsertion,
    GapDeletion,
    GapColumnDeletion,
}

impl Mutation {
    /// Every built-in mutation, in pool order.
    pub const ALL: [Mutation; 5] = [
        Mutation::Noop,
        Mutation::BlockShuffle,
        Mutation::GapInsertion,
        Mutation::GapDeletion,
        Mutation::GapColumnDeletion,
    ];

    pub fn perform<R: Rng>(&self, parent: &Alignment, rng: &mut R) -> Alignment {
        match self {
            Mutation::Noop => parent.duplicate(),
            Mutation::BlockShuffle => block_shuffle(parent, rng),
            Mutation::GapInsertion => gap_insertion(parent, rng),
            Mutation::GapDeletion => gap_deletion(parent, rng),
            Mutation::GapColumnDeletion => gap_column_deletion(parent),
        }
    }
}

/// Picks one row and swaps the run touching a random split point with the
/// neighbouring run of the opposite kind (gaps vs residues), shifting it left
/// or right at random.
fn block_shuffle<R: Rng>(parent: &Alignment, rng: &mut R) -> Alignment {
    let rows = parent.num_sequences();
    if rows == 0 {
        return parent.duplicate();
    }
    let row = rng.random_range(0..rows);
    let Some(seq) = parent.sequence(row) else {
        return parent.duplicate();
    };
    if seq.is_empty() {
        return parent.duplicate();
    }

    let split = rng.random_range(0..seq.len());
    let shifted = if rng.random_bool(0.5) {
        shift_left(seq.as_bytes(), split)
    } else {
        shift_right(seq.as_bytes(), split)
    };

    let mut child = parent.clone();
    child.set_sequence(row, Sequence::from_gapped(shifted));
    child
}

/// Moves the run ending just before `end` in front of the opposite-kind run
/// preceding it.
fn shift_left(row: &[u8], end: usize) -> Vec<u8> {
    if end == 0 {
        return row.to_vec();
    }
    let kind = is_gap(row[end - 1]);

    // block = row[begin..end], neighbour = row[neighbour_begin..begin]
    let mut begin = 0;
    let mut neighbour_begin = 0;
    let mut found = false;
    for i in (0..end).rev() {
        let same = is_gap(row[i]) == kind;
        if !found && !same {
            begin = i + 1;
            found = true;
        } else if found && same {
            neighbour_begin = i + 1;
            break;
        }
    }

    let mut out = Vec::with_capacity(row.len());
    out.extend_from_slice(&row[..neighbour_begin]);
    out.extend_from_slice(&row[begin..end]);
    out.extend_from_slice(&row[neighbour_begin..begin]);
    out.extend_from_slice(&row[end..]);
    out
}

/// Moves the run starting at `start` behind the opposite-kind run following it.
fn shift_right(row: &[u8], start: usize) -> Vec<u8> {
    let kind = is_gap(row[start]);

    // block = row[start..end], neighbour = row[end..neighbour_end]
    let mut end = row.len();
    let mut neighbour_end = row.len();
    let mut found = false;
    for (i, &symbol) in row.iter().enumerate().skip(start + 1) {
        let same = is_gap(symbol) == kind;
        if !found && !same {
            end = i;
            found = true;
        } else if found && same {
            neighbour_end = i;
            break;
        }
    }

    let mut out = Vec::with_capacity(row.len());
    out.extend_from_slice(&row[..start]);
    out.extend_from_slice(&row[end..neighbour_end]);
    out.extend_from_slice(&row[start..end]);
    out.extend_from_slice(&row[neighbour_end..]);
    out
}

/// Inserts one gap at an independent random column of every row.
fn gap_insertion<R: Rng>(parent: &Alignment, rng: &mut R) -> Alignment {
    let mut child = parent.clone();
    for (i, seq) in parent.sequences().iter().enumerate() {
        let at = rng.random_range(0..seq.len().max(1));
        child.set_sequence(i, seq.with_gap_at(at));
    }
    child
}

/// Deletes one gap from every row, searching from a random column and
/// wrapping around. If any row has no gap the parent is returned unchanged.
fn gap_deletion<R: Rng>(parent: &Alignment, rng: &mut R) -> Alignment {
    let mut child = parent.clone();
    for (i, seq) in parent.sequences().iter().enumerate() {
        let from = if seq.len() > 1 {
            rng.random_range(0..seq.len() - 1)
        } else {
            0
        };
        match seq.find_gap_wrapping(from) {
            Some(gap) => child.set_sequence(i, seq.without_column(gap)),
            None => return parent.duplicate(),
        }
    }
    child
}

/// Removes every column that is a gap in all rows.
fn gap_column_deletion(parent: &Alignment) -> Alignment {
    let sequences = parent.sequences();
    if sequences.is_empty() {
        return parent.duplicate();
    }
    let width = parent.width();
    let keep: Vec<bool> = (0..width)
        .map(|c| !sequences.iter().all(|s| s.get(c).is_some_and(is_gap)))
        .collect();
    if keep.iter().all(|&k| k) {
        return parent.duplicate();
    }

    let rows = sequences
        .iter()
        .map(|s| {
            let row: Vec<u8> = s
                .as_bytes()
                .iter()
                .enumerate()
                .filter(|(c, _)| keep.get(*c).copied().unwrap_or(true))
                .map(|(_, &symbol)| symbol)
                .collect();
            Sequence::from_gapped(row)
        })
        .collect();
    Alignment::from_sequences(rows, parent.scorer().clone())
}

// ============================================================================
// Tagged operator + adaptive fitness
// ============================================================================

/// Any transformation, tagged by arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Crossover(Crossover),
    Mutation(Mutation),
}

impl OperatorKind {
    /// Number of parents the operator consumes.
    pub fn arity(&self) -> usize {
        match self {
            OperatorKind::Crossover(_) => 2,
            OperatorKind::Mutation(_) => 1,
        }
    }

    pub fn is_crossover(&self) -> bool {
        matches!(self, OperatorKind::Crossover(_))
    }

    /// Applies the operator to exactly [`arity`](Self::arity) parents.
    ///
    /// # Errors
    /// [`AlignError::OperatorArity`] if the parent count does not match.
    pub fn apply<R: Rng>(&self, parents: &[&Alignment], rng: &mut R) -> Result<Vec<Alignment>> {
        match (self, parents) {
            (OperatorKind::Crossover(x), [mother, father]) => {
                Ok(x.perform(mother, father, rng).into())
            }
            (OperatorKind::Mutation(m), [parent]) => Ok(vec![m.perform(parent, rng)]),
            _ => Err(AlignError::OperatorArity {
                operator: self.to_string(),
                expected: self.arity(),
                got: parents.len(),
            }),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Crossover(Crossover::Noop) => f.write_str("NoopCrossover"),
            OperatorKind::Crossover(Crossover::OnePoint(p)) => {
                write!(f, "OnePointCrossover(Gaps{p:?})")
            }
            OperatorKind::Mutation(Mutation::Noop) => f.write_str("NoopMutation"),
            OperatorKind::Mutation(Mutation::BlockShuffle) => f.write_str("BlockShuffleMutation"),
            OperatorKind::Mutation(Mutation::GapInsertion) => f.write_str("GapInsertionMutation"),
            OperatorKind::Mutation(Mutation::GapDeletion) => f.write_str("GapDeletionMutation"),
            OperatorKind::Mutation(Mutation::GapColumnDeletion) => {
                f.write_str("GapColumnDeletionMutation")
            }
        }
    }
}

impl From<Crossover> for OperatorKind {
    fn from(x: Crossover) -> Self {
        OperatorKind::Crossover(x)
    }
}

impl From<Mutation> for OperatorKind {
    fn from(m: Mutation) -> Self {
        OperatorKind::Mutation(m)
    }
}

/// An operator competing for use inside an operator population.
///
/// Each application records its net benefit with [`add_score`](Self::add_score).
/// Reading [`fitness`](Self::fitness) folds the pending total into a decaying
/// average and clears it:
///
/// ```text
/// fitness' = (2 · fitness + pending) / 3
/// ```
///
/// Reads are therefore not idempotent: two reads with nothing pending in
/// between shrink fitness by a third each time.
#[derive(Debug, Clone)]
pub struct Operator {
    kind: OperatorKind,
    fitness: Cell<f64>,
    pending: Cell<f64>,
    uses: Cell<usize>,
}

impl Operator {
    pub fn new(kind: impl Into<OperatorKind>) -> Self {
        Self {
            kind: kind.into(),
            fitness: Cell::new(0.0),
            pending: Cell::new(0.0),
            uses: Cell::new(0),
        }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    /// Records the result of one application: sum of child fitnesses minus
    /// sum of parent fitnesses.
    pub fn add_score(&mut self, delta: f64) {
        self.pending.set(self.pending.get() + delta);
        self.uses.set(self.uses.get() + 1);
    }

    /// Applications recorded since the last fitness read.
    pub fn uses(&self) -> usize {
        self.uses.get()
    }

    /// Folds pending score into the running fitness and returns it.
    pub fn fitness(&self) -> f64 {
        let folded = (2.0 * self.fitness.get() + self.pending.get()) / 3.0;
        self.fitness.set(folded);
        self.pending.set(0.0);
        self.uses.set(0);
        folded
    }

    /// Running fitness as of the last read, without folding.
    pub fn last_fitness(&self) -> f64 {
        self.fitness.get()
    }

    pub fn apply<R: Rng>(&self, parents: &[&Alignment], rng: &mut R) -> Result<Vec<Alignment>> {
        self.kind.apply(parents, rng)
    }
}

impl super::Individual for Operator {
    fn fitness(&self) -> f64 {
        Operator::fitness(self)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl From<Crossover> for Operator {
    fn from(x: Crossover) -> Self {
        Operator::new(x)
    }
}

impl From<Mutation> for Operator {
    fn from(m: Mutation) -> Self {
        Operator::new(m)
    }
}

// ============================================================================
// Tests
// ============================================================================
