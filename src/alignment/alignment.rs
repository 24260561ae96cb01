//! Candidate multiple alignments.

use super::sequence::Sequence;
use crate::ga::Individual;
use crate::scoring::Scorer;
use rand::Rng;
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

/// One candidate solution: an ordered set of gapped rows.
///
/// Fitness is the sum of [`Scorer::score`] over every unordered pair of rows.
/// It is computed on first use and cached; replacing or adding a row clears
/// the cache.
///
/// [`Clone`] deep-copies every row and shares the scorer, but does **not**
/// carry the cached fitness over: clones are produced in order to be edited.
pub struct Alignment {
    sequences: Vec<Sequence>,
    scorer: Arc<dyn Scorer>,
    fitness: OnceCell<f64>,
}

impl Alignment {
    /// Creates an alignment with no rows.
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self {
            sequences: Vec::new(),
            scorer,
            fitness: OnceCell::new(),
        }
    }

    /// Builds an alignment from already gapped rows.
    pub fn from_sequences(sequences: Vec<Sequence>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            sequences,
            scorer,
            fitness: OnceCell::new(),
        }
    }

    /// Stretches every raw sequence to `length` columns with randomly placed
    /// gaps (see [`Sequence::stretched`]).
    pub fn stretched<S, R>(raw: &[S], length: usize, scorer: Arc<dyn Scorer>, rng: &mut R) -> Self
    where
        S: AsRef<str>,
        R: Rng,
    {
        let sequences = raw
            .iter()
            .map(|s| Sequence::stretched(s.as_ref(), length, rng))
            .collect();
        Self::from_sequences(sequences, scorer)
    }

    /// Appends a row. Clears the cached fitness.
    pub fn add_sequence(&mut self, sequence: Sequence) {
        self.fitness.take();
        self.sequences.push(sequence);
    }

    /// Replaces row `index`. Clears the cached fitness.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set_sequence(&mut self, index: usize, sequence: Sequence) {
        self.fitness.take();
        self.sequences[index] = sequence;
    }

    /// Number of rows.
    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Number of columns (length of the first row, 0 when empty).
    pub fn width(&self) -> usize {
        self.sequences.first().map_or(0, Sequence::len)
    }

    pub fn sequence(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn scorer(&self) -> &Arc<dyn Scorer> {
        &self.scorer
    }

    /// Gapped rows as strings.
    pub fn rows(&self) -> Vec<String> {
        self.sequences.iter().map(Sequence::to_string).collect()
    }

    /// Sum-of-pairs score, cached after the first call.
    ///
    /// # Complexity
    /// O(n² · L) on a cache miss for n rows of length L, O(1) afterwards.
    pub fn fitness(&self) -> f64 {
        *self.fitness.get_or_init(|| self.sum_of_pairs())
    }

    fn sum_of_pairs(&self) -> f64 {
        let mut total = 0.0;
        for (i, a) in self.sequences.iter().enumerate() {
            for b in &self.sequences[i + 1..] {
                total += self.scorer.score(a, b);
            }
        }
        total
    }

    /// Whether every row holds the same number of columns.
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.sequences.iter().all(|s| s.len() == width)
    }

    /// Checks that this alignment is a pure rearrangement of `parent`'s gaps:
    /// same number of rows, and each row carries exactly the parent row's
    /// residues in the same order.
    pub fn verify(&self, parent: &Alignment) -> bool {
        self.sequences.len() == parent.sequences.len()
            && self
                .sequences
                .iter()
                .zip(&parent.sequences)
                .all(|(child, parent)| child.ungapped() == parent.ungapped())
    }

    /// Copy that keeps the cached fitness.
    ///
    /// Used where an alignment is passed on unchanged (no-op operators,
    /// elitism), so its score is not recomputed.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            sequences: self.sequences.clone(),
            scorer: Arc::clone(&self.scorer),
            fitness: self.fitness.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn has_cached_fitness(&self) -> bool {
        self.fitness.get().is_some()
    }
}

impl Clone for Alignment {
    fn clone(&self) -> Self {
        Self {
            sequences: self.sequences.clone(),
            scorer: Arc::clone(&self.scorer),
            fitness: OnceCell::new(),
        }
    }
}

impl Individual for Alignment {
    fn fitness(&self) -> f64 {
        Alignment::fitness(self)
    }
}

impl fmt::Debug for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alignment")
            .field("rows", &self.rows())
            .field("scorer", &self.scorer.name())
            .field("fitness", &self.fitness.get())
            .finish()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seq in &self.sequences {
            writeln!(f, "{seq}")?;
        }
        write!(f, "Fitness: {}", self.fitness())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::scoring::DnaScorer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dna() -> Arc<dyn Scorer> {
        Arc::new(DnaScorer)
    }

    fn aln(rows: &[&str]) -> Alignment {
        Alignment::from_sequences(rows.iter().map(|&r| Sequence::from(r)).collect(), dna())
    }

    /// Counts how many pairwise comparisons were made.
    #[derive(Debug, Default)]
    struct CountingScorer {
        calls: AtomicUsize,
    }

    impl Scorer for CountingScorer {
        fn name(&self) -> &str {
            "counting"
        }
        fn score(&self, _a: &Sequence, _b: &Sequence) -> f64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            1.0
        }
    }

    #[test]
    fn test_sum_of_pairs() {
        let a = aln(&["ACT-G", "ACTTG"]);
        assert_eq!(a.fitness(), 2.0);

        // three identical rows: 3 pairs x 4 matches
        let b = aln(&["ACTG", "ACTG", "ACTG"]);
        assert_eq!(b.fitness(), 12.0);
    }

    #[test]
    fn test_fitness_is_cached() {
        let scorer = Arc::new(CountingScorer::default());
        let a = Alignment::from_sequences(
            vec![Sequence::from("AC"), Sequence::from("AC"), Sequence::from("AC")],
            scorer.clone(),
        );
        assert_eq!(a.fitness(), 3.0);
        assert_eq!(a.fitness(), 3.0);
        assert_eq!(scorer.calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_edits_invalidate_cache() {
        let mut a = aln(&["ACTG", "ACTG"]);
        assert_eq!(a.fitness(), 4.0);

        a.set_sequence(1, Sequence::from("ACTA"));
        assert!(!a.has_cached_fitness());
        assert_eq!(a.fitness(), 2.0);

        a.add_sequence(Sequence::from("ACTG"));
        assert!(!a.has_cached_fitness());
        // (ACTG,ACTA)=2 + (ACTG,ACTG)=4 + (ACTA,ACTG)=2
        assert_eq!(a.fitness(), 8.0);
    }

    #[test]
    fn test_clone_drops_cache_and_is_independent() {
        let a = aln(&["ACTG", "ACTG"]);
        a.fitness();
        let mut b = a.clone();
        assert!(!b.has_cached_fitness());
        b.set_sequence(0, Sequence::from("TTTT"));
        assert_eq!(a.rows(), vec!["ACTG", "ACTG"]);
        assert!(Arc::ptr_eq(a.scorer(), b.scorer()));
    }

    #[test]
    fn test_duplicate_keeps_cache() {
        let a = aln(&["ACTG", "ACTG"]);
        a.fitness();
        assert!(a.duplicate().has_cached_fitness());
    }

    #[test]
    fn test_verify() {
        let parent = aln(&["AC-TG", "ACTTG"]);
        assert!(aln(&["ACT-G", "-ACTTG"]).verify(&parent));
        assert!(!aln(&["ACT-A", "ACTTG"]).verify(&parent));
        assert!(!aln(&["ACTTG", "AC-TG"]).verify(&parent));
        assert!(!aln(&["AC-TG"]).verify(&parent));
    }

    #[test]
    fn test_stretched() {
        let mut rng = create_rng(42);
        let a = Alignment::stretched(&["ACTG", "ACTTG"], 7, dna(), &mut rng);
        assert_eq!(a.num_sequences(), 2);
        assert_eq!(a.width(), 7);
        assert!(a.is_rectangular());
        assert_eq!(a.sequence(0).unwrap().ungapped(), b"ACTG".to_vec());
    }

    #[test]
    fn test_display() {
        let a = aln(&["AC", "AC"]);
        assert_eq!(a.to_string(), "AC\nAC\nFitness: 2");
    }
}
