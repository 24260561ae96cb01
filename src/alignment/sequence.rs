//! Gapped biological sequences.
//!
//! A [`Sequence`] is a row of an alignment: residue symbols interleaved with
//! [`GAP`] markers. Values are immutable; every transformation builds a new
//! sequence.

use rand::Rng;
use std::fmt;

/// Gap marker inside an alignment row.
pub const GAP: u8 = b'-';

/// Marker substituted for leading and trailing gaps by
/// [`Sequence::edge_gaps_marked`].
pub const EDGE_GAP: u8 = b'.';

/// Returns `true` for the gap marker.
#[inline]
pub fn is_gap(symbol: u8) -> bool {
    symbol == GAP
}

/// One gapped row of an alignment.
///
/// Symbols are stored as ASCII bytes. Cloning copies the whole row, so a
/// clone can be edited without affecting its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    symbols: Vec<u8>,
}

impl Sequence {
    /// Spreads an ungapped sequence out to `length` columns by inserting gaps
    /// at random positions.
    ///
    /// Walks the target columns left to right. While both gaps and residues
    /// remain to be placed, a gap is chosen with probability
    /// `1 - raw.len() / length`; once either supply is exhausted the other one
    /// fills the remaining columns. The result therefore always contains
    /// exactly `length - raw.len()` gaps.
    ///
    /// A `length` shorter than `raw` is raised to `raw.len()` (no gaps).
    ///
    /// # Complexity
    /// O(length)
    pub fn stretched<R: Rng>(raw: &str, length: usize, rng: &mut R) -> Self {
        let residues = raw.as_bytes();
        let length = length.max(residues.len());
        let mut gaps_left = length - residues.len();
        let gap_probability = if length == 0 {
            0.0
        } else {
            1.0 - residues.len() as f64 / length as f64
        };

        let mut symbols = Vec::with_capacity(length);
        let mut next = 0;
        for _ in 0..length {
            let take_residue = gaps_left == 0
                || (next < residues.len() && rng.random::<f64>() >= gap_probability);
            if take_residue {
                symbols.push(residues[next]);
                next += 1;
            } else {
                symbols.push(GAP);
                gaps_left -= 1;
            }
        }

        Self { symbols }
    }

    /// Wraps an already gapped row, such as the output of a crossover.
    pub fn from_gapped(row: impl Into<Vec<u8>>) -> Self {
        Self {
            symbols: row.into(),
        }
    }

    /// Number of columns, gaps included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.symbols.get(index).copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.symbols
    }

    /// Columns `start..end` of this row.
    ///
    /// # Panics
    /// Panics if the range is out of bounds.
    pub fn subsequence(&self, start: usize, end: usize) -> &[u8] {
        &self.symbols[start..end]
    }

    /// Total number of gap columns.
    pub fn gap_count(&self) -> usize {
        self.symbols.iter().filter(|&&s| is_gap(s)).count()
    }

    /// Number of residues strictly before `end` (clamped to the row length).
    pub fn non_gap_count(&self, end: usize) -> usize {
        let end = end.min(self.symbols.len());
        self.symbols[..end].iter().filter(|&&s| !is_gap(s)).count()
    }

    /// Smallest exclusive end index whose prefix holds exactly `count`
    /// residues; the row length if the row holds fewer.
    ///
    /// This is the inverse of [`non_gap_count`](Self::non_gap_count) and
    /// translates a cut point measured in residues from one gap layout to
    /// another. `count == 0` maps to index 0.
    pub fn index_reaching_count(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let mut seen = 0;
        for (i, &s) in self.symbols.iter().enumerate() {
            if !is_gap(s) {
                seen += 1;
                if seen == count {
                    return i + 1;
                }
            }
        }
        self.symbols.len()
    }

    /// Copy of this row with leading and trailing gap runs replaced by
    /// [`EDGE_GAP`].
    pub fn edge_gaps_marked(&self) -> Self {
        let mut symbols = self.symbols.clone();
        let leading = symbols.iter().take_while(|&&s| is_gap(s)).count();
        for s in &mut symbols[..leading] {
            *s = EDGE_GAP;
        }
        for s in symbols[leading..].iter_mut().rev() {
            if !is_gap(*s) {
                break;
            }
            *s = EDGE_GAP;
        }
        Self { symbols }
    }

    /// The residues of this row with every gap removed.
    pub fn ungapped(&self) -> Vec<u8> {
        self.symbols.iter().copied().filter(|&s| !is_gap(s)).collect()
    }

    /// Row with a gap inserted before column `index` (clamped to the end).
    pub fn with_gap_at(&self, index: usize) -> Self {
        let index = index.min(self.symbols.len());
        let mut symbols = Vec::with_capacity(self.symbols.len() + 1);
        symbols.extend_from_slice(&self.symbols[..index]);
        symbols.push(GAP);
        symbols.extend_from_slice(&self.symbols[index..]);
        Self { symbols }
    }

    /// Row with column `index` removed.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn without_column(&self, index: usize) -> Self {
        let mut symbols = self.symbols.clone();
        symbols.remove(index);
        Self { symbols }
    }

    /// Index of the first gap at or after `from`, wrapping around to the
    /// start of the row when none is found.
    pub fn find_gap_wrapping(&self, from: usize) -> Option<usize> {
        let from = from.min(self.symbols.len());
        self.symbols[from..]
            .iter()
            .position(|&s| is_gap(s))
            .map(|i| i + from)
            .or_else(|| self.symbols.iter().position(|&s| is_gap(s)))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.symbols))
    }
}

impl From<&str> for Sequence {
    fn from(row: &str) -> Self {
        Self::from_gapped(row.as_bytes().to_vec())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_stretched_exact_length_and_content() {
        let mut rng = create_rng(42);
        for target in [5, 8, 13, 40] {
            for _ in 0..50 {
                let seq = Sequence::stretched("ACTTG", target, &mut rng);
                assert_eq!(seq.len(), target);
                assert_eq!(seq.gap_count(), target - 5);
                assert_eq!(seq.ungapped(), b"ACTTG".to_vec());
            }
        }
    }

    #[test]
    fn test_stretched_without_slack_has_no_gaps() {
        let mut rng = create_rng(1);
        let seq = Sequence::stretched("ACTG", 4, &mut rng);
        assert_eq!(seq.to_string(), "ACTG");
    }

    #[test]
    fn test_stretched_shorter_target_is_raised() {
        let mut rng = create_rng(1);
        let seq = Sequence::stretched("ACTG", 2, &mut rng);
        assert_eq!(seq.to_string(), "ACTG");
    }

    #[test]
    fn test_stretched_gap_positions_vary() {
        let mut rng = create_rng(3);
        let layouts: std::collections::HashSet<String> = (0..50)
            .map(|_| Sequence::stretched("ACGT", 8, &mut rng).to_string())
            .collect();
        assert!(layouts.len() > 1, "gap insertion should be randomized");
    }

    #[test]
    fn test_access_and_subsequence() {
        let seq = Sequence::from("AC-TG");
        assert_eq!(seq.get(2), Some(GAP));
        assert_eq!(seq.get(5), None);
        assert_eq!(seq.subsequence(1, 4), b"C-T");
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_non_gap_count() {
        let seq = Sequence::from("-AC--T-G");
        assert_eq!(seq.non_gap_count(0), 0);
        assert_eq!(seq.non_gap_count(1), 0);
        assert_eq!(seq.non_gap_count(3), 2);
        assert_eq!(seq.non_gap_count(6), 3);
        assert_eq!(seq.non_gap_count(100), 4);
    }

    #[test]
    fn test_index_reaching_count() {
        let seq = Sequence::from("-AC--T-G");
        assert_eq!(seq.index_reaching_count(0), 0);
        assert_eq!(seq.index_reaching_count(1), 2);
        assert_eq!(seq.index_reaching_count(2), 3);
        assert_eq!(seq.index_reaching_count(3), 6);
        assert_eq!(seq.index_reaching_count(4), 8);
        assert_eq!(seq.index_reaching_count(9), 8);
    }

    #[test]
    fn test_index_reaching_count_inverts_non_gap_count() {
        let seq = Sequence::from("A--CG-T---A");
        for n in 1..=seq.ungapped().len() {
            let idx = seq.index_reaching_count(n);
            assert_eq!(seq.non_gap_count(idx), n);
            assert!(!is_gap(seq.as_bytes()[idx - 1]));
        }
    }

    #[test]
    fn test_edge_gaps_marked() {
        assert_eq!(Sequence::from("--AC-T--").edge_gaps_marked().to_string(), "..AC-T..");
        assert_eq!(Sequence::from("AC-T").edge_gaps_marked().to_string(), "AC-T");
        assert_eq!(Sequence::from("----").edge_gaps_marked().to_string(), "....");
        assert_eq!(Sequence::from("").edge_gaps_marked().to_string(), "");
    }

    #[test]
    fn test_gap_edits() {
        let seq = Sequence::from("ACTG");
        assert_eq!(seq.with_gap_at(0).to_string(), "-ACTG");
        assert_eq!(seq.with_gap_at(2).to_string(), "AC-TG");
        assert_eq!(seq.with_gap_at(9).to_string(), "ACTG-");
        assert_eq!(Sequence::from("AC-TG").without_column(2).to_string(), "ACTG");
    }

    #[test]
    fn test_find_gap_wrapping() {
        let seq = Sequence::from("A-CT-G");
        assert_eq!(seq.find_gap_wrapping(0), Some(1));
        assert_eq!(seq.find_gap_wrapping(2), Some(4));
        assert_eq!(seq.find_gap_wrapping(5), Some(1));
        assert_eq!(Sequence::from("ACTG").find_gap_wrapping(1), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Sequence::from("AC-G");
        let edited = original.clone().with_gap_at(0);
        assert_eq!(original.to_string(), "AC-G");
        assert_eq!(edited.to_string(), "-AC-G");
    }
}
