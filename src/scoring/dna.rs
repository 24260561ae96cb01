use super::Scorer;
use crate::alignment::{Sequence, EDGE_GAP, GAP};

/// Column-wise nucleotide scorer.
///
/// Both rows are edge-marked first, then each column scores:
///
/// | column                              | score |
/// |-------------------------------------|-------|
/// | gap over gap                        | 0     |
/// | leading/trailing gap on either side | -1    |
/// | identical symbols                   | +1    |
/// | internal gap over a symbol          | -2    |
/// | mismatch                            | -1    |
#[derive(Debug, Clone, Copy, Default)]
pub struct DnaScorer;

impl Scorer for DnaScorer {
    fn name(&self) -> &str {
        "dna"
    }

    fn score(&self, a: &Sequence, b: &Sequence) -> f64 {
        let a = a.edge_gaps_marked();
        let b = b.edge_gaps_marked();

        a.as_bytes()
            .iter()
            .zip(b.as_bytes())
            .map(|(&x, &y)| {
                if x == GAP && y == GAP {
                    0.0
                } else if x == EDGE_GAP || y == EDGE_GAP {
                    -1.0
                } else if x == y {
                    1.0
                } else if x == GAP || y == GAP {
                    -2.0
                } else {
                    -1.0
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(a: &str, b: &str) -> f64 {
        DnaScorer.score(&Sequence::from(a), &Sequence::from(b))
    }

    #[test]
    fn test_identical_rows() {
        assert_eq!(score("ACTG", "ACTG"), 4.0);
    }

    #[test]
    fn test_internal_gap() {
        // three matches, one internal gap, one match
        assert_eq!(score("ACT-G", "ACTTG"), 2.0);
    }

    #[test]
    fn test_edge_gaps_are_cheaper() {
        assert_eq!(score("-ACTG", "AACTG"), 3.0);
        assert_eq!(score("ACTG-", "ACTGA"), 3.0);
    }

    #[test]
    fn test_mismatch_and_aligned_gaps() {
        assert_eq!(score("A-C", "A-G"), 0.0);
    }

    #[test]
    fn test_symbols_compared_exactly() {
        assert_eq!(score("acgt", "ACGT"), -4.0);
        assert_eq!(score("acgt", "acgt"), 4.0);
    }
}
