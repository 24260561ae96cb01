use super::Scorer;
use crate::alignment::{is_gap, Sequence};

const GAP_OPEN_PENALTY: i32 = -12;
const GAP_EXTEND_PENALTY: i32 = -4;

/// Residue order of the rows and columns of [`BLOSUM62`].
const RESIDUES: &[u8; 20] = b"CSTPAGNDEQHRKMILVFYW";

#[rustfmt::skip]
const BLOSUM62: [[i8; 20]; 20] = [
    //C   S   T   P   A   G   N   D   E   Q   H   R   K   M   I   L   V   F   Y   W
    [ 9, -1, -1, -3,  0, -3, -3, -3, -4, -3, -3, -3, -3, -1, -1, -1, -1, -2, -2, -2], // C
    [-1,  4,  1, -1,  1,  0,  1,  0,  0,  0, -1, -1,  0, -1, -2, -2, -2, -2, -2, -3], // S
    [-1,  1,  5, -1,  0, -2,  0, -1, -1, -1, -2, -1, -1, -1, -1, -1,  0, -2, -2, -2], // T
    [-3, -1, -1,  7, -1, -2, -2, -1, -1, -1, -2, -2, -1, -2, -3, -3, -2, -4, -3, -4], // P
    [ 0,  1,  0, -1,  4,  0, -2, -2, -1, -1, -2, -1, -1, -1, -1, -1,  0, -2, -2, -3], // A
    [-3,  0, -2, -2,  0,  6,  0, -1, -2, -2, -2, -2, -2, -3, -4, -4, -3, -3, -3, -2], // G
    [-3,  1,  0, -2, -2,  0,  6,  1,  0,  0,  1,  0,  0, -2, -3, -3, -3, -3, -2, -4], // N
    [-3,  0, -1, -1, -2, -1,  1,  6,  2,  0, -1, -2, -1, -3, -3, -4, -3, -3, -3, -4], // D
    [-4,  0, -1, -1, -1, -2,  0,  2,  5,  2,  0,  0,  1, -2, -3, -3, -2, -3, -2, -3], // E
    [-3,  0, -1, -1, -1, -2,  0,  0,  2,  5,  0,  1,  1,  0, -3, -2, -2, -3, -1, -2], // Q
    [-3, -1, -2, -2, -2, -2,  1, -1,  0,  0,  8,  0, -1, -2, -3, -3, -3, -1,  2, -2], // H
    [-3, -1, -1, -2, -1, -2,  0, -2,  0,  1,  0,  5,  2, -1, -3, -2, -3, -3, -2, -3], // R
    [-3,  0, -1, -1, -1, -2,  0, -1,  1,  1, -1,  2,  5, -1, -3, -2, -2, -3, -2, -3], // K
    [-1, -1, -1, -2, -1, -3, -2, -3, -2,  0, -2, -1, -1,  5,  1,  2,  1,  0, -1, -1], // M
    [-1, -2, -1, -3, -1, -4, -3, -3, -3, -3, -3, -3, -3,  1,  4,  2,  3,  0, -1, -3], // I
    [-1, -2, -1, -3, -1, -4, -3, -4, -3, -2, -3, -2, -2,  2,  2,  4,  1,  0, -1, -2], // L
    [-1, -2,  0, -2,  0, -3, -3, -3, -2, -2, -3, -3, -2,  1,  3,  1,  4, -1, -1, -3], // V
    [-2, -2, -2, -4, -2, -3, -3, -3, -3, -3, -1, -3, -3,  0,  0,  0, -1,  6,  3,  1], // F
    [-2, -2, -2, -3, -2, -3, -2, -3, -2, -1,  2, -2, -2, -1, -1, -1, -1,  3,  7,  2], // Y
    [-2, -3, -2, -4, -3, -2, -4, -4, -3, -2, -2, -3, -3, -1, -3, -2, -3,  1,  2, 11], // W
];

fn residue_index(symbol: u8) -> Option<usize> {
    let upper = symbol.to_ascii_uppercase();
    RESIDUES.iter().position(|&r| r == upper)
}

/// Substitution score of two residues; `None` if either is outside the matrix.
pub(crate) fn substitution(a: u8, b: u8) -> Option<i32> {
    Some(BLOSUM62[residue_index(a)?][residue_index(b)?] as i32)
}

/// Affine penalty for a closed gap run of `len` columns.
///
/// Runs at the edges of the gapped row (before its first residue, or still
/// open at the end) pay half, rounded toward zero.
fn gap_penalty(len: usize, at_edge: bool) -> i32 {
    if len == 0 {
        return 0;
    }
    let penalty = GAP_OPEN_PENALTY + GAP_EXTEND_PENALTY * (len as i32 - 1);
    if at_edge {
        penalty / 2
    } else {
        penalty
    }
}

/// BLOSUM62 protein scorer with affine gap penalties.
///
/// Gap opening costs -12 and each further gap column -4. A gap run is
/// charged when it closes, at half rate if it is a leading or trailing run of
/// the gapped row. Columns where both rows hold a gap are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blosum62Scorer;

impl Scorer for Blosum62Scorer {
    fn name(&self) -> &str {
        "blosum62"
    }

    fn score(&self, a: &Sequence, b: &Sequence) -> f64 {
        let mut score = 0i32;

        // Whether each row has emitted a residue yet.
        let mut a_started = false;
        let mut b_started = false;
        // Length of the gap run currently open in each row.
        let mut a_run = 0usize;
        let mut b_run = 0usize;

        for (&x, &y) in a.as_bytes().iter().zip(b.as_bytes()) {
            match (is_gap(x), is_gap(y)) {
                (true, true) => {}
                (true, false) => {
                    a_run += 1;
                    b_started = true;
                }
                (false, true) => {
                    b_run += 1;
                    a_started = true;
                }
                (false, false) => {
                    score += substitution(x, y).unwrap_or(0);
                    score += gap_penalty(a_run, !a_started);
                    score += gap_penalty(b_run, !b_started);
                    a_run = 0;
                    b_run = 0;
                    a_started = true;
                    b_started = true;
                }
            }
        }

        // Trailing runs.
        score += gap_penalty(a_run, true);
        score += gap_penalty(b_run, true);

        score as f64
    }
}
