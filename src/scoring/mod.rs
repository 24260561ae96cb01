//! Pairwise sequence scorers.
//!
//! The search engine only needs the [`Scorer`] capability: given two rows of
//! equal length, return a similarity score (higher is better). Two scorers
//! ship with the crate and are selected by name through [`ScorerKind`].
//!
//! - [`DnaScorer`]: match/mismatch/gap rules for nucleotides
//! - [`Blosum62Scorer`]: BLOSUM62 substitution matrix with affine gaps

mod blosum62;
mod dna;

pub use blosum62::Blosum62Scorer;
pub use dna::DnaScorer;

use crate::alignment::Sequence;
use crate::error::{AlignError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Compares two aligned rows.
///
/// Implementations must be deterministic: alignments cache their fitness and
/// assume the same pair always scores the same.
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Scores two rows of equal length column by column.
    fn score(&self, a: &Sequence, b: &Sequence) -> f64;
}

/// Registry of the built-in scorers.
///
/// # Examples
///
/// ```
/// use u_msa::scoring::ScorerKind;
///
/// let kind: ScorerKind = "dna".parse().unwrap();
/// assert_eq!(kind, ScorerKind::Dna);
/// assert_eq!(kind.build().name(), "dna");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScorerKind {
    /// Nucleotide scorer.
    Dna,
    /// BLOSUM62 protein scorer.
    #[default]
    Protein,
}

impl ScorerKind {
    /// Instantiates the scorer, shared read-only by every alignment of a run.
    pub fn build(self) -> Arc<dyn Scorer> {
        match self {
            ScorerKind::Dna => Arc::new(DnaScorer),
            ScorerKind::Protein => Arc::new(Blosum62Scorer),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScorerKind::Dna => "dna",
            ScorerKind::Protein => "protein",
        }
    }
}

impl FromStr for ScorerKind {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dna" | "nucleotide" => Ok(ScorerKind::Dna),
            "protein" | "blosum62" => Ok(ScorerKind::Protein),
            _ => Err(AlignError::UnknownScorer(s.to_string())),
        }
    }
}

impl TryFrom<String> for ScorerKind {
    type Error = AlignError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ScorerKind> for String {
    fn from(kind: ScorerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
