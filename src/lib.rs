//! Multiple sequence alignment by a genetic algorithm.
//!
//! A population of candidate alignments evolves under gap-preserving
//! crossover and mutation operators. The operators are themselves ranked by
//! how much they improve their children and drawn from a fitness-proportionate
//! wheel, so the search tunes its own operator mix as it runs.
//!
//! - **Alignment model**: [`alignment::Sequence`] rows and
//!   [`alignment::Alignment`] sets scored by sum of pairs.
//! - **Scoring**: pluggable [`scoring::Scorer`]s with a nucleotide scorer and
//!   a BLOSUM62 protein scorer, chosen by name through [`scoring::ScorerKind`].
//! - **Search**: [`ga::Aligner`] runs the generational loop configured by
//!   [`ga::AlignerConfig`].
//!
//! # Example
//!
//! ```
//! use u_msa::ga::{Aligner, AlignerConfig};
//! use u_msa::scoring::ScorerKind;
//!
//! let config = AlignerConfig::default()
//!     .with_scorer(ScorerKind::Dna)
//!     .with_population_size(10)
//!     .with_percentage_increase(0.0)
//!     .with_max_rounds(30)
//!     .with_seed(1);
//! let result = Aligner::new(config)?.align(&["ACTG", "ACTTG"])?;
//! for row in result.best.rows() {
//!     println!("{row}");
//! }
//! # Ok::<(), u_msa::error::AlignError>(())
//! ```

pub mod alignment;
pub mod error;
pub mod ga;
pub mod input;
pub mod random;
pub mod scoring;

pub use error::{AlignError, Result};
