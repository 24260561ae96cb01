//! Genetic search over alignments.
//!
//! Candidate alignments and the operators that transform them are both
//! [`Individual`]s, held in [`Population`]s and drawn by fitness through a
//! [`RouletteWheel`]. Operators earn fitness from the improvement their
//! children show over their parents, so productive operators are drawn more
//! often as the search goes on.
//!
//! # Key Types
//!
//! - [`AlignerConfig`]: Search parameters (population size, width increase, termination)
//! - [`Aligner`]: Executes the generational loop
//! - [`AlignmentResult`]: Final alignment with run statistics
//!
//! # Submodules
//!
//! - [`operators`]: Gap-preserving crossover and mutation operators
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Notredame & Higgins (1996), *SAGA: sequence alignment by genetic algorithm*

mod config;
pub mod operators;
mod population;
mod runner;
mod selection;
mod types;

pub use config::AlignerConfig;
pub use operators::{Crossover, GapPlacement, Mutation, Operator, OperatorKind};
pub use population::Population;
pub use runner::{Aligner, AlignmentResult};
pub use selection::{RouletteWheel, SLOTS_PER_MEMBER};
pub use types::Individual;
