//! Sequences and the alignments built from them.
//!
//! - [`Sequence`]: one gapped row, immutable per value
//! - [`Alignment`]: a set of rows scored by sum of pairs, with a cached fitness

#[allow(clippy::module_inception)]
mod alignment;
mod sequence;

pub use alignment::Alignment;
pub use sequence::{is_gap, Sequence, EDGE_GAP, GAP};
