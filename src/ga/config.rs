//! Aligner configuration.
//!
//! [`AlignerConfig`] holds all parameters that control the evolutionary loop.
//! It can be built in code with the `with_*` builder methods or loaded from
//! TOML with camelCase keys:
//!
//! ```toml
//! scorer = "dna"
//! populationSize = 50
//! percentageIncrease = 15.0
//! unchangedRoundsNeeded = 50
//! maxRounds = 200
//! mergeOperators = false
//! seed = 42
//! verifyChildren = false
//! ```

use crate::error::{AlignError, Result};
use crate::scoring::ScorerKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Configuration for the aligner.
///
/// # Defaults
///
/// ```
/// use u_msa::ga::AlignerConfig;
///
/// let config = AlignerConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_rounds, Some(200));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_msa::ga::AlignerConfig;
/// use u_msa::scoring::ScorerKind;
///
/// let config = AlignerConfig::default()
///     .with_scorer(ScorerKind::Dna)
///     .with_population_size(20)
///     .with_percentage_increase(0.0)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignerConfig {
    /// Scorer used for every alignment.
    pub scorer: ScorerKind,

    /// Number of alignments in the population. Must be at least 2.
    pub population_size: usize,

    /// Extra alignment width, as a percentage of the longest input sequence.
    pub percentage_increase: f64,

    /// Consecutive rounds with an unchanged rounded best fitness before the
    /// search stops.
    pub unchanged_rounds_needed: usize,

    /// Hard cap on generations. `None` disables the cap; in TOML an absent,
    /// zero, or negative value does the same.
    #[serde(
        default,
        deserialize_with = "deserialize_max_rounds",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_rounds: Option<usize>,

    /// Draw crossovers and mutations from one shared pool instead of running
    /// a crossover phase followed by a mutation phase.
    pub merge_operators: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Check that every child keeps its parent's residues, replacing faulty
    /// children with the parent.
    pub verify_children: bool,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::default(),
            population_size: 50,
            percentage_increase: 15.0,
            unchanged_rounds_needed: 50,
            max_rounds: Some(200),
            merge_operators: false,
            seed: None,
            verify_children: false,
        }
    }
}

fn deserialize_max_rounds<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.filter(|&n| n > 0).map(|n| n as usize))
}

impl AlignerConfig {
    /// Sets the scorer.
    pub fn with_scorer(mut self, scorer: ScorerKind) -> Self {
        self.scorer = scorer;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the extra width percentage.
    pub fn with_percentage_increase(mut self, percent: f64) -> Self {
        self.percentage_increase = percent;
        self
    }

    /// Sets the stagnation threshold.
    pub fn with_unchanged_rounds_needed(mut self, n: usize) -> Self {
        self.unchanged_rounds_needed = n;
        self
    }

    /// Sets the round cap (0 disables it).
    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = (n > 0).then_some(n);
        self
    }

    /// Removes the round cap.
    pub fn without_max_rounds(mut self) -> Self {
        self.max_rounds = None;
        self
    }

    pub fn with_merge_operators(mut self, merge: bool) -> Self {
        self.merge_operators = merge;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verify_children(mut self, verify: bool) -> Self {
        self.verify_children = verify;
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// [`AlignError::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(AlignError::InvalidConfig(format!(
                "populationSize must be at least 2, got {}",
                self.population_size
            )));
        }
        if !self.percentage_increase.is_finite() || self.percentage_increase < 0.0 {
            return Err(AlignError::InvalidConfig(format!(
                "percentageIncrease must be a non-negative number, got {}",
                self.percentage_increase
            )));
        }
        if self.unchanged_rounds_needed < 1 {
            return Err(AlignError::InvalidConfig(
                "unchangedRoundsNeeded must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Width every row is stretched to for the initial population.
    ///
    /// `max_len` itself when the increase is zero, otherwise
    /// `round(max_len · (1 + percentage / 100))`.
    pub fn target_length(&self, max_len: usize) -> usize {
        if self.percentage_increase == 0.0 {
            return max_len;
        }
        let stretched = (max_len as f64 * (1.0 + self.percentage_increase / 100.0)).round();
        (stretched as usize).max(max_len)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AlignError::InvalidConfig(format!("failed to serialize config: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
