//! Generational loop.
//!
//! [`Aligner`] orchestrates the complete evolutionary process:
//! stretching → reproduction → variation → elitism → termination check → repeat.
//!
//! Variation either runs a crossover phase followed by a mutation phase, or
//! draws every operator from one merged pool and branches on its arity. In
//! both modes every application feeds its net fitness change back to the
//! operator that produced it, and the operator wheel is rebuilt right away.

use super::config::AlignerConfig;
use super::operators::{Crossover, Mutation, Operator};
use super::population::Population;
use super::types::round_fitness;
use crate::alignment::Alignment;
use crate::error::{AlignError, Result};
use crate::random::rng_from_seed;
use crate::scoring::Scorer;
use log::{debug, info, log_enabled, trace, warn, Level};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

/// Extra draws allowed when the father comes out identical to the mother.
const MAX_PAIRING_TRIES: usize = 10;

/// Rounds between progress log lines.
const LOG_INTERVAL: usize = 10;

/// Result of an alignment run.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Best alignment in the final population.
    pub best: Alignment,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the best fitness stopped changing
    /// (rather than at the round cap).
    pub stagnated: bool,

    /// Population best before the first generation and after each one.
    pub fitness_history: Vec<f64>,

    /// Final fitness of every operator that took part, by name.
    pub operator_fitness: Vec<(String, f64)>,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Stagnation,
    RoundCap,
}

/// Round counting and stagnation tracking.
#[derive(Debug, Clone)]
struct Termination {
    max_rounds: Option<usize>,
    unchanged_needed: usize,
    rounds: usize,
    best_last_round: Option<i64>,
    unchanged: usize,
}

impl Termination {
    fn new(config: &AlignerConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
            unchanged_needed: config.unchanged_rounds_needed,
            rounds: 0,
            best_last_round: None,
            unchanged: 0,
        }
    }

    /// Records one finished round with the population's best fitness.
    fn check(&mut self, best: f64) -> Option<Stop> {
        self.rounds += 1;

        let rounded = round_fitness(best);
        if self.best_last_round == Some(rounded) {
            self.unchanged += 1;
        } else {
            self.unchanged = 0;
            self.best_last_round = Some(rounded);
        }

        if self.unchanged >= self.unchanged_needed {
            return Some(Stop::Stagnation);
        }
        match self.max_rounds {
            Some(max) if self.rounds >= max => Some(Stop::RoundCap),
            _ => None,
        }
    }
}

/// Genetic multiple sequence aligner.
///
/// Owns the random source, the shared scorer, and the adaptive operator
/// pools. Operator fitness is reset at the start of every [`align`](Self::align)
/// call.
///
/// # Usage
///
/// ```
/// use u_msa::ga::{Aligner, AlignerConfig};
/// use u_msa::scoring::ScorerKind;
///
/// let config = AlignerConfig::default()
///     .with_scorer(ScorerKind::Dna)
///     .with_population_size(10)
///     .with_percentage_increase(0.0)
///     .with_max_rounds(20)
///     .with_seed(42);
/// let mut aligner = Aligner::new(config).unwrap();
/// let result = aligner.align(&["ACTG", "ACTTG"]).unwrap();
/// assert_eq!(result.best.num_sequences(), 2);
/// ```
pub struct Aligner<R: Rng = StdRng> {
    config: AlignerConfig,
    scorer: Arc<dyn Scorer>,
    rng: R,
    crossovers: Population<Operator>,
    mutations: Population<Operator>,
    merged: Population<Operator>,
}

impl Aligner<StdRng> {
    /// Builds an aligner with the configured scorer and a generator seeded
    /// from `config.seed` (or entropy).
    ///
    /// # Errors
    /// [`AlignError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: AlignerConfig) -> Result<Self> {
        let scorer = config.scorer.build();
        let rng = rng_from_seed(config.seed);
        Self::with_parts(config, scorer, rng)
    }
}

impl<R: Rng> Aligner<R> {
    /// Builds an aligner around an explicit scorer and random source.
    ///
    /// `config.scorer` and `config.seed` are ignored.
    pub fn with_parts(config: AlignerConfig, scorer: Arc<dyn Scorer>, rng: R) -> Result<Self> {
        config.validate()?;
        let mut aligner = Self {
            config,
            scorer,
            rng,
            crossovers: Population::new(),
            mutations: Population::new(),
            merged: Population::new(),
        };
        aligner.reset_operators();
        Ok(aligner)
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    pub fn scorer(&self) -> &Arc<dyn Scorer> {
        &self.scorer
    }

    /// Aligns raw (ungapped) sequences.
    ///
    /// # Errors
    /// - [`AlignError::TooFewSequences`] for fewer than two sequences
    /// - [`AlignError::EmptySequence`] if any sequence is empty
    /// - [`AlignError::NonAsciiSequence`] if any sequence holds a non-ASCII
    ///   character
    pub fn align<S: AsRef<str>>(&mut self, sequences: &[S]) -> Result<AlignmentResult> {
        check_input(sequences)?;
        self.reset_operators();

        let max_len = sequences
            .iter()
            .map(|s| s.as_ref().len())
            .max()
            .unwrap_or(0);
        let width = self.config.target_length(max_len);
        info!(
            "Starting search: {} sequences, width {}, population {}, scorer {}",
            sequences.len(),
            width,
            self.config.population_size,
            self.scorer.name()
        );

        // 1. Initial population
        let mut population: Population<Alignment> = (0..self.config.population_size)
            .map(|_| Alignment::stretched(sequences, width, self.scorer.clone(), &mut self.rng))
            .collect();

        let mut fitness_history = vec![best_fitness(&population)];

        let mut termination = Termination::new(&self.config);
        let mut best_ever = f64::NEG_INFINITY;

        // 2. Evolutionary loop
        let stop = loop {
            let elite = population.best().map(Alignment::duplicate);
            if let Some(elite) = &elite {
                best_ever = best_ever.max(elite.fitness());
            }
            let log_round = termination.rounds % LOG_INTERVAL == 0;
            if log_round {
                if let Some(elite) = &elite {
                    debug!("Round best:\n{elite}");
                }
            }

            population = self.generation(population, elite)?;
            let best = best_fitness(&population);
            fitness_history.push(best);

            if log_round {
                info!(
                    "Round {}: population best {}, best ever {}",
                    termination.rounds + 1,
                    best,
                    best_ever
                );
                self.log_operator_wheels();
            }

            if let Some(stop) = termination.check(best) {
                break stop;
            }
        };

        let best = population
            .best()
            .map(Alignment::duplicate)
            .ok_or_else(|| AlignError::InvalidConfig("population is empty".to_string()))?;
        let best_fitness = best.fitness();
        info!(
            "Search finished after {} rounds ({}), best fitness {}",
            termination.rounds,
            match stop {
                Stop::Stagnation => "stagnated",
                Stop::RoundCap => "round cap",
            },
            best_fitness
        );
        self.log_operator_wheels();

        Ok(AlignmentResult {
            best,
            best_fitness,
            generations: termination.rounds,
            stagnated: stop == Stop::Stagnation,
            fitness_history,
            operator_fitness: self.operator_fitness(),
        })
    }

    /// One generation: reproduction, variation, then the elite is put back.
    fn generation(
        &mut self,
        mut population: Population<Alignment>,
        elite: Option<Alignment>,
    ) -> Result<Population<Alignment>> {
        let verify = self.config.verify_children;
        let target = self.config.population_size.saturating_sub(1);

        let working = reproduce(&mut population, target, &mut self.rng);
        let mut next = if self.config.merge_operators {
            vary(working, &mut self.merged, &mut self.rng, verify)?
        } else {
            let crossed = vary(working, &mut self.crossovers, &mut self.rng, verify)?;
            vary(crossed, &mut self.mutations, &mut self.rng, verify)?
        };

        if let Some(elite) = elite {
            next.add(elite);
        }
        Ok(next)
    }

    fn reset_operators(&mut self) {
        self.crossovers = Crossover::ALL.into_iter().map(Operator::from).collect();
        self.mutations = Mutation::ALL.into_iter().map(Operator::from).collect();

        let mut merged = Population::with_capacity(Crossover::ALL.len() + Mutation::ALL.len());
        merged.absorb(Crossover::ALL.into_iter().collect::<Population<Crossover>>());
        merged.absorb(Mutation::ALL.into_iter().collect::<Population<Mutation>>());
        self.merged = merged;
    }

    fn active_pools(&self) -> Vec<(&'static str, &Population<Operator>)> {
        if self.config.merge_operators {
            vec![("Operators", &self.merged)]
        } else {
            vec![("Crossover operators", &self.crossovers), ("Mutation operators", &self.mutations)]
        }
    }

    fn log_operator_wheels(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        for (label, pool) in self.active_pools() {
            debug!("{label}: {}", pool.distribution());
        }
    }

    fn operator_fitness(&self) -> Vec<(String, f64)> {
        self.active_pools()
            .into_iter()
            .flat_map(|(_, pool)| pool.iter())
            .map(|op| (op.to_string(), op.last_fitness()))
            .collect()
    }
}

fn check_input<S: AsRef<str>>(sequences: &[S]) -> Result<()> {
    if sequences.len() < 2 {
        return Err(AlignError::TooFewSequences(sequences.len()));
    }
    if let Some(i) = sequences.iter().position(|s| s.as_ref().is_empty()) {
        return Err(AlignError::EmptySequence(i));
    }
    if let Some(i) = sequences.iter().position(|s| !s.as_ref().is_ascii()) {
        return Err(AlignError::NonAsciiSequence(i));
    }
    Ok(())
}

fn best_fitness(population: &Population<Alignment>) -> f64 {
    population
        .best()
        .map(Alignment::fitness)
        .unwrap_or(f64::NEG_INFINITY)
}

/// Draws `count` members with replacement, proportionally to fitness.
fn reproduce<R: Rng>(
    population: &mut Population<Alignment>,
    count: usize,
    rng: &mut R,
) -> Population<Alignment> {
    let mut next = Population::with_capacity(count + 1);
    for _ in 0..count {
        if let Some(i) = population.select(rng) {
            next.add(population[i].duplicate());
        }
    }
    next
}

/// Runs every slot of `population` through operators drawn from `operators`,
/// producing a population of the same size.
fn vary<R: Rng>(
    mut population: Population<Alignment>,
    operators: &mut Population<Operator>,
    rng: &mut R,
    verify: bool,
) -> Result<Population<Alignment>> {
    let target = population.len();
    let mut next = Population::with_capacity(target);

    while next.len() < target {
        let Some(op_index) = operators.select(rng) else {
            break;
        };
        let Some(mother) = population.select(rng) else {
            break;
        };
        let arity = operators[op_index].kind().arity();
        let father = if arity == 2 {
            Some(pick_father(&mut population, mother, rng))
        } else {
            None
        };

        let parents: Vec<&Alignment> = std::iter::once(mother)
            .chain(father)
            .map(|i| &population[i])
            .collect();
        let children = apply_operator(operators, op_index, &parents, rng, verify)?;

        for child in children {
            if next.len() < target {
                next.add(child);
            }
        }
    }

    Ok(next)
}

/// Draws a father, retrying while it is the mother.
fn pick_father<R: Rng>(population: &mut Population<Alignment>, mother: usize, rng: &mut R) -> usize {
    let mut father = population.select(rng).unwrap_or(mother);
    let mut tries = 0;
    while father == mother && tries < MAX_PAIRING_TRIES {
        father = population.select(rng).unwrap_or(mother);
        tries += 1;
    }
    father
}

/// Applies one operator, scores it on the net fitness change, and rebuilds
/// the operator wheel.
fn apply_operator<R: Rng>(
    operators: &mut Population<Operator>,
    op_index: usize,
    parents: &[&Alignment],
    rng: &mut R,
    verify: bool,
) -> Result<Vec<Alignment>> {
    let op = &operators[op_index];
    let mut children = op.apply(parents, rng)?;
    trace!("{op}: {} parent(s) -> {} child(ren)", parents.len(), children.len());

    if verify {
        if let Some(&first) = parents.first() {
            for child in children.iter_mut() {
                if !child.verify(first) {
                    warn!("Child does not match parent after {op}:\n{first}\n{child}");
                    *child = first.duplicate();
                }
            }
        }
    }

    let child_fitness: f64 = children.iter().map(Alignment::fitness).sum();
    let parent_fitness: f64 = parents.iter().map(|p| p.fitness()).sum();
    if let Some(op) = operators.get_mut(op_index) {
        op.add_score(child_fitness - parent_fitness);
    }
    operators.recalculate_probabilities();
    if log_enabled!(Level::Trace) {
        trace!("{}", operators.distribution());
    }

    Ok(children)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Sequence;
    use crate::ga::GapPlacement;
    use crate::random::create_rng;
    use crate::scoring::{DnaScorer, ScorerKind};

    fn dna_config() -> AlignerConfig {
        AlignerConfig::default()
            .with_scorer(ScorerKind::Dna)
            .with_population_size(10)
            .with_percentage_increase(0.0)
            .with_max_rounds(50)
            .with_seed(42)
    }

    fn trivial_fitness() -> f64 {
        Alignment::from_sequences(
            vec![Sequence::from("ACT-G"), Sequence::from("ACTTG")],
            Arc::new(DnaScorer),
        )
        .fitness()
    }

    fn assert_preserves_input(result: &AlignmentResult, input: &[&str]) {
        assert_eq!(result.best.num_sequences(), input.len());
        assert!(result.best.is_rectangular());
        for (seq, raw) in result.best.sequences().iter().zip(input) {
            assert_eq!(seq.ungapped(), raw.as_bytes());
        }
    }

    // ---- Termination ----

    #[test]
    fn test_stagnation_stops_at_threshold() {
        let config = AlignerConfig::default()
            .with_unchanged_rounds_needed(3)
            .without_max_rounds();
        let mut termination = Termination::new(&config);
        assert_eq!(termination.check(5.0), None);
        assert_eq!(termination.check(5.2), None);
        assert_eq!(termination.check(4.9), None);
        assert_eq!(termination.check(5.0), Some(Stop::Stagnation));
        assert_eq!(termination.rounds, 4);
    }

    #[test]
    fn test_improvement_resets_stagnation() {
        let config = AlignerConfig::default()
            .with_unchanged_rounds_needed(2)
            .without_max_rounds();
        let mut termination = Termination::new(&config);
        assert_eq!(termination.check(1.0), None);
        assert_eq!(termination.check(1.0), None);
        assert_eq!(termination.check(3.0), None);
        assert_eq!(termination.check(3.0), None);
        assert_eq!(termination.check(3.0), Some(Stop::Stagnation));
        assert_eq!(termination.rounds, 5);
    }

    #[test]
    fn test_round_cap() {
        let config = AlignerConfig::default().with_max_rounds(3);
        let mut termination = Termination::new(&config);
        assert_eq!(termination.check(1.0), None);
        assert_eq!(termination.check(2.0), None);
        assert_eq!(termination.check(3.0), Some(Stop::RoundCap));
    }

    // ---- End to end ----

    #[test]
    fn test_two_dna_sequences() {
        let mut aligner = Aligner::new(dna_config()).unwrap();
        let result = aligner.align(&["ACTG", "ACTTG"]).unwrap();

        assert!(result.generations <= 50);
        assert_preserves_input(&result, &["ACTG", "ACTTG"]);
        assert!(result.best.width() >= 5);
        assert!(
            result.best_fitness >= trivial_fitness(),
            "best {} below trivial {}",
            result.best_fitness,
            trivial_fitness()
        );
        assert_eq!(result.best_fitness, result.best.fitness());
    }

    #[test]
    fn test_stagnation_end_to_end() {
        let config = dna_config()
            .with_unchanged_rounds_needed(3)
            .without_max_rounds();
        let mut aligner = Aligner::new(config).unwrap();
        let result = aligner.align(&["ACTG", "ACTTG"]).unwrap();
        assert!(result.stagnated);
        assert!(result.generations >= 4);
    }

    #[test]
    fn test_round_cap_end_to_end() {
        let config = dna_config().with_max_rounds(5).with_unchanged_rounds_needed(1000);
        let mut aligner = Aligner::new(config).unwrap();
        let result = aligner.align(&["ACTG", "ACTTG"]).unwrap();
        assert!(!result.stagnated);
        assert_eq!(result.generations, 5);
        // initial population + one entry per generation
        assert_eq!(result.fitness_history.len(), 6);
    }

    #[test]
    fn test_elitism_never_loses_best() {
        let config = dna_config().with_percentage_increase(30.0);
        let mut aligner = Aligner::new(config).unwrap();
        let result = aligner.align(&["ACGTTGCA", "ACGTGCA", "AGTTGCA"]).unwrap();
        for window in result.fitness_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best fitness dropped: {} -> {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_merged_operators() {
        let config = dna_config().with_merge_operators(true);
        let mut aligner = Aligner::new(config).unwrap();
        let input = ["ACGTACGT", "ACGTCGT", "AGTACGT"];
        let result = aligner.align(&input).unwrap();
        assert_preserves_input(&result, &input);
        assert_eq!(result.operator_fitness.len(), 9);
    }

    #[test]
    fn test_two_phase_reports_both_pools() {
        let mut aligner = Aligner::new(dna_config().with_max_rounds(3)).unwrap();
        let result = aligner.align(&["ACTG", "ACTTG"]).unwrap();
        let names: Vec<&str> = result.operator_fitness.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"NoopCrossover"));
        assert!(names.contains(&"GapColumnDeletionMutation"));
    }

    #[test]
    fn test_verify_children_mode() {
        let config = dna_config().with_verify_children(true).with_max_rounds(10);
        let mut aligner = Aligner::new(config).unwrap();
        let result = aligner.align(&["ACTG", "ACTTG", "ATTG"]).unwrap();
        assert_preserves_input(&result, &["ACTG", "ACTTG", "ATTG"]);
    }

    #[test]
    fn test_faulty_children_replaced_by_mother() {
        let alignment = |rows: [&str; 2]| {
            Alignment::from_sequences(
                rows.iter().map(|&r| Sequence::from(r)).collect(),
                Arc::new(DnaScorer),
            )
        };
        let mother = alignment(["ACGT", "ACGT"]);
        let father = alignment(["TGCA", "GTAC"]);
        assert_eq!(mother.fitness(), 4.0);
        assert_eq!(father.fitness(), -4.0);

        for seed in 0..20 {
            let mut operators: Population<Operator> =
                std::iter::once(Operator::from(Crossover::OnePoint(GapPlacement::Middle)))
                    .collect();
            let mut rng = create_rng(seed);
            let children =
                apply_operator(&mut operators, 0, &[&mother, &father], &mut rng, true).unwrap();

            assert_eq!(children.len(), 2);
            for child in &children {
                assert_eq!(child.rows(), mother.rows());
            }
            // children 4 + 4 against parents 4 - 4: delta 8, folded from 0
            let expected = 8.0 / 3.0;
            assert!((operators[0].last_fitness() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_protein_sequences() {
        let config = AlignerConfig::default()
            .with_population_size(8)
            .with_max_rounds(10)
            .with_seed(3);
        let mut aligner = Aligner::new(config).unwrap();
        let input = ["MKTAYIAK", "MKTAYAK", "MKAYIAK"];
        let result = aligner.align(&input).unwrap();
        assert_eq!(aligner.scorer().name(), "blosum62");
        assert_preserves_input(&result, &input);
    }

    #[test]
    fn test_same_seed_same_result() {
        let input = ["ACGTTGCA", "ACGTGCA", "AGTTGCA"];
        let a = Aligner::new(dna_config()).unwrap().align(&input).unwrap();
        let b = Aligner::new(dna_config()).unwrap().align(&input).unwrap();
        assert_eq!(a.best.rows(), b.best.rows());
        assert_eq!(a.generations, b.generations);
    }

    #[test]
    fn test_with_parts() {
        let mut aligner =
            Aligner::with_parts(dna_config(), Arc::new(DnaScorer), create_rng(9)).unwrap();
        let input = vec!["ACTG".to_string(), "ACTTG".to_string()];
        let result = aligner.align(&input[..]).unwrap();
        assert_preserves_input(&result, &["ACTG", "ACTTG"]);
    }

    #[test]
    fn test_population_size_is_preserved() {
        // odd sizes leave one crossover child without a slot
        let config = dna_config().with_population_size(7);
        let mut aligner = Aligner::new(config).unwrap();
        let raw = ["ACTG", "ACTTG"];
        let mut population: Population<Alignment> = (0..7)
            .map(|_| Alignment::stretched(&raw, 5, Arc::new(DnaScorer), &mut aligner.rng))
            .collect();
        for _ in 0..5 {
            let elite = population.best().map(Alignment::duplicate);
            population = aligner.generation(population, elite).unwrap();
            assert_eq!(population.len(), 7);
        }
    }

    // ---- Input validation ----

    #[test]
    fn test_rejects_degenerate_input() {
        let mut aligner = Aligner::new(dna_config()).unwrap();
        assert!(matches!(
            aligner.align(&["ACTG"]),
            Err(AlignError::TooFewSequences(1))
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(
            aligner.align(&empty),
            Err(AlignError::TooFewSequences(0))
        ));
        assert!(matches!(
            aligner.align(&["ACTG", ""]),
            Err(AlignError::EmptySequence(1))
        ));
        assert!(matches!(
            aligner.align(&["ACTG", "AC\u{e9}TG", "ACG"]),
            Err(AlignError::NonAsciiSequence(1))
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = dna_config().with_population_size(1);
        assert!(matches!(
            Aligner::new(config),
            Err(AlignError::InvalidConfig(_))
        ));
    }
}
