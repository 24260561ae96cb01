//! u-msa CLI - align sequences from a plain or FASTA file.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use u_msa::ga::{Aligner, AlignerConfig};
use u_msa::input::read_sequences;
use u_msa::scoring::ScorerKind;

/// Multiple sequence alignment by a self-tuning genetic algorithm
#[derive(Parser, Debug)]
#[command(name = "u-msa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file: one sequence per line, or FASTA
    input: PathBuf,

    /// TOML configuration file (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scorer: dna or protein
    #[arg(short, long)]
    scorer: Option<ScorerKind>,

    /// Number of alignments in the population
    #[arg(short = 'n', long)]
    population_size: Option<usize>,

    /// Extra alignment width as a percentage of the longest sequence
    #[arg(short, long)]
    percentage_increase: Option<f64>,

    /// Rounds without improvement before stopping
    #[arg(short, long)]
    unchanged_rounds: Option<usize>,

    /// Maximum number of rounds (0 disables the cap)
    #[arg(short, long)]
    max_rounds: Option<usize>,

    /// Draw crossovers and mutations from one pool
    #[arg(long)]
    merge_operators: bool,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Check every child against its parent
    #[arg(long)]
    verify: bool,
}

impl Cli {
    fn build_config(&self) -> Result<AlignerConfig> {
        let mut config = match &self.config {
            Some(path) => AlignerConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AlignerConfig::default(),
        };

        if let Some(scorer) = self.scorer {
            config = config.with_scorer(scorer);
        }
        if let Some(n) = self.population_size {
            config = config.with_population_size(n);
        }
        if let Some(p) = self.percentage_increase {
            config = config.with_percentage_increase(p);
        }
        if let Some(n) = self.unchanged_rounds {
            config = config.with_unchanged_rounds_needed(n);
        }
        if let Some(n) = self.max_rounds {
            config = config.with_max_rounds(n);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.merge_operators {
            config = config.with_merge_operators(true);
        }
        if self.verify {
            config = config.with_verify_children(true);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.build_config()?;

    let sequences = read_sequences(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let mut aligner = Aligner::new(config)?;
    let result = aligner.align(&sequences)?;

    for row in result.best.rows() {
        println!("{row}");
    }
    println!("Fitness: {}", result.best_fitness);
    println!("Generations: {}", result.generations);

    Ok(())
}
