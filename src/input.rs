//! Reading raw sequences from text.
//!
//! Two layouts are accepted:
//!
//! - FASTA (first non-blank line starts with `>`): one sequence per record,
//!   multi-line records joined
//! - plain: one sequence per non-blank line
//!
//! Surrounding whitespace is stripped in both cases.

use crate::error::Result;
use bio::io::fasta;
use log::debug;
use std::path::Path;

/// Parses sequences from the contents of an input file.
pub fn parse_sequences(text: &str) -> Result<Vec<String>> {
    let is_fasta = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim_start().starts_with('>'));

    let sequences = if is_fasta {
        parse_fasta(text)?
    } else {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    };
    debug!(
        "Read {} sequences ({} input)",
        sequences.len(),
        if is_fasta { "FASTA" } else { "plain" }
    );
    Ok(sequences)
}

fn parse_fasta(text: &str) -> Result<Vec<String>> {
    let mut sequences = Vec::new();
    for record in fasta::Reader::new(text.trim_start().as_bytes()).records() {
        let record = record?;
        let seq = String::from_utf8_lossy(record.seq());
        sequences.push(seq.split_whitespace().collect());
    }
    Ok(sequences)
}

/// Reads and parses a sequence file.
pub fn read_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    parse_sequences(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines() {
        let text = "ACTG\n\n  ACTTG  \nATTG\n";
        assert_eq!(parse_sequences(text).unwrap(), vec!["ACTG", "ACTTG", "ATTG"]);
    }

    #[test]
    fn test_fasta_records() {
        let text = "\n>seq1 first\nACT\nG\n>seq2\nACTTG\n";
        assert_eq!(parse_sequences(text).unwrap(), vec!["ACTG", "ACTTG"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_sequences("").unwrap().is_empty());
        assert!(parse_sequences("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        assert!(read_sequences("/nonexistent/input.fa").is_err());
    }
}
