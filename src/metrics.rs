//! Corpus-level efficiency metrics for trained tokenizers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DbpeError, Result};
use crate::subword::SubwordTokenizer;

/// Characters-per-token summary of a tokenizer over a corpus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompressionReport {
    /// Total characters across all corpus lines.
    pub total_chars: u64,
    /// Total tokens produced by encoding each line independently.
    pub total_tokens: u64,
    /// `total_chars / total_tokens`.
    pub ratio: f64,
    /// Acceptance floor the ratio is judged against.
    pub floor: f64,
}

impl CompressionReport {
    /// Returns `true` when the ratio meets the acceptance floor.
    #[must_use]
    pub fn meets_floor(&self) -> bool {
        self.ratio >= self.floor
    }
}

/// Computes the compression ratio of `tokenizer` over the corpus at `corpus`.
///
/// Each line is encoded independently; character counts exclude the newline
/// separators. A corpus that encodes to zero tokens has no defined ratio and
/// is rejected.
pub fn evaluate_compression<T: SubwordTokenizer>(
    tokenizer: &T,
    corpus: &Path,
    floor: f64,
) -> Result<CompressionReport> {
    let file = File::open(corpus).map_err(|err| DbpeError::io(err, Some(corpus.to_path_buf())))?;
    let reader = BufReader::new(file);

    let mut total_chars = 0u64;
    let mut total_tokens = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|err| DbpeError::io(err, Some(corpus.to_path_buf())))?;
        total_chars += line.chars().count() as u64;
        total_tokens += tokenizer.encode(&line)?.tokens.len() as u64;
    }
    if total_tokens == 0 {
        return Err(DbpeError::InvalidConfig(
            "corpus encoded to zero tokens; compression ratio is undefined".into(),
        ));
    }

    Ok(CompressionReport {
        total_chars,
        total_tokens,
        ratio: total_chars as f64 / total_tokens as f64,
        floor,
    })
}
