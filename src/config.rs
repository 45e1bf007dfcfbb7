//! Configuration types controlling corpus fetching, sampling, training, and orchestration.
//!
//! Every value the original workflow kept as an ambient constant (URL, paths,
//! vocabulary ceiling, compression floor) is an explicit field here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DbpeError, Result};

/// Default location of the raw corpus file.
pub const DEFAULT_RAW_CORPUS: &str = "raw_hindi_dataset.txt";
/// Default directory receiving the preprocessed corpus and tokenizer artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// File name of the normalized corpus written under the output directory.
pub const PREPROCESSED_FILE: &str = "preprocessed_hindi.txt";
/// Default prefix for the vocabulary/merges files.
pub const DEFAULT_MODEL_PREFIX: &str = "hindi_vocab";
/// Default file name of the full encoder configuration.
pub const DEFAULT_ENCODER_FILE: &str = "hindi_encoder.json";
/// Default download ceiling in bytes (100 MiB).
pub const DEFAULT_MAX_CORPUS_BYTES: u64 = 100 * 1024 * 1024;
/// Sentence used by the post-training encode/decode smoke test.
pub const DEFAULT_SMOKE_SENTENCE: &str = "नमस्ते भारत! यह एक परीक्षण वाक्य है।";

/// Configuration controlling how the raw corpus is transferred from its URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchConfig {
    /// Byte ceiling for the destination file; the stream is closed once reached.
    pub max_bytes: u64,
    /// Size of the read buffer used while streaming the response body.
    pub chunk_size: usize,
    /// Per-request timeout handed to the HTTP client, in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_CORPUS_BYTES,
            chunk_size: 64 * 1024,
            timeout_secs: 60,
        }
    }
}

/// Limits applied while sampling lines from the raw corpus.
///
/// `None` means unbounded for either limit; with both unset every non-empty
/// line of the source is returned.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleConfig {
    /// Maximum number of non-empty lines to collect.
    pub sample_size: Option<usize>,
    /// Maximum number of source lines to scan, counting blank lines.
    pub max_lines: Option<usize>,
}

/// Configuration forwarded to the external BPE trainer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Target vocabulary size including special tokens.
    pub vocab_size: usize,
    /// Minimum number of pair occurrences required before a merge is learned.
    pub min_frequency: u32,
    /// Reserved control tokens guaranteed a slot in the vocabulary.
    pub special_tokens: Vec<String>,
    /// Enables the trainer's own progress output.
    pub show_progress: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            // Kept below the 5000 vocabulary ceiling.
            vocab_size: 4500,
            min_frequency: 2,
            special_tokens: vec![
                "<pad>".into(),
                "<unk>".into(),
                "<s>".into(),
                "</s>".into(),
            ],
            show_progress: true,
        }
    }
}

impl TrainerConfig {
    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size <= self.special_tokens.len() {
            return Err(DbpeError::InvalidConfig(format!(
                "vocab_size ({}) must exceed the number of special tokens ({})",
                self.vocab_size,
                self.special_tokens.len()
            )));
        }
        if self.min_frequency == 0 {
            return Err(DbpeError::InvalidConfig(
                "min_frequency must be greater than zero".into(),
            ));
        }
        if self.special_tokens.iter().any(String::is_empty) {
            return Err(DbpeError::InvalidConfig(
                "special tokens must not be empty strings".into(),
            ));
        }
        Ok(())
    }
}

/// Fully resolved settings for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Local path of the raw corpus (download destination when a URL is set).
    pub raw_corpus: PathBuf,
    /// Optional source URL for the raw corpus.
    pub corpus_url: Option<String>,
    /// Directory receiving all produced artifacts.
    pub output_dir: PathBuf,
    /// File-name prefix for the vocabulary/merges files.
    pub model_prefix: String,
    /// File name of the full encoder configuration inside `output_dir`.
    pub encoder_file: String,
    /// Transfer settings used when `corpus_url` is set.
    pub fetch: FetchConfig,
    /// Line-sampling limits applied to the raw corpus.
    pub sample: SampleConfig,
    /// Settings forwarded to the external BPE trainer.
    pub trainer: TrainerConfig,
    /// Compression ratio below which the run is reported as a warning.
    pub compression_floor: f64,
    /// Sentence round-tripped through the tokenizer after training; `None` skips the check.
    pub smoke_sentence: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_corpus: PathBuf::from(DEFAULT_RAW_CORPUS),
            corpus_url: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model_prefix: DEFAULT_MODEL_PREFIX.into(),
            encoder_file: DEFAULT_ENCODER_FILE.into(),
            fetch: FetchConfig::default(),
            sample: SampleConfig::default(),
            trainer: TrainerConfig::default(),
            compression_floor: 3.2,
            smoke_sentence: Some(DEFAULT_SMOKE_SENTENCE.into()),
        }
    }
}

impl PipelineConfig {
    /// Returns a builder initialised with [`PipelineConfig::default`].
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Location of the normalized corpus written during the run.
    #[must_use]
    pub fn preprocessed_path(&self) -> PathBuf {
        self.output_dir.join(PREPROCESSED_FILE)
    }

    /// Location of the full encoder configuration written during the run.
    #[must_use]
    pub fn encoder_path(&self) -> PathBuf {
        self.output_dir.join(&self.encoder_file)
    }

    /// Validates the invariants required for a run.
    pub fn validate(&self) -> Result<()> {
        self.trainer.validate()?;
        if self.model_prefix.is_empty() {
            return Err(DbpeError::InvalidConfig(
                "model_prefix must not be empty".into(),
            ));
        }
        if self.encoder_file.is_empty() {
            return Err(DbpeError::InvalidConfig(
                "encoder_file must not be empty".into(),
            ));
        }
        if self.fetch.max_bytes == 0 {
            return Err(DbpeError::InvalidConfig(
                "fetch.max_bytes must be greater than zero".into(),
            ));
        }
        if self.fetch.chunk_size == 0 {
            return Err(DbpeError::InvalidConfig(
                "fetch.chunk_size must be greater than zero".into(),
            ));
        }
        if self.sample.sample_size == Some(0) || self.sample.max_lines == Some(0) {
            return Err(DbpeError::InvalidConfig(
                "sampling limits must be greater than zero when set".into(),
            ));
        }
        if !self.compression_floor.is_finite() || self.compression_floor <= 0.0 {
            return Err(DbpeError::InvalidConfig(format!(
                "compression_floor ({}) must be a positive finite number",
                self.compression_floor
            )));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default, Clone)]
pub struct PipelineBuilder {
    cfg: PipelineConfig,
}

impl PipelineBuilder {
    /// Creates a builder with [`PipelineConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local raw corpus path.
    #[must_use]
    pub fn raw_corpus(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.raw_corpus = path.into();
        self
    }

    /// Sets the corpus download URL.
    #[must_use]
    pub fn corpus_url(mut self, url: impl Into<String>) -> Self {
        self.cfg.corpus_url = Some(url.into());
        self
    }

    /// Sets the artifact output directory.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.output_dir = dir.into();
        self
    }

    /// Overrides the vocabulary/merges file prefix.
    #[must_use]
    pub fn model_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cfg.model_prefix = prefix.into();
        self
    }

    /// Overrides the encoder configuration file name.
    #[must_use]
    pub fn encoder_file(mut self, name: impl Into<String>) -> Self {
        self.cfg.encoder_file = name.into();
        self
    }

    /// Sets the download byte ceiling.
    #[must_use]
    pub fn max_corpus_bytes(mut self, bytes: u64) -> Self {
        self.cfg.fetch.max_bytes = bytes;
        self
    }

    /// Replaces the transfer settings wholesale.
    #[must_use]
    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.cfg.fetch = fetch;
        self
    }

    /// Sets the maximum number of sampled lines.
    #[must_use]
    pub fn sample_size(mut self, limit: Option<usize>) -> Self {
        self.cfg.sample.sample_size = limit;
        self
    }

    /// Sets the maximum number of source lines scanned while sampling.
    #[must_use]
    pub fn max_lines(mut self, limit: Option<usize>) -> Self {
        self.cfg.sample.max_lines = limit;
        self
    }

    /// Sets the target vocabulary size.
    #[must_use]
    pub fn vocab_size(mut self, value: usize) -> Self {
        self.cfg.trainer.vocab_size = value;
        self
    }

    /// Sets the minimum merge frequency.
    #[must_use]
    pub fn min_frequency(mut self, value: u32) -> Self {
        self.cfg.trainer.min_frequency = value;
        self
    }

    /// Overrides the reserved control tokens.
    #[must_use]
    pub fn special_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.trainer.special_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables the trainer's progress output.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.trainer.show_progress = enabled;
        self
    }

    /// Sets the compression ratio acceptance floor.
    #[must_use]
    pub fn compression_floor(mut self, floor: f64) -> Self {
        self.cfg.compression_floor = floor;
        self
    }

    /// Sets the smoke-test sentence; `None` disables the round trip.
    #[must_use]
    pub fn smoke_sentence(mut self, sentence: Option<String>) -> Self {
        self.cfg.smoke_sentence = sentence;
        self
    }

    /// Finalises the builder, returning a validated [`PipelineConfig`].
    pub fn build(mut self) -> Result<PipelineConfig> {
        dedup_in_place(&mut self.cfg.trainer.special_tokens);
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Deduplicates tokens in-place while preserving the first occurrence ordering.
fn dedup_in_place(tokens: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(tokens.len());
    tokens.retain(|token| seen.insert(token.clone()));
}
