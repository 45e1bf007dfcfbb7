//! Narrow interface to the external subword tokenizer.
//!
//! The pipeline only depends on [`SubwordTokenizer`], so the orchestration can
//! be exercised with a stand-in implementation while production runs use the
//! Hugging Face `tokenizers` crate via [`HuggingFaceBpe`].

pub mod huggingface;

pub use huggingface::HuggingFaceBpe;

use std::path::{Path, PathBuf};

use crate::config::TrainerConfig;
use crate::error::Result;

/// Token ids and their surface forms produced by encoding one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Vocabulary ids in order of appearance.
    pub ids: Vec<u32>,
    /// Token strings aligned with `ids`.
    pub tokens: Vec<String>,
}

/// Capabilities the pipeline requires from a subword tokenizer implementation.
///
/// The merge-learning algorithm behind `train` is deliberately opaque; only
/// the train/save/load/encode/decode contract is relied upon.
pub trait SubwordTokenizer: Sized {
    /// Trains a tokenizer over the given corpus files.
    fn train(corpus: &[PathBuf], cfg: &TrainerConfig) -> Result<Self>;

    /// Restores a tokenizer from a previously saved encoder configuration.
    fn load(config_path: &Path) -> Result<Self>;

    /// Writes the vocabulary and merge rules under `dir`, using `prefix` for
    /// the file names, and returns the paths written.
    fn save_model(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>>;

    /// Writes the full self-describing encoder configuration to `path`.
    fn save_config(&self, path: &Path) -> Result<()>;

    /// Encodes one line of text.
    fn encode(&self, text: &str) -> Result<Encoding>;

    /// Decodes token ids back into text.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Total vocabulary size including special tokens.
    fn vocab_size(&self) -> usize;
}
