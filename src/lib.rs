//! Devanagari byte pair encoding (BPE) training pipeline and CLI.
//!
//! The crate exposes both a library API and a `dbpe` command line interface
//! for turning a raw Hindi corpus into a trained subword tokenizer.  A run
//! fetches the corpus over HTTP with resume and a byte ceiling, samples and
//! normalizes it, delegates BPE training to the Hugging Face `tokenizers`
//! crate, persists the vocabulary and encoder configuration, and reports a
//! characters-per-token compression ratio.
//!
//! ```no_run
//! use dbpe::{HuggingFaceBpe, PipelineConfig, TrainingPipeline};
//!
//! # fn main() -> dbpe::Result<()> {
//! let cfg = PipelineConfig::builder()
//!     .corpus_url("https://example.org/hindi/corpus.txt")
//!     .raw_corpus("raw_hindi_dataset.txt")
//!     .output_dir("output")
//!     .vocab_size(4500)
//!     .build()?;
//! let artifacts = TrainingPipeline::new(cfg).run::<HuggingFaceBpe>()?;
//! println!("compression ratio: {:.2}", artifacts.compression.ratio);
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature.  Users targeting
//! the library portion only can disable default features to avoid the CLI
//! dependencies: `dbpe = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::multiple_crate_versions
)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod sample;
pub mod subword;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{FetchConfig, PipelineBuilder, PipelineConfig, SampleConfig, TrainerConfig};
pub use error::{DbpeError, Result};
pub use fetch::{FetchOutcome, FetchProgress};
pub use metrics::CompressionReport;
pub use pipeline::{PipelineArtifacts, RoundTrip, TrainingPipeline};
pub use subword::{Encoding, HuggingFaceBpe, SubwordTokenizer};
