//! End-to-end orchestration: fetch, sample, normalize, train, persist, evaluate.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{DbpeError, Result};
use crate::fetch::{self, FetchOutcome, FetchProgress};
use crate::metrics::{self, CompressionReport};
use crate::normalize;
use crate::sample;
use crate::subword::SubwordTokenizer;

/// Input, ids, tokens, and decoded output of the post-training smoke test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    /// Normalized form of the configured smoke sentence.
    pub input: String,
    /// Ids produced by encoding `input`.
    pub ids: Vec<u32>,
    /// Token strings aligned with `ids`.
    pub tokens: Vec<String>,
    /// Result of decoding `ids`, reported for manual inspection.
    pub decoded: String,
}

/// Everything produced by a completed pipeline run.
#[derive(Debug)]
pub struct PipelineArtifacts<T> {
    /// The trained tokenizer.
    pub tokenizer: T,
    /// Location of the normalized corpus.
    pub preprocessed_path: PathBuf,
    /// Vocabulary and merges files written by the tokenizer.
    pub model_paths: Vec<PathBuf>,
    /// Location of the full encoder configuration.
    pub encoder_path: PathBuf,
    /// Compression verdict over the normalized corpus.
    pub compression: CompressionReport,
    /// Smoke-test transcript, when configured.
    pub round_trip: Option<RoundTrip>,
}

/// Sequential driver for the fetch → sample → normalize → train → persist →
/// evaluate workflow.
///
/// Stages run strictly in order and the first failure aborts the run; partial
/// downloads are the only state intentionally left behind for reuse.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    cfg: PipelineConfig,
}

impl TrainingPipeline {
    /// Creates a pipeline for the supplied configuration.
    #[must_use]
    pub fn new(cfg: PipelineConfig) -> Self {
        Self { cfg }
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Runs every stage, reporting download progress through the `log` facade only.
    pub fn run<T: SubwordTokenizer>(&self) -> Result<PipelineArtifacts<T>> {
        self.run_with_progress(|_| {})
    }

    /// Runs every stage, forwarding download progress to `on_progress`.
    pub fn run_with_progress<T, F>(&self, on_progress: F) -> Result<PipelineArtifacts<T>>
    where
        T: SubwordTokenizer,
        F: FnMut(FetchProgress),
    {
        let cfg = &self.cfg;
        cfg.validate()?;

        fs::create_dir_all(&cfg.output_dir)
            .map_err(|err| DbpeError::io(err, Some(cfg.output_dir.clone())))?;

        self.ensure_raw_corpus(on_progress)?;

        info!("sampling corpus from {}", cfg.raw_corpus.display());
        let sampled = sample::sample_lines(&cfg.raw_corpus, &cfg.sample)?;
        info!("normalizing {} lines", sampled.len());
        let normalized = normalize::normalize_lines(&sampled);

        let preprocessed_path = cfg.preprocessed_path();
        fs::write(&preprocessed_path, normalized.join("\n"))
            .map_err(|err| DbpeError::io(err, Some(preprocessed_path.clone())))?;
        info!("wrote preprocessed corpus to {}", preprocessed_path.display());

        info!(
            "training tokenizer (vocab {}, min frequency {})",
            cfg.trainer.vocab_size, cfg.trainer.min_frequency
        );
        let tokenizer = T::train(std::slice::from_ref(&preprocessed_path), &cfg.trainer)?;

        let model_paths = tokenizer.save_model(&cfg.output_dir, &cfg.model_prefix)?;
        let encoder_path = cfg.encoder_path();
        tokenizer.save_config(&encoder_path)?;
        info!("saved tokenizer artifacts under {}", cfg.output_dir.display());

        let compression =
            metrics::evaluate_compression(&tokenizer, &preprocessed_path, cfg.compression_floor)?;
        if compression.meets_floor() {
            info!(
                "compression ratio {:.2} meets the {:.1} floor",
                compression.ratio, compression.floor
            );
        } else {
            warn!(
                "compression ratio {:.2} is below the {:.1} floor",
                compression.ratio, compression.floor
            );
        }

        let round_trip = match &cfg.smoke_sentence {
            Some(sentence) => Some(round_trip(&tokenizer, sentence)?),
            None => None,
        };

        Ok(PipelineArtifacts {
            tokenizer,
            preprocessed_path,
            model_paths,
            encoder_path,
            compression,
            round_trip,
        })
    }

    /// Makes the raw corpus available, downloading when a URL is configured.
    fn ensure_raw_corpus<F: FnMut(FetchProgress)>(&self, on_progress: F) -> Result<()> {
        let cfg = &self.cfg;
        match &cfg.corpus_url {
            Some(url) => {
                match fetch::fetch_corpus(url, &cfg.raw_corpus, &cfg.fetch, on_progress)? {
                    FetchOutcome::AlreadyComplete => {
                        info!(
                            "raw corpus {} already satisfies the byte ceiling",
                            cfg.raw_corpus.display()
                        );
                    }
                    FetchOutcome::Fetched { appended } => {
                        info!("downloaded {appended} bytes of raw corpus");
                    }
                }
                Ok(())
            }
            None if cfg.raw_corpus.is_file() => Ok(()),
            None => Err(DbpeError::MissingInput {
                path: cfg.raw_corpus.clone(),
            }),
        }
    }
}

fn round_trip<T: SubwordTokenizer>(tokenizer: &T, sentence: &str) -> Result<RoundTrip> {
    let input = normalize::normalize_line(sentence);
    let encoding = tokenizer.encode(&input)?;
    let decoded = tokenizer.decode(&encoding.ids)?;
    info!(
        "round trip: {input:?} -> {} tokens -> {decoded:?}",
        encoding.ids.len()
    );
    Ok(RoundTrip {
        input,
        ids: encoding.ids,
        tokens: encoding.tokens,
        decoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WordTokenizer;
    use std::fs;
    use tempfile::tempdir;

    fn base_config(dir: &std::path::Path) -> PipelineConfig {
        PipelineConfig::builder()
            .raw_corpus(dir.join("raw.txt"))
            .output_dir(dir.join("out"))
            .show_progress(false)
            .build()
            .expect("valid config")
    }

    #[test]
    fn run_produces_all_artifacts() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("raw.txt"),
            "नमस्ते भारत।\n\nयह 42 एक परीक्षण वाक्य है।\n",
        )
        .expect("write raw corpus");

        let cfg = base_config(dir.path());
        let artifacts = TrainingPipeline::new(cfg.clone())
            .run::<WordTokenizer>()
            .expect("pipeline succeeds");

        let preprocessed =
            fs::read_to_string(&artifacts.preprocessed_path).expect("read preprocessed");
        assert_eq!(preprocessed, "नमस्ते भारत.\nयह एक परीक्षण वाक्य है.");
        assert!(artifacts.encoder_path.exists());
        assert_eq!(artifacts.model_paths.len(), 2);
        for path in &artifacts.model_paths {
            assert!(path.exists());
        }
        assert!(artifacts.compression.total_tokens > 0);

        let trip = artifacts.round_trip.expect("smoke test ran");
        assert_eq!(trip.input, "नमस्ते भारत! यह एक परीक्षण वाक्य है.");
        assert_eq!(trip.ids.len(), trip.tokens.len());
    }

    #[test]
    fn blank_normalized_lines_are_preserved() {
        let dir = tempdir().expect("tempdir");
        // The second line normalizes to an empty string but must stay in place.
        fs::write(dir.path().join("raw.txt"), "नमस्ते\nhello 123\nभारत\n")
            .expect("write raw corpus");

        let cfg = base_config(dir.path());
        let artifacts = TrainingPipeline::new(cfg)
            .run::<WordTokenizer>()
            .expect("pipeline succeeds");

        let preprocessed =
            fs::read_to_string(&artifacts.preprocessed_path).expect("read preprocessed");
        assert_eq!(preprocessed, "नमस्ते\n\nभारत");
    }

    #[test]
    fn missing_corpus_without_url_is_fatal() {
        let dir = tempdir().expect("tempdir");
        let cfg = base_config(dir.path());
        let err = TrainingPipeline::new(cfg)
            .run::<WordTokenizer>()
            .expect_err("pipeline should fail");
        assert!(matches!(err, DbpeError::MissingInput { .. }));
    }

    #[test]
    fn smoke_test_can_be_disabled() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("raw.txt"), "नमस्ते भारत\n").expect("write raw corpus");

        let cfg = PipelineConfig {
            smoke_sentence: None,
            ..base_config(dir.path())
        };
        let artifacts = TrainingPipeline::new(cfg)
            .run::<WordTokenizer>()
            .expect("pipeline succeeds");
        assert!(artifacts.round_trip.is_none());
    }

    #[test]
    fn sampling_limits_apply_before_normalization() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("raw.txt"), "एक\nदो\nतीन\nचार\n")
            .expect("write raw corpus");

        let mut cfg = base_config(dir.path());
        cfg.sample.sample_size = Some(2);
        let artifacts = TrainingPipeline::new(cfg)
            .run::<WordTokenizer>()
            .expect("pipeline succeeds");

        let preprocessed =
            fs::read_to_string(&artifacts.preprocessed_path).expect("read preprocessed");
        assert_eq!(preprocessed, "एक\nदो");
    }
}
