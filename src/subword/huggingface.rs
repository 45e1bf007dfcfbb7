//! `tokenizers`-backed implementation of the subword interface.
//!
//! Mirrors the original training setup: a BPE model with a whitespace
//! pre-tokenizer, trained with reserved control tokens and a minimum merge
//! frequency.

use std::path::{Path, PathBuf};

use log::info;
use tokenizers::models::bpe::{BpeTrainer, BPE};
use tokenizers::models::{ModelWrapper, TrainerWrapper};
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::tokenizer::AddedToken;
use tokenizers::{Model, Tokenizer};

use crate::config::TrainerConfig;
use crate::error::{DbpeError, Result};
use crate::subword::{Encoding, SubwordTokenizer};

/// A trained Hugging Face BPE tokenizer.
#[derive(Debug)]
pub struct HuggingFaceBpe {
    inner: Tokenizer,
}

impl HuggingFaceBpe {
    /// Provides immutable access to the underlying tokenizer.
    #[must_use]
    pub fn inner(&self) -> &Tokenizer {
        &self.inner
    }
}

impl SubwordTokenizer for HuggingFaceBpe {
    fn train(corpus: &[PathBuf], cfg: &TrainerConfig) -> Result<Self> {
        cfg.validate()?;
        if corpus.is_empty() {
            return Err(DbpeError::InvalidConfig(
                "training requires at least one corpus file".into(),
            ));
        }

        let mut tokenizer = Tokenizer::new(BPE::default());
        tokenizer.with_pre_tokenizer(Some(Whitespace {}));

        let special_tokens: Vec<AddedToken> = cfg
            .special_tokens
            .iter()
            .cloned()
            .map(|token| AddedToken::from(token, true))
            .collect();
        let mut trainer: TrainerWrapper = BpeTrainer::builder()
            .vocab_size(cfg.vocab_size)
            .min_frequency(cfg.min_frequency.into())
            .special_tokens(special_tokens)
            .show_progress(cfg.show_progress)
            .build()
            .into();

        let files = corpus
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        tokenizer
            .train_from_files(&mut trainer, files)
            .map_err(|err| DbpeError::Tokenizers(err.to_string()))?;

        info!(
            "trained BPE tokenizer with vocab {}",
            tokenizer.get_vocab_size(true)
        );
        Ok(Self { inner: tokenizer })
    }

    fn load(config_path: &Path) -> Result<Self> {
        let inner = Tokenizer::from_file(config_path)
            .map_err(|err| DbpeError::Tokenizers(err.to_string()))?;
        Ok(Self { inner })
    }

    fn save_model(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        match self.inner.get_model() {
            ModelWrapper::BPE(bpe) => bpe
                .save(dir, Some(prefix))
                .map_err(|err| DbpeError::Tokenizers(err.to_string())),
            _ => Err(DbpeError::Tokenizers(
                "only BPE models can be saved as vocab/merges files".into(),
            )),
        }
    }

    fn save_config(&self, path: &Path) -> Result<()> {
        self.inner
            .save(path, true)
            .map_err(|err| DbpeError::Tokenizers(err.to_string()))
    }

    fn encode(&self, text: &str) -> Result<Encoding> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|err| DbpeError::Tokenizers(err.to_string()))?;
        Ok(Encoding {
            ids: encoding.get_ids().to_vec(),
            tokens: encoding.get_tokens().to_vec(),
        })
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|err| DbpeError::Tokenizers(err.to_string()))
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn training_corpus(dir: &Path) -> PathBuf {
        let path = dir.join("corpus.txt");
        let line = "नमस्ते भारत यह एक परीक्षण वाक्य है";
        let body = std::iter::repeat(line)
            .take(50)
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&path, body).expect("write corpus");
        path
    }

    fn small_config() -> TrainerConfig {
        TrainerConfig {
            vocab_size: 200,
            min_frequency: 1,
            show_progress: false,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn train_encode_decode_round_trip() {
        let dir = tempdir().expect("tempdir");
        let corpus = training_corpus(dir.path());
        let tokenizer =
            HuggingFaceBpe::train(&[corpus], &small_config()).expect("training succeeds");

        assert!(tokenizer.vocab_size() > 4, "vocab holds more than specials");
        let encoding = tokenizer.encode("नमस्ते भारत").expect("encode");
        assert!(!encoding.ids.is_empty());
        assert_eq!(encoding.ids.len(), encoding.tokens.len());

        let decoded = tokenizer.decode(&encoding.ids).expect("decode");
        assert!(decoded.contains("नमस्ते"));
    }

    #[test]
    fn saved_config_reloads() {
        let dir = tempdir().expect("tempdir");
        let corpus = training_corpus(dir.path());
        let tokenizer =
            HuggingFaceBpe::train(&[corpus], &small_config()).expect("training succeeds");

        let config_path = dir.path().join("encoder.json");
        tokenizer.save_config(&config_path).expect("save config");
        let restored = HuggingFaceBpe::load(&config_path).expect("reload");
        assert_eq!(restored.vocab_size(), tokenizer.vocab_size());

        let original = tokenizer.encode("परीक्षण वाक्य").expect("encode");
        let reloaded = restored.encode("परीक्षण वाक्य").expect("encode");
        assert_eq!(original.ids, reloaded.ids);
    }

    #[test]
    fn save_model_writes_vocab_and_merges() {
        let dir = tempdir().expect("tempdir");
        let corpus = training_corpus(dir.path());
        let tokenizer =
            HuggingFaceBpe::train(&[corpus], &small_config()).expect("training succeeds");

        let written = tokenizer
            .save_model(dir.path(), "hindi_vocab")
            .expect("save model");
        assert_eq!(written.len(), 2);
        for path in &written {
            assert!(path.exists(), "{} exists", path.display());
            let name = path.file_name().expect("file name").to_string_lossy();
            assert!(name.starts_with("hindi_vocab"), "prefixed name: {name}");
        }
    }

    #[test]
    fn empty_corpus_list_is_rejected() {
        let err = HuggingFaceBpe::train(&[], &small_config()).expect_err("should fail");
        assert!(matches!(err, DbpeError::InvalidConfig(_)));
    }
}
