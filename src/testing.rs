//! Stand-in tokenizer used by unit tests to exercise orchestration without
//! touching the real trainer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::TrainerConfig;
use crate::error::{DbpeError, Result};
use crate::subword::{Encoding, SubwordTokenizer};

/// Whitespace tokenizer with an insertion-ordered vocabulary.
#[derive(Debug, Default, Clone)]
pub(crate) struct WordTokenizer {
    vocab: Vec<String>,
}

impl WordTokenizer {
    fn id_of(&self, word: &str) -> Option<u32> {
        self.vocab.iter().position(|w| w == word).map(|idx| idx as u32)
    }
}

impl SubwordTokenizer for WordTokenizer {
    fn train(corpus: &[PathBuf], _cfg: &TrainerConfig) -> Result<Self> {
        let mut vocab = Vec::new();
        for path in corpus {
            let text =
                fs::read_to_string(path).map_err(|err| DbpeError::io(err, Some(path.clone())))?;
            for word in text.split_whitespace() {
                if !vocab.iter().any(|w| w == word) {
                    vocab.push(word.to_string());
                }
            }
        }
        Ok(Self { vocab })
    }

    fn load(config_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(config_path)
            .map_err(|err| DbpeError::io(err, Some(config_path.to_path_buf())))?;
        let vocab: Vec<String> = serde_json::from_str(&text)?;
        Ok(Self { vocab })
    }

    fn save_model(&self, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        let vocab_path = dir.join(format!("{prefix}-vocab.json"));
        let merges_path = dir.join(format!("{prefix}-merges.txt"));
        let indexed: BTreeMap<&str, u32> = self
            .vocab
            .iter()
            .enumerate()
            .map(|(idx, word)| (word.as_str(), idx as u32))
            .collect();
        fs::write(&vocab_path, serde_json::to_string(&indexed)?)
            .map_err(|err| DbpeError::io(err, Some(vocab_path.clone())))?;
        fs::write(&merges_path, "")
            .map_err(|err| DbpeError::io(err, Some(merges_path.clone())))?;
        Ok(vec![vocab_path, merges_path])
    }

    fn save_config(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(&self.vocab)?)
            .map_err(|err| DbpeError::io(err, Some(path.to_path_buf())))
    }

    fn encode(&self, text: &str) -> Result<Encoding> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let ids = tokens
            .iter()
            .map(|word| self.id_of(word).unwrap_or(u32::MAX))
            .collect();
        Ok(Encoding { ids, tokens })
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let words: Vec<&str> = ids
            .iter()
            .filter_map(|&id| self.vocab.get(id as usize).map(String::as_str))
            .collect();
        Ok(words.join(" "))
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}
