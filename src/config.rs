use serde::Deserialize;
use std::fs;

use crate::error::ModelError;

/// Attention scoring modes.  Only the bilinear "general" form is
/// implemented; the enum is closed on purpose, there is no extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    General,
}

impl ScoreMode {
    /// Parse a score mode name, failing fast on anything unsupported.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "general" => Ok(ScoreMode::General),
            other => Err(ModelError::UnsupportedScoreMode(other.to_string())),
        }
    }
}

fn default_score_mode() -> ScoreMode {
    ScoreMode::General
}

/// Model configuration loaded from a TOML or JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyRnnConfig {
    /// Number of entries in the fixed vocabulary, PAD and UNK included.
    pub vocab_size: usize,
    /// Dimension of the shared embedding table.
    pub embed_size: usize,
    /// Hidden size of the encoder LSTM.
    pub src_hidden_size: usize,
    /// Hidden size of the decoder LSTM.
    pub target_hidden_size: usize,
    /// Uniform padded length of source batches.
    pub max_src_len: usize,
    /// Number of per-batch OOV slots appended to the vocabulary.
    pub max_oov_count: usize,
    /// Dropout rate applied to embedded source tokens in training mode.
    #[serde(default)]
    pub dropout: f32,
    #[serde(default = "default_score_mode")]
    pub score_mode: ScoreMode,
    /// Token id reserved for padding.
    #[serde(default)]
    pub pad_id: usize,
}

impl CopyRnnConfig {
    /// Load configuration from the given path.  Supports TOML or JSON based
    /// on the file extension. Returns `None` if parsing fails.
    pub fn from_path(path: &str) -> Option<Self> {
        let Ok(content) = fs::read_to_string(path) else {
            return None;
        };
        if path.ends_with(".json") {
            serde_json::from_str(&content).ok()
        } else {
            toml::from_str(&content).ok()
        }
    }

    /// Check construction-time invariants.  Model construction aborts on the
    /// first violation.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.vocab_size == 0
            || self.embed_size == 0
            || self.src_hidden_size == 0
            || self.target_hidden_size == 0
            || self.max_src_len == 0
        {
            return Err(ModelError::InvalidConfig(
                "all sizes must be non-zero".to_string(),
            ));
        }
        if self.pad_id >= self.vocab_size {
            return Err(ModelError::InvalidConfig(format!(
                "pad_id {} must be a vocabulary index below {}",
                self.pad_id, self.vocab_size
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::InvalidConfig(format!(
                "dropout {} must lie in [0, 1)",
                self.dropout
            )));
        }
        // The decoder recurrent state is initialised from the encoder final
        // state, so the two hidden sizes must agree.
        if self.src_hidden_size != self.target_hidden_size {
            return Err(ModelError::InvalidConfig(format!(
                "src_hidden_size {} must equal target_hidden_size {}",
                self.src_hidden_size, self.target_hidden_size
            )));
        }
        Ok(())
    }

    /// Size of the extended vocabulary: fixed vocabulary plus OOV slots.
    pub fn extended_vocab_size(&self) -> usize {
        self.vocab_size + self.max_oov_count
    }
}
