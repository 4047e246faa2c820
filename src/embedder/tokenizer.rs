/// BERT tokenizer wrapper around HuggingFace `tokenizers` crate.
///
/// Exposes tokenization as two explicit steps: a capacity query
/// (`required_tokens`) and tokenization proper (`tokenize`), so the encoder
/// can reject empty token sequences before touching the inference session.
use std::path::Path;

use anyhow::Result;
use tokenizers::Tokenizer;

/// Wrapper around the HuggingFace tokenizer for BERT-style encoder models.
pub struct BertTokenizer {
    inner: Tokenizer,
    max_length: usize,
}

/// Output of a tokenization operation.
#[derive(Debug, Clone)]
pub struct TokenizerOutput {
    /// Token IDs (input_ids for the model), begin/end markers included.
    pub input_ids: Vec<i64>,
    /// Attention mask (1 for real tokens, 0 for padding).
    pub attention_mask: Vec<i64>,
}

impl BertTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file in the model directory.
    ///
    /// Sequences longer than `max_length` tokens are truncated.
    pub fn from_model_dir(model_dir: &Path, max_length: usize) -> Result<Self> {
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {}",
            model_dir.display()
        );

        let mut inner = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        let _ = inner.with_truncation(Some(tokenizers::TruncationParams {
            max_length,
            ..Default::default()
        }));

        Ok(Self { inner, max_length })
    }

    /// Report how many tokens `text` encodes to, special markers included.
    ///
    /// This is the capacity-query half of tokenization; it fails if the
    /// tokenizer produces an empty sequence.
    pub fn required_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .inner
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("failed to encode text: {e}"))?;

        let count = encoding.get_ids().len();
        anyhow::ensure!(count > 0, "tokenizer produced an empty sequence");

        Ok(count)
    }

    /// Tokenize a single text, returning input IDs and attention mask.
    ///
    /// Begin/end-of-sequence markers are added by the tokenizer's
    /// post-processor.
    pub fn tokenize(&self, text: &str) -> Result<TokenizerOutput> {
        let encoding = self
            .inner
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("failed to encode text: {e}"))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        Ok(TokenizerOutput {
            input_ids,
            attention_mask,
        })
    }

    /// Get the vocabulary size.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(false)
    }

    /// Get the configured maximum sequence length.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}
