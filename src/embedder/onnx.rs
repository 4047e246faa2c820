/// ONNX Runtime encoder using the `ort` crate.
///
/// Loads a BGE-base-en-v1.5 ONNX export, tokenizes one document at a time,
/// runs a single-sequence forward pass, and extracts the pooled embedding
/// via attention-masked mean pooling of the final hidden states.
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use ort::session::Session;
use ort::value::Tensor;
use tracing::{info, warn};

use super::tokenizer::BertTokenizer;
use super::{Embedder, EmbedderError};
use crate::config::{EXPECTED_DIMENSIONS, MAX_SEQ_LEN};

static RUNTIME_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the process-wide ONNX Runtime environment.
///
/// Idempotent: only the first call commits, repeated calls return the
/// outcome of that first commit. The runtime is never explicitly torn down.
pub fn init_runtime() -> Result<(), EmbedderError> {
    RUNTIME_INIT
        .get_or_init(|| {
            let _ = ort::init().with_name("embedprep").commit();
            Ok(())
        })
        .clone()
        .map_err(EmbedderError::ModelLoadFailed)
}

/// ONNX-backed encoder implementing the `Embedder` trait.
///
/// Owns exactly one session and one tokenizer; both are released together
/// when the encoder is dropped.
pub struct OnnxEncoder {
    session: Mutex<Session>,
    tokenizer: BertTokenizer,
    dimensions: usize,
}

impl OnnxEncoder {
    /// Create a new `OnnxEncoder` by loading a model from the given directory.
    ///
    /// Expects `model.onnx`, `tokenizer.json`, and `config.json` in
    /// `model_dir`.
    pub fn new(model_dir: &Path) -> Result<Self, EmbedderError> {
        init_runtime()?;

        let model_path = model_dir.join("model.onnx");

        if !model_path.exists() {
            return Err(EmbedderError::ModelLoadFailed(format!(
                "model.onnx not found in {}",
                model_dir.display()
            )));
        }

        info!("Initializing ONNX session...");

        let session = Session::builder()
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("session builder error: {e}")))?
            .with_intra_threads(4)
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("thread config error: {e}")))?
            .with_inter_threads(4)
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("thread config error: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("model load error: {e}")))?;

        let dimensions = read_hidden_size(model_dir)?;
        info!("Model loaded. Embedding dimension: {dimensions}");

        if dimensions != EXPECTED_DIMENSIONS {
            warn!("Expected embedding dimension {EXPECTED_DIMENSIONS}, got {dimensions}");
        }

        if !looks_like_encoder(&session) {
            warn!("Model does not appear to be an encoder model");
        }

        let tokenizer = BertTokenizer::from_model_dir(model_dir, MAX_SEQ_LEN)
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("tokenizer error: {e}")))?;

        info!("Tokenizer loaded (vocab size: {})", tokenizer.vocab_size());

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimensions,
        })
    }
}

impl Embedder for OnnxEncoder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        // Capacity query first: an empty token sequence never reaches the
        // session.
        let seq_len = self
            .tokenizer
            .required_tokens(text)
            .map_err(|e| EmbedderError::TokenizerError(e.to_string()))?;

        let tokens = self
            .tokenizer
            .tokenize(text)
            .map_err(|e| EmbedderError::TokenizerError(e.to_string()))?;

        if tokens.input_ids.len() != seq_len {
            return Err(EmbedderError::TokenizerError(format!(
                "token count changed between probe and encode: {seq_len} vs {}",
                tokens.input_ids.len()
            )));
        }

        // Single-sequence batch, shape [1, seq_len]. The (shape, data) tuple
        // form avoids ndarray version coupling with ort.
        let input_ids_val = Tensor::from_array(([1usize, seq_len], tokens.input_ids.clone()))
            .map_err(|e| EmbedderError::InferenceFailed(format!("input_ids error: {e}")))?;
        let attention_mask_val =
            Tensor::from_array(([1usize, seq_len], tokens.attention_mask.clone())).map_err(
                |e| EmbedderError::InferenceFailed(format!("attention_mask error: {e}")),
            )?;
        let token_type_ids_val = Tensor::from_array(([1usize, seq_len], vec![0i64; seq_len]))
            .map_err(|e| EmbedderError::InferenceFailed(format!("token_type_ids error: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| EmbedderError::InferenceFailed(format!("lock poisoned: {e}")))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_val,
                "attention_mask" => attention_mask_val,
                "token_type_ids" => token_type_ids_val,
            ])
            .map_err(|e| EmbedderError::InferenceFailed(format!("inference failed: {e}")))?;

        // Output 0: last hidden state, shape [1, seq_len, hidden_size]
        let (_shape, hidden_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbedderError::InferenceFailed(format!("output extraction: {e}")))?;

        if hidden_data.len() != seq_len * self.dimensions {
            return Err(EmbedderError::InferenceFailed(format!(
                "unexpected output size: {} for seq_len {seq_len} x hidden {}",
                hidden_data.len(),
                self.dimensions
            )));
        }

        // Pooled embedding for the one sequence in the batch
        Ok(mean_pooling(
            hidden_data,
            &tokens.attention_mask,
            seq_len,
            self.dimensions,
        ))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Read the model's hidden size from the artifact's `config.json`.
fn read_hidden_size(model_dir: &Path) -> Result<usize, EmbedderError> {
    let config_path = model_dir.join("config.json");

    let data = fs::read_to_string(&config_path).map_err(|e| {
        EmbedderError::ModelLoadFailed(format!("failed to read {}: {e}", config_path.display()))
    })?;

    let config: serde_json::Value = serde_json::from_str(&data).map_err(|e| {
        EmbedderError::ModelLoadFailed(format!("invalid JSON in {}: {e}", config_path.display()))
    })?;

    config
        .get("hidden_size")
        .and_then(serde_json::Value::as_u64)
        .map(|v| v as usize)
        .ok_or_else(|| {
            EmbedderError::ModelLoadFailed(format!(
                "hidden_size missing in {}",
                config_path.display()
            ))
        })
}

/// Whether the session's input signature matches a BERT-style text encoder.
fn looks_like_encoder(session: &Session) -> bool {
    let has_input = |name: &str| session.inputs().iter().any(|i| i.name() == name);
    has_input("input_ids") && has_input("attention_mask")
}

/// Mean pooling over hidden states weighted by attention mask.
///
/// `hidden_data` is a flat array with shape `[1, seq_len, hidden_size]`.
fn mean_pooling(
    hidden_data: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut result = vec![0.0f32; hidden_size];
    let mut mask_sum: f32 = 0.0;

    for t in 0..seq_len {
        let mask = attention_mask[t] as f32;
        mask_sum += mask;

        for h in 0..hidden_size {
            let idx = t * hidden_size + h;
            result[h] += hidden_data[idx] * mask;
        }
    }

    // Average by number of real tokens
    if mask_sum > 0.0 {
        for v in &mut result {
            *v /= mask_sum;
        }
    }

    result
}
