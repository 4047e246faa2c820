/// Run configuration for the preprocessing pipeline.
///
/// All paths and size constants are fixed program defaults: there are no
/// command-line flags, environment variables, or configuration files.
use std::path::PathBuf;

use anyhow::Result;

/// Context window for the tokenizer: sequences are truncated to this length.
pub const MAX_SEQ_LEN: usize = 512;

/// Embedding dimensionality the pipeline expects (BGE-base). A model with a
/// different hidden size still loads, with a warning.
pub const EXPECTED_DIMENSIONS: usize = 768;

// ── Default value functions ──────────────────────────────────────────

fn default_input_path() -> PathBuf {
    PathBuf::from("documents.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("preprocessed_documents.json")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models/bge-base-en-v1.5")
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    /// Input collection: a JSON array of `{id, text}` records.
    pub input_path: PathBuf,

    /// Output collection: the input records augmented with embeddings.
    pub output_path: PathBuf,

    /// Directory holding `model.onnx`, `tokenizer.json`, and `config.json`.
    pub model_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            model_dir: default_model_dir(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.input_path.as_os_str().is_empty(),
            "input path must not be empty"
        );
        anyhow::ensure!(
            !self.output_path.as_os_str().is_empty(),
            "output path must not be empty"
        );
        anyhow::ensure!(
            !self.model_dir.as_os_str().is_empty(),
            "model directory must not be empty"
        );
        anyhow::ensure!(
            self.input_path != self.output_path,
            "input and output paths must differ"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.input_path, PathBuf::from("documents.json"));
        assert_eq!(
            config.output_path,
            PathBuf::from("preprocessed_documents.json")
        );
        assert_eq!(config.model_dir, PathBuf::from("models/bge-base-en-v1.5"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_same_input_output() {
        let mut config = Config::default();
        config.output_path = config.input_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let mut config = Config::default();
        config.model_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
