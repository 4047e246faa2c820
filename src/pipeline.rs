/// Driver stages for the preprocessing pipeline.
///
/// OpenInput, ProcessAll, and WriteOutput as plain functions over an
/// `Embedder`; `main` sequences them and owns the exit codes. Errors
/// propagate to the top-level handler, no stage recovers or retries.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::embedder::Embedder;

/// A progress callback fires on every index divisible by this.
pub const PROGRESS_INTERVAL: usize = 100;

/// An input document record.
///
/// Extra JSON keys are ignored; `id` uniqueness is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Document {
    pub id: i64,
    pub text: String,
}

/// An output record: the input document plus its embedding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddedDocument {
    pub id: i64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Read and parse the input collection as one JSON array.
///
/// A missing file, malformed JSON, a non-array top level, and a record with
/// a missing or wrong-typed `id`/`text` all fail here.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("could not open {}", path.display()))?;

    let docs: Vec<Document> = serde_json::from_str(&data)
        .with_context(|| format!("invalid document JSON in {}", path.display()))?;

    Ok(docs)
}

/// Embed every document in input order, collecting the augmented records
/// in memory.
///
/// `progress` fires with `(index, total)` on every 100th zero-based index.
/// A failure on any document aborts the whole run.
pub fn embed_documents(
    docs: &[Document],
    embedder: &dyn Embedder,
    mut progress: impl FnMut(usize, usize),
) -> Result<Vec<EmbeddedDocument>> {
    let total = docs.len();
    let mut output = Vec::with_capacity(total);

    for (i, doc) in docs.iter().enumerate() {
        if i % PROGRESS_INTERVAL == 0 {
            progress(i, total);
        }

        let embedding = embedder
            .embed(&doc.text)
            .with_context(|| format!("failed to embed document {}", doc.id))?;

        output.push(EmbeddedDocument {
            id: doc.id,
            text: doc.text.clone(),
            embedding,
        });
    }

    Ok(output)
}

/// Serialize the augmented collection as pretty-printed JSON with 2-space
/// indentation and write the whole file in one operation.
pub fn write_documents(path: &Path, docs: &[EmbeddedDocument]) -> Result<()> {
    let data = serde_json::to_string_pretty(docs).context("failed to serialize documents")?;

    fs::write(path, data)
        .with_context(|| format!("could not open {} for writing", path.display()))?;

    Ok(())
}
