/// End-to-end integration tests for the embedprep pipeline.
///
/// Tests the complete flow with a mock encoder:
///   load documents → embed → write output → re-read
use std::fs;

use embedprep::config::Config;
use embedprep::embedder::Embedder;
use embedprep::embedder::mock::MockEmbedder;
use embedprep::pipeline;
use tempfile::tempdir;

/// Full pipeline: write input → load → embed → write → verify shape
#[test]
fn test_full_pipeline() {
    let temp_dir = tempdir().unwrap();
    let input_path = temp_dir.path().join("documents.json");
    let output_path = temp_dir.path().join("preprocessed_documents.json");

    fs::write(
        &input_path,
        r#"[
          {"id": 1, "text": "Rust is a systems programming language."},
          {"id": 2, "text": "Embeddings map text to dense vectors.", "source": "notes"},
          {"id": 3, "text": ""}
        ]"#,
    )
    .unwrap();

    let docs = pipeline::load_documents(&input_path).unwrap();
    assert_eq!(docs.len(), 3, "Should load 3 documents");

    let embedder = MockEmbedder::default();
    let output = pipeline::embed_documents(&docs, &embedder, |_, _| {}).unwrap();

    assert_eq!(output.len(), 3, "Every input record gets an output record");
    for (input, out) in docs.iter().zip(&output) {
        assert_eq!(out.id, input.id, "Order and ids preserved");
        assert_eq!(out.text, input.text, "Original text preserved");
        assert_eq!(
            out.embedding.len(),
            embedder.dimensions(),
            "Embedding length matches the model dimension"
        );
    }

    pipeline::write_documents(&output_path, &output).unwrap();

    // Re-read and verify the written collection
    let data = fs::read_to_string(&output_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&data).unwrap();
    let array = parsed.as_array().expect("output is a JSON array");
    assert_eq!(array.len(), 3);
    assert_eq!(array[0]["id"], 1);
    assert_eq!(array[2]["text"], "");
    assert_eq!(
        array[1]["embedding"].as_array().unwrap().len(),
        embedder.dimensions()
    );

    // Pretty-printed with 2-space indentation
    assert!(data.starts_with("[\n  {\n    \"id\": 1"));
}

/// An empty input array produces an empty output array.
#[test]
fn test_empty_input() {
    let temp_dir = tempdir().unwrap();
    let input_path = temp_dir.path().join("documents.json");
    let output_path = temp_dir.path().join("preprocessed_documents.json");

    fs::write(&input_path, "[]").unwrap();

    let docs = pipeline::load_documents(&input_path).unwrap();
    assert!(docs.is_empty());

    let embedder = MockEmbedder::default();
    let output = pipeline::embed_documents(&docs, &embedder, |_, _| {}).unwrap();
    assert!(output.is_empty());

    pipeline::write_documents(&output_path, &output).unwrap();
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "[]");
}

/// A document missing a required field aborts the run before any output
/// is written.
#[test]
fn test_fail_fast_on_missing_field() {
    let temp_dir = tempdir().unwrap();
    let input_path = temp_dir.path().join("documents.json");
    let output_path = temp_dir.path().join("preprocessed_documents.json");

    fs::write(
        &input_path,
        r#"[{"id": 1, "text": "fine"}, {"id": 2}, {"id": 3, "text": "never reached"}]"#,
    )
    .unwrap();

    let result = pipeline::load_documents(&input_path);
    assert!(result.is_err(), "Missing `text` should fail the load");
    assert!(
        !output_path.exists(),
        "No output file is written on failure"
    );
}

/// A non-array top-level value fails the load stage.
#[test]
fn test_fail_fast_on_non_array_input() {
    let temp_dir = tempdir().unwrap();
    let input_path = temp_dir.path().join("documents.json");

    fs::write(&input_path, r#"{"documents": []}"#).unwrap();

    assert!(pipeline::load_documents(&input_path).is_err());
}

/// Progress fires at indices 0, 100, 200 only for 250 documents.
#[test]
fn test_progress_reporting() {
    let docs: Vec<pipeline::Document> = (0..250)
        .map(|i| pipeline::Document {
            id: i,
            text: format!("document {i}"),
        })
        .collect();

    let embedder = MockEmbedder::default();
    let mut reported = Vec::new();
    pipeline::embed_documents(&docs, &embedder, |i, total| {
        assert_eq!(total, 250);
        reported.push(i);
    })
    .unwrap();

    assert_eq!(reported, vec![0, 100, 200]);
}

/// Encoding the same text twice yields an identical vector.
#[test]
fn test_embedding_determinism() {
    let embedder = MockEmbedder::default();

    let docs = vec![
        pipeline::Document {
            id: 1,
            text: "the same text".to_string(),
        },
        pipeline::Document {
            id: 2,
            text: "the same text".to_string(),
        },
    ];

    let output = pipeline::embed_documents(&docs, &embedder, |_, _| {}).unwrap();
    assert_eq!(output[0].embedding, output[1].embedding);
}

/// A non-768 encoder still works end to end; output uses its actual
/// dimension.
#[test]
fn test_non_default_dimension_flows_through() {
    let embedder = MockEmbedder::new(384);

    let docs = vec![pipeline::Document {
        id: 1,
        text: "smaller model".to_string(),
    }];

    let output = pipeline::embed_documents(&docs, &embedder, |_, _| {}).unwrap();
    assert_eq!(output[0].embedding.len(), 384);
}

/// Config defaults match the fixed interface paths.
#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.input_path.to_str().unwrap(), "documents.json");
    assert_eq!(
        config.output_path.to_str().unwrap(),
        "preprocessed_documents.json"
    );
    assert!(config.model_dir.to_str().unwrap().contains("bge-base-en-v1.5"));
    assert!(config.validate().is_ok());
}
