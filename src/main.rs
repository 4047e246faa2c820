use anyhow::{Context, Result};
use embedprep::config::Config;
use embedprep::embedder::download;
use embedprep::embedder::onnx::{self, OnnxEncoder};
use embedprep::pipeline;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::default();
    config.validate()?;

    println!("Loading documents from {}...", config.input_path.display());
    let docs = pipeline::load_documents(&config.input_path)?;
    println!("Found {} documents", docs.len());

    // One-time bootstrap; a no-op when the model files are already on disk.
    download::download_model_files(&config.model_dir).context("failed to fetch model files")?;

    println!("Loading BGE model from {}...", config.model_dir.display());
    onnx::init_runtime()?;
    let encoder = OnnxEncoder::new(&config.model_dir)?;

    let output = pipeline::embed_documents(&docs, &encoder, |i, total| {
        println!("Processing document {i}/{total}...");
    })?;

    println!("Writing results to {}...", config.output_path.display());
    pipeline::write_documents(&config.output_path, &output)?;

    println!("Successfully processed {} documents", output.len());
    println!("Output saved to {}", config.output_path.display());

    Ok(())
}
