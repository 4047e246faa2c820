//! # embedprep — Batch JSON document embedding preprocessor
//!
//! Encodes a JSON document collection into dense vectors with a local ONNX
//! text encoder (BGE-base-en-v1.5) and writes the augmented collection back
//! out as pretty-printed JSON.
//!
//! ## Architecture
//!
//! - **[`config`]** — Fixed run configuration (paths and size constants)
//! - **[`embedder`]** — Text embedding via ONNX Runtime, plus model bootstrap
//! - **[`pipeline`]** — OpenInput → ProcessAll → WriteOutput stages

pub mod config;
pub mod embedder;
pub mod pipeline;
