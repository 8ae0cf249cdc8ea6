//! Summarizer Core - Chunking, generation and fallback for employment contract summaries
//!
//! This crate provides:
//! - Section-aware and sentence-based chunking
//! - Keyword-scored chunk selection
//! - A seq2seq model adapter (T5 via Candle) with a load fallback chain
//! - A deterministic extractive summarizer
//! - Summary assembly, markdown grouping and confidence scoring

pub mod assembler;
pub mod chunking;
pub mod confidence;
pub mod config;
pub mod error;
pub mod extractive;
pub mod model;
pub mod pipeline;
pub mod selection;

// Re-export commonly used types
pub use config::{ModelConfig, SummarizerConfig, SummaryProfile};
pub use error::SummarizerError;
pub use model::{ModelAdapter, ModelCandidate, ModelInfo, ModelLoader, ModelSource, Seq2SeqModel};
pub use pipeline::{ContractSummarizer, SummaryOutput, EXTRACTIVE_MODEL_NAME};
