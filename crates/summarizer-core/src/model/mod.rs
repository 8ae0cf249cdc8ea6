//! Seq2seq model adapter with a fallback chain
//!
//! The adapter owns at most one loaded model for the life of the process.
//! Loading walks an ordered candidate list and keeps the first model that
//! loads; if none does, every call is answered by the extractive
//! summarizer. Generation is serialized behind a mutex and never returns an
//! error to callers.

pub mod generation;
pub mod t5;

use std::path::PathBuf;
use std::sync::Mutex;

use contract_nlp::emphasize_domain_keywords;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chunking::word_count;
use crate::error::{Result, SummarizerError};
use crate::extractive::extractive_summary;

pub use generation::{beam_search, GenerationParams};
pub use t5::{CandleLoader, T5Summarizer};

/// Chunks shorter than this skip the model
pub const MIN_MODEL_INPUT_WORDS: usize = 30;
/// Model output shorter than this is discarded
pub const MIN_MODEL_OUTPUT_WORDS: usize = 10;
/// Word target used for chunks too short for the model
pub const SHORT_CHUNK_MAX_WORDS: usize = 50;
/// Input token limit reported when no model is loaded
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 512;

/// A loaded sequence-to-sequence summarization model
pub trait Seq2SeqModel: Send {
    fn name(&self) -> &str;

    /// Human-readable device, e.g. "cpu" or "cuda"
    fn device(&self) -> String;

    fn max_input_tokens(&self) -> usize;

    fn generate(&mut self, text: &str, params: &GenerationParams) -> anyhow::Result<String>;
}

/// Builds a model from one candidate source
pub trait ModelLoader {
    fn load(&self, candidate: &ModelCandidate) -> anyhow::Result<Box<dyn Seq2SeqModel>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Directory holding config.json, tokenizer.json and model.safetensors
    Local(PathBuf),
    /// Hugging Face Hub repository id
    Hub { repo: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub name: String,
    pub source: ModelSource,
}

/// Which path produced a piece of summary text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Model,
    Extractive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkSummary {
    pub text: String,
    pub source: SummarySource,
}

impl ChunkSummary {
    fn extractive(text: &str, max_words: usize) -> Self {
        Self {
            text: extractive_summary(text, max_words),
            source: SummarySource::Extractive,
        }
    }
}

/// Snapshot of the adapter state for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub model_name: Option<String>,
    pub device: String,
    pub is_loaded: bool,
    pub max_input_length: usize,
    pub load_failures: Vec<String>,
}

pub struct ModelAdapter {
    model: Mutex<Option<Box<dyn Seq2SeqModel>>>,
    emphasize_keywords: bool,
    load_failures: Vec<String>,
}

impl ModelAdapter {
    /// Try each candidate in order and keep the first one that loads
    pub fn load(candidates: &[ModelCandidate], loader: &dyn ModelLoader) -> Self {
        let mut failures = Vec::new();

        for candidate in candidates {
            info!("Loading summarization model {}", candidate.name);
            match loader.load(candidate) {
                Ok(model) => {
                    info!(
                        "Summarization model {} ready on {}",
                        model.name(),
                        model.device()
                    );
                    let mut adapter = Self::with_model(model);
                    adapter.load_failures = failures;
                    return adapter;
                }
                Err(e) => {
                    let err = SummarizerError::ModelLoad {
                        candidate: candidate.name.clone(),
                        reason: format!("{:#}", e),
                    };
                    warn!("{}", err);
                    failures.push(err.to_string());
                }
            }
        }

        warn!("No summarization model could be loaded, using extractive summaries only");
        Self {
            load_failures: failures,
            ..Self::extractive_only()
        }
    }

    pub fn extractive_only() -> Self {
        Self {
            model: Mutex::new(None),
            emphasize_keywords: false,
            load_failures: Vec::new(),
        }
    }

    pub fn with_model(model: Box<dyn Seq2SeqModel>) -> Self {
        Self {
            model: Mutex::new(Some(model)),
            emphasize_keywords: false,
            load_failures: Vec::new(),
        }
    }

    /// Rewrite domain terms to canonical tags in model input
    pub fn with_keyword_emphasis(mut self, enabled: bool) -> Self {
        self.emphasize_keywords = enabled;
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.model
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn model_name(&self) -> Option<String> {
        self.model
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|m| m.name().to_string()))
    }

    pub fn info(&self) -> ModelInfo {
        let guard = self.model.lock().ok();
        let model = guard.as_ref().and_then(|g| g.as_ref());
        ModelInfo {
            model_name: model.map(|m| m.name().to_string()),
            device: model.map_or_else(|| "cpu".to_string(), |m| m.device()),
            is_loaded: model.is_some(),
            max_input_length: model.map_or(DEFAULT_MAX_INPUT_TOKENS, |m| m.max_input_tokens()),
            load_failures: self.load_failures.clone(),
        }
    }

    /// Drop the loaded model. Later calls fall back to extractive summaries.
    pub fn unload(&self) {
        let model = match self.model.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(model) = model {
            info!("Unloading summarization model {}", model.name());
        }
    }

    /// Summarize one chunk towards `target_words`, falling back to the
    /// extractive summarizer whenever the model is absent, the chunk is too
    /// short, or the model output is unusable
    pub fn summarize_chunk(&self, chunk: &str, target_words: usize) -> ChunkSummary {
        if !self.is_loaded() {
            return ChunkSummary::extractive(chunk, target_words);
        }

        let words = word_count(chunk);
        if words < MIN_MODEL_INPUT_WORDS {
            debug!("Chunk has {} words, using extractive summary", words);
            return ChunkSummary::extractive(chunk, target_words.min(SHORT_CHUNK_MAX_WORDS));
        }

        match self.generate(chunk, &GenerationParams::for_target(target_words)) {
            Ok(text) if word_count(&text) >= MIN_MODEL_OUTPUT_WORDS => ChunkSummary {
                text,
                source: SummarySource::Model,
            },
            Ok(text) => {
                debug!(
                    "Model output too short ({} words), using extractive summary",
                    word_count(&text)
                );
                ChunkSummary::extractive(chunk, target_words)
            }
            Err(e) => {
                warn!("{}, using extractive summary", e);
                ChunkSummary::extractive(chunk, target_words)
            }
        }
    }

    /// Shorten an over-long combined summary towards `target_words`
    pub fn condense(&self, text: &str, target_words: usize) -> ChunkSummary {
        if !self.is_loaded() {
            return ChunkSummary::extractive(text, target_words);
        }

        match self.generate(text, &GenerationParams::for_condensation(target_words)) {
            Ok(condensed) if !condensed.trim().is_empty() => ChunkSummary {
                text: condensed,
                source: SummarySource::Model,
            },
            Ok(_) => ChunkSummary::extractive(text, target_words),
            Err(e) => {
                warn!("Condensation failed: {}", e);
                ChunkSummary::extractive(text, target_words)
            }
        }
    }

    fn generate(&self, text: &str, params: &GenerationParams) -> Result<String> {
        let mut guard = self.model.lock().map_err(|_| SummarizerError::LockPoisoned)?;
        let model = guard
            .as_mut()
            .ok_or_else(|| SummarizerError::Generation("no model loaded".to_string()))?;

        let input = if self.emphasize_keywords {
            emphasize_domain_keywords(text)
        } else {
            text.to_string()
        };

        model
            .generate(&input, params)
            .map(|output| output.trim().to_string())
            .map_err(|e| SummarizerError::Generation(format!("{:#}", e)))
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn long_chunk() -> String {
        "The Employee shall receive a base salary of 2,500,000 FCFA per month payable at the end of each calendar month. \
         The Employer shall provide health insurance and a transport allowance for the duration of the contract. \
         Either party may terminate this agreement with thirty days written notice."
            .to_string()
    }

    #[test]
    fn test_cascade_keeps_first_loadable_candidate() {
        let loader = ScriptedLoader::failing_on(&["local", "google/flan-t5-base"]);
        let candidates = vec![
            hub_candidate("local"),
            hub_candidate("google/flan-t5-base"),
            hub_candidate("t5-small"),
        ];
        let adapter = ModelAdapter::load(&candidates, &loader);

        assert!(adapter.is_loaded());
        assert_eq!(adapter.model_name(), Some("t5-small".to_string()));
        assert_eq!(
            *loader.attempts.lock().unwrap(),
            vec!["local", "google/flan-t5-base", "t5-small"]
        );

        let info = adapter.info();
        assert_eq!(info.load_failures.len(), 2);
        assert!(info.load_failures[0].contains("local"));
    }

    #[test]
    fn test_all_candidates_failing_means_extractive_only() {
        let loader = ScriptedLoader::failing_on(&["a", "b"]);
        let adapter = ModelAdapter::load(&[hub_candidate("a"), hub_candidate("b")], &loader);

        assert!(!adapter.is_loaded());
        let info = adapter.info();
        assert_eq!(info.model_name, None);
        assert_eq!(info.device, "cpu");
        assert_eq!(info.max_input_length, DEFAULT_MAX_INPUT_TOKENS);

        let summary = adapter.summarize_chunk(&long_chunk(), 100);
        assert_eq!(summary.source, SummarySource::Extractive);
    }

    #[test]
    fn test_short_chunk_skips_model() {
        let model =
            FakeModel::replying("A perfectly fine model summary with more than ten words in it.");
        let calls = model.calls.clone();
        let adapter = ModelAdapter::with_model(Box::new(model));

        let chunk = "Probation Period: 3 months. The employee reports to the manager.";
        let summary = adapter.summarize_chunk(chunk, 400);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(summary.source, SummarySource::Extractive);
        assert_eq!(summary.text, extractive_summary(chunk, 50));
    }

    #[test]
    fn test_model_output_used_when_long_enough() {
        let reply = "The employee earns 2,500,000 FCFA monthly with health insurance and thirty days notice.";
        let adapter = ModelAdapter::with_model(Box::new(FakeModel::replying(reply)));
        let summary = adapter.summarize_chunk(&long_chunk(), 100);
        assert_eq!(summary.source, SummarySource::Model);
        assert_eq!(summary.text, reply);
    }

    #[test]
    fn test_short_model_output_replaced() {
        let adapter = ModelAdapter::with_model(Box::new(FakeModel::replying("Salary paid.")));
        let summary = adapter.summarize_chunk(&long_chunk(), 100);
        assert_eq!(summary.source, SummarySource::Extractive);
        assert_eq!(summary.text, extractive_summary(&long_chunk(), 100));
    }

    #[test]
    fn test_generation_error_falls_back() {
        let adapter = ModelAdapter::with_model(Box::new(FakeModel::failing("out of memory")));
        let summary = adapter.summarize_chunk(&long_chunk(), 100);
        assert_eq!(summary.source, SummarySource::Extractive);

        let condensed = adapter.condense(&long_chunk(), 20);
        assert_eq!(condensed.source, SummarySource::Extractive);
        assert_eq!(condensed.text, extractive_summary(&long_chunk(), 20));
    }

    #[test]
    fn test_keyword_emphasis_only_touches_model_input() {
        let model = FakeModel::replying(
            "The employee earns a salary and benefits under the terms of the agreement.",
        );
        let inputs = model.inputs.clone();
        let adapter = ModelAdapter::with_model(Box::new(model)).with_keyword_emphasis(true);

        adapter.summarize_chunk(&long_chunk(), 100);
        let seen = inputs.lock().unwrap();
        assert!(seen[0].contains("SALARY"));
    }

    #[test]
    fn test_unload_tears_down_model() {
        let adapter = ModelAdapter::with_model(Box::new(FakeModel::replying("x")));
        assert!(adapter.is_loaded());
        adapter.unload();
        assert!(!adapter.is_loaded());
        assert_eq!(adapter.summarize_chunk(&long_chunk(), 50).source, SummarySource::Extractive);
    }
}
