//! End-to-end summarization of one contract

use std::panic::{catch_unwind, AssertUnwindSafe};

use contract_nlp::preprocess_for_summary;
use serde::Serialize;
use shared_types::SummaryType;
use tracing::{error, info, warn};

use crate::assembler::{format_markdown, join_summaries, needs_condensation, postprocess_summary};
use crate::chunking::{chunk_text, word_count};
use crate::config::{ModelConfig, SummarizerConfig, SummaryProfile};
use crate::confidence::calculate_confidence;
use crate::error::{Result, SummarizerError};
use crate::extractive::extractive_summary;
use crate::model::{CandleLoader, ModelAdapter, ModelInfo, SummarySource};
use crate::selection::select_important_chunks;

/// Label recorded when no model text made it into a summary
pub const EXTRACTIVE_MODEL_NAME: &str = "extractive";

/// A finished summary plus the numbers describing how it was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOutput {
    /// Markdown grouped by category
    pub summary: String,
    /// Post-processed plain text the markdown was built from
    pub raw_summary: String,
    pub confidence: f64,
    pub model_used: String,
    pub summary_type: SummaryType,
    pub word_count: usize,
    pub chunks_processed: usize,
    pub target_words: usize,
}

pub struct ContractSummarizer {
    adapter: ModelAdapter,
    config: SummarizerConfig,
}

impl ContractSummarizer {
    pub fn new(adapter: ModelAdapter, config: SummarizerConfig) -> Self {
        Self { adapter, config }
    }

    /// Load the first usable model from `model_config` through Candle
    pub fn load(model_config: &ModelConfig, config: SummarizerConfig) -> Self {
        let loader = CandleLoader::new(&model_config.cache_dir, model_config.offline);
        let adapter = ModelAdapter::load(&model_config.candidates(), &loader)
            .with_keyword_emphasis(config.emphasize_keywords);
        Self::new(adapter, config)
    }

    pub fn extractive_only() -> Self {
        Self::new(ModelAdapter::extractive_only(), SummarizerConfig::default())
    }

    pub fn model_info(&self) -> ModelInfo {
        self.adapter.info()
    }

    pub fn shutdown(&self) {
        self.adapter.unload();
    }

    /// Summarize contract text. Never fails: any error inside the model
    /// pipeline yields an extractive summary of the original text.
    pub fn summarize(&self, text: &str, summary_type: SummaryType) -> SummaryOutput {
        match catch_unwind(AssertUnwindSafe(|| self.run_pipeline(text, summary_type))) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("{}, falling back to extractive summary", e);
                self.summarize_extractive(text, summary_type)
            }
            Err(_) => {
                let err = SummarizerError::Critical("panic during summarization".to_string());
                error!("{}, falling back to extractive summary", err);
                self.summarize_extractive(text, summary_type)
            }
        }
    }

    /// Extractive summary of the whole text with the usual output record
    pub fn summarize_extractive(&self, text: &str, summary_type: SummaryType) -> SummaryOutput {
        let profile = SummaryProfile::for_type(summary_type);
        let raw = extractive_summary(&preprocess_for_summary(text), profile.target_words);
        self.build_output(text, raw, EXTRACTIVE_MODEL_NAME.to_string(), summary_type, 1)
    }

    fn run_pipeline(&self, text: &str, summary_type: SummaryType) -> Result<SummaryOutput> {
        let profile = SummaryProfile::for_type(summary_type);

        if !self.adapter.is_loaded() {
            info!("No model loaded, generating extractive {} summary", summary_type);
            return Ok(self.summarize_extractive(text, summary_type));
        }

        let preprocessed = preprocess_for_summary(text);
        let chunks = chunk_text(&preprocessed, self.config.max_chunk_words);
        if chunks.is_empty() {
            warn!("Nothing to summarize after preprocessing");
            return Ok(self.summarize_extractive(text, summary_type));
        }

        let total_chunks = chunks.len();
        let chunks = select_important_chunks(chunks, profile.max_chunks);
        info!(
            "Summarizing {} of {} chunks for a {} summary ({} words)",
            chunks.len(),
            total_chunks,
            summary_type,
            profile.target_words
        );

        let chunk_target = (profile.target_words / chunks.len()).max(1);
        let mut used_model = false;
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let part = self.adapter.summarize_chunk(chunk, chunk_target);
            used_model |= part.source == SummarySource::Model;
            parts.push(part.text);
        }

        let mut combined = join_summaries(&parts);
        if needs_condensation(&combined, profile.target_words) {
            info!(
                "Combined summary has {} words, condensing to {}",
                word_count(&combined),
                profile.target_words
            );
            let condensed = self.adapter.condense(&combined, profile.target_words);
            used_model |= condensed.source == SummarySource::Model;
            combined = condensed.text;
        }

        if combined.trim().is_empty() {
            return Err(SummarizerError::Critical(
                "chunk summaries were all empty".to_string(),
            ));
        }

        let model_used = if used_model {
            self.adapter
                .model_name()
                .unwrap_or_else(|| EXTRACTIVE_MODEL_NAME.to_string())
        } else {
            EXTRACTIVE_MODEL_NAME.to_string()
        };

        Ok(self.build_output(text, combined, model_used, summary_type, chunks.len()))
    }

    fn build_output(
        &self,
        original: &str,
        raw: String,
        model_used: String,
        summary_type: SummaryType,
        chunks_processed: usize,
    ) -> SummaryOutput {
        let raw_summary = postprocess_summary(&raw);
        SummaryOutput {
            summary: format_markdown(&raw_summary),
            confidence: calculate_confidence(&raw_summary, original),
            word_count: word_count(&raw_summary),
            raw_summary,
            model_used,
            summary_type,
            chunks_processed,
            target_words: SummaryProfile::for_type(summary_type).target_words,
        }
    }
}
