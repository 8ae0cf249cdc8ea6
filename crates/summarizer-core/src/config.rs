//! Summary length profiles and model source configuration

use std::path::{Path, PathBuf};

use serde::Serialize;
use shared_types::SummaryType;

use crate::model::{ModelCandidate, ModelSource};

/// Default maximum words per chunk
pub const DEFAULT_MAX_CHUNK_WORDS: usize = 800;

/// Hub checkpoints tried, in order, after any local model directory
pub const DEFAULT_HUB_MODELS: &[&str] = &["google/flan-t5-base", "t5-small"];

/// Target length and chunk budget for one summary type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryProfile {
    pub target_words: usize,
    pub max_chunks: usize,
}

impl SummaryProfile {
    pub fn for_type(summary_type: SummaryType) -> Self {
        match summary_type {
            SummaryType::Brief => Self {
                target_words: 250,
                max_chunks: 5,
            },
            SummaryType::Standard => Self {
                target_words: 400,
                max_chunks: 8,
            },
            SummaryType::Detailed => Self {
                target_words: 700,
                max_chunks: 10,
            },
        }
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub max_chunk_words: usize,
    /// Rewrite domain terms to canonical tags before they reach the model
    pub emphasize_keywords: bool,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_chunk_words: DEFAULT_MAX_CHUNK_WORDS,
            emphasize_keywords: false,
        }
    }
}

/// Where summarization models come from
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Directory with config.json, tokenizer.json and model.safetensors
    pub local_model: Option<PathBuf>,
    pub hub_models: Vec<String>,
    /// Hugging Face cache directory
    pub cache_dir: PathBuf,
    /// Resolve hub files from the cache only, never the network
    pub offline: bool,
}

impl ModelConfig {
    /// Default hub checkpoints cached under `cache_dir`
    pub fn hub(cache_dir: &Path) -> Self {
        Self {
            local_model: None,
            hub_models: DEFAULT_HUB_MODELS.iter().map(|m| m.to_string()).collect(),
            cache_dir: cache_dir.to_path_buf(),
            offline: false,
        }
    }

    pub fn with_local_model(mut self, path: &Path) -> Self {
        self.local_model = Some(path.to_path_buf());
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Ordered candidate list: local directory first, then hub checkpoints
    pub fn candidates(&self) -> Vec<ModelCandidate> {
        let local = self.local_model.iter().map(|path| ModelCandidate {
            name: path.display().to_string(),
            source: ModelSource::Local(path.clone()),
        });
        let hub = self.hub_models.iter().map(|repo| ModelCandidate {
            name: repo.clone(),
            source: ModelSource::Hub { repo: repo.clone() },
        });
        local.chain(hub).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_grow_with_type() {
        let brief = SummaryProfile::for_type(SummaryType::Brief);
        let standard = SummaryProfile::for_type(SummaryType::Standard);
        let detailed = SummaryProfile::for_type(SummaryType::Detailed);

        assert_eq!((brief.target_words, brief.max_chunks), (250, 5));
        assert_eq!((standard.target_words, standard.max_chunks), (400, 8));
        assert_eq!((detailed.target_words, detailed.max_chunks), (700, 10));
    }

    #[test]
    fn test_local_model_is_tried_first() {
        let config = ModelConfig::hub(Path::new("/tmp/cache"))
            .with_local_model(Path::new("/models/legal-t5"));
        let candidates = config.candidates();

        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates[0].source,
            ModelSource::Local(PathBuf::from("/models/legal-t5"))
        );
        assert_eq!(candidates[1].name, "google/flan-t5-base");
        assert_eq!(candidates[2].name, "t5-small");
    }

    #[test]
    fn test_hub_only_config() {
        let config = ModelConfig::hub(Path::new("./model_cache")).with_offline(true);
        assert!(config.offline);
        assert!(config
            .candidates()
            .iter()
            .all(|c| matches!(c.source, ModelSource::Hub { .. })));
    }
}
