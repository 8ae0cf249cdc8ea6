//! T5 summarization model using Hugging Face Candle
//!
//! Loads any T5-family checkpoint (t5-small, flan-t5-base, fine-tuned
//! variants) from a local directory or the Hugging Face Hub cache.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use tokenizers::Tokenizer;

use super::generation::{beam_search, GenerationParams};
use super::{ModelCandidate, ModelLoader, ModelSource, Seq2SeqModel};

/// Maximum number of input tokens fed to the encoder
pub const MAX_INPUT_TOKENS: usize = 512;

/// Task prefix T5 checkpoints expect for summarization
const TASK_PREFIX: &str = "summarize: ";

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Paths of the three files a checkpoint needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Files inside a local model directory; all three must exist
    pub fn in_dir(dir: &Path) -> Result<Self> {
        let files = Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.exists() {
                return Err(anyhow!("Model file not found at {}", path.display()));
            }
        }
        Ok(files)
    }
}

pub struct T5Summarizer {
    name: String,
    model: T5ForConditionalGeneration,
    tokenizer: Tokenizer,
    device: Device,
    pad_token_id: u32,
    eos_token_id: u32,
    decoder_start_token_id: u32,
}

impl T5Summarizer {
    pub fn load(name: &str, files: &ModelFiles) -> Result<Self> {
        // Determine device (prefer CUDA if available)
        let device = if candle_core::utils::cuda_is_available() {
            Device::new_cuda(0)?
        } else if candle_core::utils::metal_is_available() {
            Device::new_metal(0)?
        } else {
            Device::Cpu
        };

        tracing::info!("Loading {} on device: {:?}", name, device);

        let config_str = std::fs::read_to_string(&files.config)?;
        let mut config: Config = serde_json::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config.json: {}", e))?;
        // Every beam re-runs the decoder over its full prefix
        config.use_cache = false;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        tracing::info!("Loading model weights from {}", files.weights.display());
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)?
        };
        let model = T5ForConditionalGeneration::load(vb, &config)?;

        let pad_token_id = config.pad_token_id as u32;
        let decoder_start_token_id = config
            .decoder_start_token_id
            .map(|id| id as u32)
            .unwrap_or(pad_token_id);

        tracing::info!("Model {} loaded successfully", name);

        Ok(Self {
            name: name.to_string(),
            model,
            tokenizer,
            device,
            pad_token_id,
            eos_token_id: config.eos_token_id as u32,
            decoder_start_token_id,
        })
    }

    /// Tokenize with the task prefix, keeping the end-of-sequence marker
    /// when the input is cut to `MAX_INPUT_TOKENS`
    fn encode_input(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(format!("{}{}", TASK_PREFIX, text), true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let mut ids = encoding.get_ids().to_vec();
        if ids.len() > MAX_INPUT_TOKENS {
            ids.truncate(MAX_INPUT_TOKENS - 1);
            ids.push(self.eos_token_id);
        }
        Ok(ids)
    }
}

impl Seq2SeqModel for T5Summarizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn device(&self) -> String {
        if self.device.is_cuda() {
            "cuda".to_string()
        } else if self.device.is_metal() {
            "metal".to_string()
        } else {
            "cpu".to_string()
        }
    }

    fn max_input_tokens(&self) -> usize {
        MAX_INPUT_TOKENS
    }

    fn generate(&mut self, text: &str, params: &GenerationParams) -> Result<String> {
        let input_ids = self.encode_input(text)?;
        let input = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        self.model.clear_kv_cache();
        let encoder_output = self.model.encode(&input)?;

        let device = self.device.clone();
        let model = &mut self.model;
        let step = |prefix: &[u32]| -> Result<Vec<f32>> {
            let decoder_ids = Tensor::new(prefix, &device)?.unsqueeze(0)?;
            let logits = model
                .decode(&decoder_ids, &encoder_output)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;
            Ok(logits.to_vec1::<f32>()?)
        };

        let output_ids = beam_search(step, params, self.decoder_start_token_id, self.eos_token_id)?;
        let output_ids: Vec<u32> = output_ids
            .into_iter()
            .filter(|&id| id != self.pad_token_id)
            .collect();

        self.tokenizer
            .decode(&output_ids, true)
            .map_err(|e| anyhow!("Failed to decode model output: {}", e))
    }
}

/// Resolves candidates to files on disk and loads them as T5 models
#[derive(Debug, Clone)]
pub struct CandleLoader {
    cache_dir: PathBuf,
    offline: bool,
}

impl CandleLoader {
    pub fn new(cache_dir: &Path, offline: bool) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            offline,
        }
    }

    pub fn resolve(&self, candidate: &ModelCandidate) -> Result<ModelFiles> {
        match &candidate.source {
            ModelSource::Local(dir) => ModelFiles::in_dir(dir),
            ModelSource::Hub { repo } if self.offline => self.resolve_cached(repo),
            ModelSource::Hub { repo } => self.download(repo),
        }
    }

    /// Fetch (or reuse) the checkpoint files through the Hub API
    fn download(&self, repo_id: &str) -> Result<ModelFiles> {
        use hf_hub::api::sync::ApiBuilder;

        tracing::info!("Fetching {} from Hugging Face Hub...", repo_id);

        let api = ApiBuilder::new()
            .with_cache_dir(self.cache_dir.clone())
            .build()?;
        let repo = api.model(repo_id.to_string());

        Ok(ModelFiles {
            config: repo.get(CONFIG_FILE)?,
            tokenizer: repo.get(TOKENIZER_FILE)?,
            weights: repo.get(WEIGHTS_FILE)?,
        })
    }

    /// Look the checkpoint files up in the local Hub cache only
    fn resolve_cached(&self, repo_id: &str) -> Result<ModelFiles> {
        use hf_hub::{Cache, Repo};

        let cache = Cache::new(self.cache_dir.clone());
        let repo = cache.repo(Repo::model(repo_id.to_string()));
        let get = |file: &str| {
            repo.get(file).ok_or_else(|| {
                anyhow!(
                    "{} for {} is not in the offline cache at {}",
                    file,
                    repo_id,
                    self.cache_dir.display()
                )
            })
        };

        Ok(ModelFiles {
            config: get(CONFIG_FILE)?,
            tokenizer: get(TOKENIZER_FILE)?,
            weights: get(WEIGHTS_FILE)?,
        })
    }
}

impl ModelLoader for CandleLoader {
    fn load(&self, candidate: &ModelCandidate) -> Result<Box<dyn Seq2SeqModel>> {
        let files = self.resolve(candidate)?;
        Ok(Box::new(T5Summarizer::load(&candidate.name, &files)?))
    }
}
