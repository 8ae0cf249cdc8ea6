//! Deterministic beam search over decoder logits

use std::cmp::Ordering;
use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;

/// Longest output the model may produce, in tokens
pub const MAX_GENERATION_LENGTH: usize = 512;

/// Decoding policy for one generation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_length: usize,
    pub min_length: usize,
    pub num_beams: usize,
    pub length_penalty: f64,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: usize,
    pub early_stopping: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: MAX_GENERATION_LENGTH,
            min_length: 30,
            num_beams: 3,
            length_penalty: 1.1,
            repetition_penalty: 1.3,
            no_repeat_ngram_size: 2,
            early_stopping: true,
        }
    }
}

impl GenerationParams {
    /// Policy for summarizing one chunk towards `target` words
    pub fn for_target(target: usize) -> Self {
        let max_length = target.min(MAX_GENERATION_LENGTH).max(1);
        let min_length = (target / 3).max(30).min(50).min(max_length);
        Self {
            max_length,
            min_length,
            ..Self::default()
        }
    }

    /// Policy for the second pass that shortens combined chunk summaries
    pub fn for_condensation(target: usize) -> Self {
        let max_length = target.min(MAX_GENERATION_LENGTH).max(1);
        let min_length = ((target as f64 * 0.6) as usize).min(50).min(max_length);
        Self {
            max_length,
            min_length,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Beam {
    tokens: Vec<u32>,
    score: f64,
}

impl Beam {
    fn generated(&self) -> usize {
        self.tokens.len() - 1
    }
}

/// Run beam search from `start_token` until `eos_token` or `max_length`.
///
/// `step` receives the decoder prefix (start token included) and returns
/// the next-token logits. The returned ids exclude the start token and the
/// end-of-sequence token.
pub fn beam_search<F>(
    mut step: F,
    params: &GenerationParams,
    start_token: u32,
    eos_token: u32,
) -> Result<Vec<u32>>
where
    F: FnMut(&[u32]) -> Result<Vec<f32>>,
{
    let num_beams = params.num_beams.max(1);
    let mut beams = vec![Beam {
        tokens: vec![start_token],
        score: 0.0,
    }];
    let mut finished: Vec<(Vec<u32>, f64)> = Vec::new();

    for _ in 0..params.max_length {
        // (cumulative log-prob, beam index, token)
        let mut candidates: Vec<(f64, usize, u32)> = Vec::new();

        for (beam_idx, beam) in beams.iter().enumerate() {
            let mut logits = step(&beam.tokens)?;
            apply_repetition_penalty(&mut logits, &beam.tokens, params.repetition_penalty);

            if beam.generated() < params.min_length {
                if let Some(logit) = logits.get_mut(eos_token as usize) {
                    *logit = f32::NEG_INFINITY;
                }
            }
            for token in banned_ngram_tokens(&beam.tokens, params.no_repeat_ngram_size) {
                if let Some(logit) = logits.get_mut(token as usize) {
                    *logit = f32::NEG_INFINITY;
                }
            }

            let log_probs = log_softmax(&logits);
            for (token, log_prob) in top_k(&log_probs, 2 * num_beams) {
                candidates.push((beam.score + log_prob, beam_idx, token));
            }
        }

        if candidates.is_empty() {
            break;
        }

        candidates.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });

        let mut next = Vec::with_capacity(num_beams);
        for (rank, (score, beam_idx, token)) in candidates.into_iter().enumerate() {
            let parent = &beams[beam_idx];
            if token == eos_token {
                if rank < num_beams {
                    finished.push((
                        parent.tokens[1..].to_vec(),
                        normalized_score(score, parent.generated(), params.length_penalty),
                    ));
                }
                continue;
            }
            let mut tokens = parent.tokens.clone();
            tokens.push(token);
            next.push(Beam { tokens, score });
            if next.len() == num_beams {
                break;
            }
        }

        beams = next;
        if beams.is_empty() || (params.early_stopping && finished.len() >= num_beams) {
            break;
        }
    }

    if finished.len() < num_beams {
        for beam in &beams {
            finished.push((
                beam.tokens[1..].to_vec(),
                normalized_score(beam.score, beam.generated(), params.length_penalty),
            ));
        }
    }

    let best = finished
        .into_iter()
        .fold(None::<(Vec<u32>, f64)>, |best, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        });
    Ok(best.map(|(tokens, _)| tokens).unwrap_or_default())
}

fn normalized_score(score: f64, generated: usize, length_penalty: f64) -> f64 {
    score / (generated.max(1) as f64).powf(length_penalty)
}

/// Divide positive logits and multiply negative ones for tokens already seen
pub fn apply_repetition_penalty(logits: &mut [f32], seen: &[u32], penalty: f32) {
    if (penalty - 1.0).abs() < f32::EPSILON {
        return;
    }
    let unique: HashSet<u32> = seen.iter().copied().collect();
    for token in unique {
        if let Some(logit) = logits.get_mut(token as usize) {
            *logit = if *logit > 0.0 {
                *logit / penalty
            } else {
                *logit * penalty
            };
        }
    }
}

/// Tokens that would complete an n-gram already present in `tokens`
pub fn banned_ngram_tokens(tokens: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || tokens.len() + 1 < n {
        return Vec::new();
    }
    let prefix = &tokens[tokens.len() + 1 - n..];
    tokens
        .windows(n)
        .filter(|window| &window[..n - 1] == prefix)
        .map(|window| window[n - 1])
        .collect()
}

fn log_softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .filter(|l| l.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![f64::NEG_INFINITY; logits.len()];
    }
    let max = max as f64;
    let sum: f64 = logits
        .iter()
        .filter(|l| l.is_finite())
        .map(|&l| (l as f64 - max).exp())
        .sum();
    let log_sum = sum.ln() + max;
    logits
        .iter()
        .map(|&l| {
            if l.is_finite() {
                l as f64 - log_sum
            } else {
                f64::NEG_INFINITY
            }
        })
        .collect()
}

/// Best `k` finite entries, highest first, ties by lower token id
fn top_k(log_probs: &[f64], k: usize) -> Vec<(u32, f64)> {
    let mut indexed: Vec<(u32, f64)> = log_probs
        .iter()
        .enumerate()
        .filter(|(_, lp)| lp.is_finite())
        .map(|(i, &lp)| (i as u32, lp))
        .collect();
    indexed.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    indexed.truncate(k);
    indexed
}
