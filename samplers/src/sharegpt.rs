//! ShareGPT dataset sampling

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Deserialize;
use tokenizers::Tokenizer;

use serving_bench_core::{PromptRequest, RequestSource, SourceError};

/// Prompts or completions shorter than this are too trivial to measure
const MIN_TOKENS: usize = 4;
/// Prompts longer than this are pruned
const MAX_PROMPT_TOKENS: usize = 1024;
/// Prompt + completion budgets past this are pruned
const MAX_TOTAL_TOKENS: usize = 2048;

#[derive(Debug, Deserialize)]
struct ShareGptRecord {
    #[serde(default)]
    conversations: Vec<ShareGptTurn>,
}

#[derive(Debug, Deserialize)]
struct ShareGptTurn {
    value: String,
}

/// Samples prompt/completion pairs from a ShareGPT-format dataset.
///
/// The first turn of each conversation becomes the prompt and the second
/// the target completion; conversations with fewer than two turns are
/// discarded at load time. Token lengths are measured with the configured
/// tokenizer, and pairs outside the usable length window are pruned during
/// sampling.
pub struct ShareGptSource {
    pairs: Vec<(String, String)>,
    tokenizer: Tokenizer,
}

impl ShareGptSource {
    /// Load a dataset file and pair it with a tokenizer.
    pub fn load(dataset: &Path, tokenizer: Tokenizer) -> Result<Self, SourceError> {
        let raw = fs::read_to_string(dataset)?;
        let records: Vec<ShareGptRecord> =
            serde_json::from_str(&raw).map_err(|e| SourceError::Decode(e.to_string()))?;

        let pairs: Vec<(String, String)> = records
            .into_iter()
            .filter_map(|record| {
                let mut turns = record.conversations.into_iter();
                match (turns.next(), turns.next()) {
                    (Some(prompt), Some(completion)) => Some((prompt.value, completion.value)),
                    _ => None,
                }
            })
            .collect();

        tracing::debug!(
            dataset = %dataset.display(),
            candidates = pairs.len(),
            "loaded dataset"
        );

        Ok(Self { pairs, tokenizer })
    }

    fn token_count(&self, text: &str) -> Result<usize, SourceError> {
        self.tokenizer
            .encode(text, false)
            .map(|encoding| encoding.get_ids().len())
            .map_err(|e| SourceError::Tokenizer(e.to_string()))
    }
}

impl RequestSource for ShareGptSource {
    fn name(&self) -> &str {
        "sharegpt"
    }

    fn sample(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<PromptRequest>, SourceError> {
        let mut indices: Vec<usize> = (0..self.pairs.len()).collect();
        indices.shuffle(rng);

        let mut requests = Vec::with_capacity(count);
        for index in indices {
            if requests.len() == count {
                break;
            }

            let (prompt, completion) = &self.pairs[index];
            let prompt_tokens = self.token_count(prompt)?;
            let output_tokens = self.token_count(completion)?;

            if prompt_tokens < MIN_TOKENS || output_tokens < MIN_TOKENS {
                continue;
            }
            if prompt_tokens > MAX_PROMPT_TOKENS
                || prompt_tokens + output_tokens > MAX_TOTAL_TOKENS
            {
                continue;
            }

            requests.push(PromptRequest::new(
                prompt.clone(),
                prompt_tokens,
                output_tokens,
            ));
        }

        if requests.len() < count {
            return Err(SourceError::Exhausted {
                requested: count,
                available: requests.len(),
            });
        }

        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use std::io::Write;
    use tokenizers::models::wordlevel::WordLevel;
    use tokenizers::pre_tokenizers::whitespace::Whitespace;

    /// Whitespace word-count tokenizer: every word maps to [UNK], so the
    /// token count of a text is simply its word count.
    fn word_tokenizer() -> Tokenizer {
        let mut vocab = HashMap::new();
        vocab.insert("[UNK]".to_string(), 0u32);

        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("[UNK]".to_string())
            .build()
            .unwrap();

        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Whitespace {});
        tokenizer
    }

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    fn conversation(prompt: &str, completion: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "test",
            "conversations": [
                {"from": "human", "value": prompt},
                {"from": "gpt", "value": completion}
            ]
        })
    }

    fn write_dataset(records: &[serde_json::Value]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(records).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn test_sample_returns_exact_count_with_lengths() {
        let records: Vec<_> = (0..8)
            .map(|i| conversation(&words(10 + i), &words(20)))
            .collect();
        let file = write_dataset(&records);

        let source = ShareGptSource::load(file.path(), word_tokenizer()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let requests = source.sample(5, &mut rng).unwrap();

        assert_eq!(requests.len(), 5);
        for request in &requests {
            assert!(request.prompt_tokens >= 10);
            assert_eq!(request.output_tokens, 20);
        }
    }

    #[test]
    fn test_sampling_is_deterministic_for_a_seed() {
        let records: Vec<_> = (0..20)
            .map(|i| conversation(&words(5 + i), &words(10)))
            .collect();
        let file = write_dataset(&records);
        let source = ShareGptSource::load(file.path(), word_tokenizer()).unwrap();

        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let sample_a = source.sample(6, &mut rng_a).unwrap();
        let sample_b = source.sample(6, &mut rng_b).unwrap();

        let prompts_a: Vec<_> = sample_a.iter().map(|r| r.prompt.clone()).collect();
        let prompts_b: Vec<_> = sample_b.iter().map(|r| r.prompt.clone()).collect();
        assert_eq!(prompts_a, prompts_b);
    }

    #[test]
    fn test_short_pairs_are_pruned() {
        let records = vec![
            conversation(&words(2), &words(20)),  // prompt too short
            conversation(&words(20), &words(2)),  // completion too short
            conversation(&words(20), &words(20)), // usable
        ];
        let file = write_dataset(&records);
        let source = ShareGptSource::load(file.path(), word_tokenizer()).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let requests = source.sample(1, &mut rng).unwrap();
        assert_eq!(requests[0].prompt_tokens, 20);

        // Only one record survives pruning, so asking for two must fail.
        let mut rng = StdRng::seed_from_u64(0);
        let result = source.sample(2, &mut rng);
        assert!(matches!(
            result,
            Err(SourceError::Exhausted {
                requested: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_oversized_pairs_are_pruned() {
        let records = vec![
            conversation(&words(1030), &words(20)), // prompt too long
            conversation(&words(1000), &words(1100)), // combined too long
            conversation(&words(20), &words(20)),
        ];
        let file = write_dataset(&records);
        let source = ShareGptSource::load(file.path(), word_tokenizer()).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let requests = source.sample(1, &mut rng).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt_tokens, 20);
    }

    #[test]
    fn test_single_turn_conversations_are_discarded() {
        let records = vec![
            serde_json::json!({"conversations": [{"from": "human", "value": words(20)}]}),
            serde_json::json!({"conversations": []}),
            conversation(&words(20), &words(20)),
        ];
        let file = write_dataset(&records);
        let source = ShareGptSource::load(file.path(), word_tokenizer()).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let requests = source.sample(1, &mut rng).unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn test_undersized_dataset_is_signaled() {
        let records = vec![conversation(&words(10), &words(10))];
        let file = write_dataset(&records);
        let source = ShareGptSource::load(file.path(), word_tokenizer()).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        assert!(source.sample(50, &mut rng).is_err());
    }

    #[test]
    fn test_malformed_dataset_is_a_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();

        let result = ShareGptSource::load(file.path(), word_tokenizer());
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }
}
