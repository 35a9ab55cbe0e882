// Sentence embedding model using all-MiniLM-L6-v2.
//
// Token, tag, and entity annotations come from the lexical model; only the
// semantic vector changes. The text is split into word windows, each window
// is embedded with the sentence transformer (mean pooling over the attention
// mask), and the document vector is the mean of the window vectors.
//
// The model runs locally via ONNX. Download it with `docdiff download-model`.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::lexical::LexicalModel;
use super::traits::LanguageModel;
use crate::document::AnnotatedDocument;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Words per embedded window. Keeps most windows well under the model's
/// 512-token position limit.
const WINDOW_WORDS: usize = 128;

/// Hard cap on subword tokens per window, special tokens included.
const MAX_SEQ_LEN: usize = 512;

/// Windows per ONNX run. Bounds the size of a single inference on long
/// documents.
pub const EMBED_BATCH: usize = 32;

/// Language model whose similarity comes from sentence embeddings.
pub struct EmbeddingModel {
    lexical: LexicalModel,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl EmbeddingModel {
    /// Load the sentence embedding model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            anyhow::bail!(
                "Embedding model not found: {}\nRun `docdiff download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding tokenizer not found: {}\nRun `docdiff download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!(
                    "Failed to load embedding model from {}",
                    model_path.display()
                )
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;
        enable_truncation(&mut tokenizer)?;

        debug!(
            "Loaded sentence embedding model from {}",
            model_dir.display()
        );

        Ok(Self {
            lexical: LexicalModel::new()?,
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embed a batch of texts into 384-dimensional vectors.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings: Vec<_> = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if max_len == 0 {
            return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
        }

        // BERT inputs, padded with 0:
        //   input_ids: token IDs
        //   attention_mask: 1 for real tokens, 0 for padding
        //   token_type_ids: all zeros for single-sentence input
        let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

        for enc in &encodings {
            let ids = enc.get_ids();
            let mask = enc.get_attention_mask();
            let seq_len = ids.len();

            input_ids_flat.extend(ids.iter().map(|&id| id as i64));
            attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, seq_len));

            let pad_len = max_len - seq_len;
            input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
            attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        }

        let shape = [batch_size as i64, max_len as i64];

        let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
            .context("Failed to create input_ids tensor")?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
            .context("Failed to create attention_mask tensor")?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
            .context("Failed to create token_type_ids tensor")?;

        // Output is last_hidden_state: [batch, seq_len, 384]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("Embedding ONNX inference failed")?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract embedding output tensor")?;

            data.to_vec()
        };

        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut sum = vec![0.0_f64; EMBEDDING_DIM];
            let mut mask_sum = 0.0_f64;

            for j in 0..max_len {
                let mask_val = attention_mask_flat[i * max_len + j] as f64;
                if mask_val > 0.0 {
                    mask_sum += mask_val;
                    let offset = (i * max_len + j) * EMBEDDING_DIM;
                    for (k, slot) in sum.iter_mut().enumerate() {
                        *slot += hidden_states[offset + k] as f64 * mask_val;
                    }
                }
            }

            if mask_sum > 0.0 {
                for val in &mut sum {
                    *val /= mask_sum;
                }
            }

            embeddings.push(sum);
        }

        debug!(
            batch_size = batch_size,
            dim = EMBEDDING_DIM,
            "Computed sentence embeddings"
        );

        Ok(embeddings)
    }
}

impl LanguageModel for EmbeddingModel {
    fn name(&self) -> &str {
        "embedding"
    }

    fn annotate(&self, text: &str) -> Result<AnnotatedDocument> {
        let doc = self.lexical.annotate(text)?;

        // No content words means nothing meaningful to embed either
        if doc.vector().is_none() {
            return Ok(doc);
        }

        let windows = word_windows(text, WINDOW_WORDS);
        let embeddings = embed_in_batches(&windows, EMBED_BATCH, |batch| self.embed_batch(batch))?;
        Ok(doc.with_vector(Some(mean_embedding(&embeddings))))
    }
}

/// Let the tokenizer truncate to the model's limit so `[CLS]` and `[SEP]`
/// survive on over-long windows.
fn enable_truncation(tokenizer: &mut Tokenizer) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQ_LEN,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Failed to configure tokenizer truncation: {}", e))?;
    Ok(())
}

/// Run `embed` over `windows` at most `batch_size` at a time, returning one
/// vector per window in order.
pub fn embed_in_batches<F>(
    windows: &[String],
    batch_size: usize,
    mut embed: F,
) -> Result<Vec<Vec<f64>>>
where
    F: FnMut(&[String]) -> Result<Vec<Vec<f64>>>,
{
    let mut embeddings = Vec::with_capacity(windows.len());
    for (i, batch) in windows.chunks(batch_size.max(1)).enumerate() {
        debug!(batch = i, windows = batch.len(), "Embedding window batch");
        embeddings.extend(embed(batch)?);
    }
    Ok(embeddings)
}

/// Split text into windows of at most `size` whitespace-separated words.
pub fn word_windows(text: &str, size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(size.max(1)).map(|chunk| chunk.join(" ")).collect()
}

/// Compute the mean of multiple embedding vectors.
pub fn mean_embedding(embeddings: &[Vec<f64>]) -> Vec<f64> {
    if embeddings.is_empty() {
        return vec![0.0; EMBEDDING_DIM];
    }

    let n = embeddings.len() as f64;
    let mut mean = vec![0.0_f64; EMBEDDING_DIM];

    for emb in embeddings {
        for (slot, &val) in mean.iter_mut().zip(emb) {
            *slot += val;
        }
    }

    for val in &mut mean {
        *val /= n;
    }

    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_embedding_single() {
        let emb = vec![vec![1.0; EMBEDDING_DIM]];
        let mean = mean_embedding(&emb);
        assert_eq!(mean.len(), EMBEDDING_DIM);
        assert!((mean[0] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean_embedding_average() {
        let a = vec![2.0; EMBEDDING_DIM];
        let b = vec![4.0; EMBEDDING_DIM];
        let mean = mean_embedding(&[a, b]);
        assert!((mean[0] - 3.0).abs() < 1e-10);
        assert!((mean[EMBEDDING_DIM - 1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean_embedding_empty() {
        let mean = mean_embedding(&[]);
        assert_eq!(mean.len(), EMBEDDING_DIM);
        assert!(mean.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_word_windows() {
        let windows = word_windows("one two three four five", 2);
        assert_eq!(windows, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn test_word_windows_collapses_whitespace() {
        let windows = word_windows("  alpha\n\nbeta\tgamma ", 10);
        assert_eq!(windows, vec!["alpha beta gamma"]);
    }

    #[test]
    fn test_word_windows_empty() {
        assert!(word_windows("   ", 10).is_empty());
    }

    #[test]
    fn test_long_document_is_embedded_in_bounded_batches() {
        let text = vec!["word"; 20_000].join(" ");
        let windows = word_windows(&text, WINDOW_WORDS);
        assert_eq!(windows.len(), 157);

        let mut sizes = Vec::new();
        let embeddings = embed_in_batches(&windows, EMBED_BATCH, |batch| {
            sizes.push(batch.len());
            Ok(vec![vec![1.0; EMBEDDING_DIM]; batch.len()])
        })
        .unwrap();

        assert_eq!(embeddings.len(), windows.len());
        assert!(sizes.iter().all(|&n| n <= EMBED_BATCH), "{sizes:?}");
        assert_eq!(sizes, vec![32, 32, 32, 32, 29]);
    }

    #[test]
    fn test_embed_in_batches_keeps_order_and_stops_on_error() {
        let windows: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let embeddings = embed_in_batches(&windows, 2, |batch| {
            Ok(batch.iter().map(|w| vec![w.parse().unwrap()]).collect())
        })
        .unwrap();
        assert_eq!(
            embeddings,
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]]
        );

        let mut calls = 0;
        let result = embed_in_batches(&windows, 2, |_| {
            calls += 1;
            anyhow::bail!("inference failed")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_truncation_keeps_special_tokens() {
        let json = r#"{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": {
                "type": "BertProcessing",
                "sep": ["[SEP]", 102],
                "cls": ["[CLS]", 101]
            },
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "[UNK]": 0, "word": 7, "[CLS]": 101, "[SEP]": 102 },
                "unk_token": "[UNK]"
            }
        }"#;
        let mut tokenizer = Tokenizer::from_bytes(json).unwrap();
        enable_truncation(&mut tokenizer).unwrap();

        let text = vec!["word"; 1000].join(" ");
        let encoding = tokenizer.encode(text.as_str(), true).unwrap();
        let ids = encoding.get_ids();
        assert_eq!(ids.len(), MAX_SEQ_LEN);
        assert_eq!(ids[0], 101);
        assert_eq!(ids[MAX_SEQ_LEN - 1], 102);
    }

    #[test]
    fn test_load_missing_model_fails() {
        let dir = std::env::temp_dir().join("docdiff-test-no-embedding-model");
        let result = EmbeddingModel::load(&dir);
        assert!(result.is_err());
    }
}
