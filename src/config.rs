use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::compare::DEFAULT_TOP_N;
use crate::model::download;

/// How many items of each set the terminal shows before "...".
pub const DEFAULT_PREVIEW: usize = 5;

/// Which language model annotates documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelBackend {
    /// Rule-based lexical model (default) — no downloads
    Lexical,
    /// Sentence embeddings (all-MiniLM-L6-v2) for similarity
    Embedding,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command
/// line flags override these values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which language model to use (default: Lexical)
    pub model_backend: ModelBackend,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// Keywords kept per document before comparing
    pub top_n: usize,
    /// Items shown per set in terminal output
    pub preview: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let model_backend = match env::var("DOCDIFF_MODEL").as_deref() {
            Ok("embedding") => ModelBackend::Embedding,
            Ok("lexical") | Err(_) => ModelBackend::Lexical,
            Ok(other) => anyhow::bail!(
                "Unknown DOCDIFF_MODEL value: {other:?} (expected \"lexical\" or \"embedding\")"
            ),
        };

        let model_dir = env::var("DOCDIFF_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        let top_n = parse_count("DOCDIFF_TOP_N", DEFAULT_TOP_N)?;
        if top_n == 0 {
            anyhow::bail!("DOCDIFF_TOP_N must be at least 1");
        }

        Ok(Self {
            model_backend,
            model_dir,
            top_n,
            preview: parse_count("DOCDIFF_PREVIEW", DEFAULT_PREVIEW)?,
        })
    }

    /// Check that the embedding model files are on disk.
    /// Call this before loading the embedding backend.
    pub fn require_embedding_model(&self) -> Result<()> {
        if !download::embedding_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `docdiff download-model` to download them.\n\
                 Or set DOCDIFF_MODEL=lexical to use the built-in lexical model.",
                download::embedding_model_dir(&self.model_dir).display()
            );
        }
        Ok(())
    }
}

/// Read a non-negative integer from the environment, falling back to
/// `default` when unset.
fn parse_count(var: &str, default: usize) -> Result<usize> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| {
            anyhow::anyhow!("{var} must be a non-negative integer, got {value:?}")
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_default_when_unset() {
        let value = parse_count("DOCDIFF_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_require_embedding_model_missing() {
        let config = Config {
            model_backend: ModelBackend::Embedding,
            model_dir: std::env::temp_dir().join("docdiff-config-test-nonexistent"),
            top_n: DEFAULT_TOP_N,
            preview: DEFAULT_PREVIEW,
        };
        let err = config.require_embedding_model().unwrap_err();
        assert!(err.to_string().contains("download-model"));
    }
}
