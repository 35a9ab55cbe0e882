use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use docdiff::compare::{ComparisonEngine, EntityExtractor, KeywordExtractor};
use docdiff::config::{Config, ModelBackend};
use docdiff::document::AnnotatedDocument;
use docdiff::model::{download, EmbeddingModel, LanguageModel, LexicalModel};
use docdiff::output::json::ComparisonReport;
use docdiff::output::terminal;

/// docdiff: compare two documents.
///
/// Reports how similar two documents are, which named entities and
/// keywords they share, and which are unique to each.
#[derive(Parser)]
#[command(name = "docdiff", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents (PDF or plain text)
    Compare {
        /// First document
        file1: PathBuf,

        /// Second document
        file2: PathBuf,

        /// Keywords kept per document before comparing (default: 10)
        #[arg(long)]
        top_n: Option<NonZeroUsize>,

        /// Items shown per set before "..." (default: 5)
        #[arg(long)]
        preview: Option<usize>,

        /// Language model to annotate with
        #[arg(long, value_enum)]
        model: Option<ModelBackend>,

        /// Print the complete result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a document's top keywords with counts
    Keywords {
        file: PathBuf,

        /// Number of keywords to show (default: 10)
        #[arg(long)]
        top_n: Option<NonZeroUsize>,
    },

    /// List a document's named entities
    Entities { file: PathBuf },

    /// Download the sentence embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("docdiff=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            file1,
            file2,
            top_n,
            preview,
            model,
            json,
        } => {
            let config = Config::load()?;
            let top_n = top_n.map_or(config.top_n, NonZeroUsize::get);
            let preview = preview.unwrap_or(config.preview);
            let model = create_model(&config, model.unwrap_or(config.model_backend))?;

            let doc1 = annotate_file(model.as_ref(), &file1)?;
            let doc2 = annotate_file(model.as_ref(), &file2)?;

            let engine = ComparisonEngine::new(model.as_ref()).with_top_n(top_n);
            let outcome = engine.compare(&doc1, &doc2);

            match (outcome, json) {
                (Ok(result), false) => terminal::display_comparison(&result, preview),
                (Ok(result), true) => {
                    let features = result.features();
                    println!(
                        "{}",
                        ComparisonReport::new(Ok(result.similarity), &features).to_json()?
                    );
                }
                (Err(e), as_json) => {
                    warn!(error = %e, "Similarity unavailable");
                    let features = engine.compare_features(&doc1, &doc2);
                    if as_json {
                        println!("{}", ComparisonReport::new(Err(&e), &features).to_json()?);
                    } else {
                        terminal::display_unavailable(&e, &features, preview);
                    }
                }
            }
        }

        Commands::Keywords { file, top_n } => {
            let config = Config::load()?;
            let top_n = top_n.map_or(config.top_n, NonZeroUsize::get);
            let model = LexicalModel::new()?;

            let doc = annotate_file(&model, &file)?;
            let keywords = KeywordExtractor::new(top_n).extract(&doc);
            terminal::display_keywords(&keywords);
        }

        Commands::Entities { file } => {
            let model = LexicalModel::new()?;

            let doc = annotate_file(&model, &file)?;
            info!(
                unique = EntityExtractor.extract(&doc).len(),
                spans = doc.entities().len(),
                "Recognized entities"
            );
            terminal::display_entities(doc.entities());
        }

        Commands::DownloadModel => {
            let config = Config::load()?;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", config.model_dir.display());

            download::download_model(&config.model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `docdiff compare --model embedding <FILE1> <FILE2>`.");
        }
    }

    Ok(())
}

/// Create the language model for the chosen backend.
fn create_model(config: &Config, backend: ModelBackend) -> Result<Box<dyn LanguageModel>> {
    match backend {
        ModelBackend::Lexical => {
            info!("Using built-in lexical model");
            Ok(Box::new(LexicalModel::new()?))
        }
        ModelBackend::Embedding => {
            config.require_embedding_model()?;
            info!("Using sentence embedding model");
            let dir = download::embedding_model_dir(&config.model_dir);
            Ok(Box::new(EmbeddingModel::load(&dir)?))
        }
    }
}

/// Extract a file's text and annotate it.
fn annotate_file(model: &dyn LanguageModel, path: &Path) -> Result<AnnotatedDocument> {
    let pages = docdiff::ingest::extract_path(path)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;

    info!(
        path = %path.display(),
        pages = pages.page_count(),
        "Extracted document text"
    );

    model
        .annotate(&pages.text())
        .with_context(|| format!("Failed to annotate {}", path.display()))
}
