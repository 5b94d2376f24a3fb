use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lexrag::{
    BoostConfig, Corpus, CorpusStats, EmbeddedChunk, EmbeddingConfig, EmbeddingConfigOverride,
    EmbeddingPipeline, Language, ProcessingWarning, RetrievalOptions,
};

#[derive(Parser)]
#[command(name = "lexrag", about = "Lexical TF-IDF retrieval over local documents")]
struct Cli {
    /// YAML embedding config (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Declared document language (en, pt); detected per chunk when omitted
    #[arg(short, long, global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk and vectorize a file, print a JSON summary
    Embed {
        file: PathBuf,

        /// Include every chunk with its vector
        #[arg(long)]
        vectors: bool,
    },
    /// Rank the chunks of a file against a query
    Query {
        file: PathBuf,
        query: String,

        #[arg(short = 'k', long, default_value_t = lexrag::retrieval::DEFAULT_TOP_K)]
        top_k: usize,

        #[arg(long, default_value_t = lexrag::retrieval::DEFAULT_MIN_SIMILARITY)]
        min_similarity: f32,

        /// Apply metadata boosts (language match, chunk length, n-gram richness)
        #[arg(long)]
        boost: bool,
    },
}

#[derive(Serialize)]
struct EmbedSummary<'a> {
    file: String,
    chunks: usize,
    vocabulary_size: usize,
    stats: CorpusStats,
    config: &'a EmbeddingConfig,
    config_errors: Vec<String>,
    warnings: &'a [ProcessingWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    embedded: Option<&'a [EmbeddedChunk]>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexrag=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.language)?;

    match cli.command {
        Command::Embed { file, vectors } => embed(&file, &config, vectors),
        Command::Query {
            file,
            query,
            top_k,
            min_similarity,
            boost,
        } => {
            let mut options = RetrievalOptions::default()
                .with_top_k(top_k)
                .with_min_similarity(min_similarity);
            if boost {
                options = options.with_boost(BoostConfig {
                    preferred_language: cli.language,
                    ..Default::default()
                });
            }
            run_query(&file, &query, &config, &options)
        }
    }
}

fn load_config(path: Option<&Path>, language: Option<Language>) -> Result<EmbeddingConfig> {
    let base = match path {
        Some(p) => EmbeddingConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None => EmbeddingConfig::default(),
    };
    let overrides = EmbeddingConfigOverride {
        language,
        ..Default::default()
    };
    let (config, errors) = overrides.apply(&base);
    for e in &errors {
        warn!("using default for {e}");
    }
    Ok(config)
}

fn read_document(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn embed(file: &Path, config: &EmbeddingConfig, vectors: bool) -> Result<()> {
    let text = read_document(file)?;
    let output = EmbeddingPipeline::new(config).generate_embeddings(&text);
    let summary = EmbedSummary {
        file: file.display().to_string(),
        chunks: output.chunks.len(),
        vocabulary_size: output.vocabulary.len(),
        stats: CorpusStats::from_chunks(&output.texts()),
        config: &output.config,
        config_errors: output.config_errors.iter().map(|e| e.to_string()).collect(),
        warnings: &output.warnings,
        embedded: vectors.then_some(output.chunks.as_slice()),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_query(
    file: &Path,
    query: &str,
    config: &EmbeddingConfig,
    options: &RetrievalOptions,
) -> Result<()> {
    let text = read_document(file)?;
    let mut corpus = Corpus::new(config);
    corpus.add_document(&file.display().to_string(), &text);
    for w in corpus.warnings() {
        warn!(reason = w.reason(), "{w}");
    }
    let hits = corpus.query(query, options);
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
