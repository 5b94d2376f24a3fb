//! Named-document collection.
//!
//! Documents are kept as chunk text. Every add or remove rebuilds the shared
//! vocabulary and all chunk vectors from scratch; there is no incremental
//! path, so the index is always what a fresh run over the current documents
//! would produce.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ConfigError, EmbeddingConfig};
use crate::diagnostics::{default_sink, DiagnosticsSink};
use crate::embedding::chunker::chunk_text;
use crate::embedding::pipeline::{EmbeddedChunk, EmbeddingOutput, EmbeddingPipeline};
use crate::embedding::vocabulary::Vocabulary;
use crate::error::ProcessingWarning;
use crate::retrieval::{RankedChunk, RetrievalOptions, Retriever};

/// A ranked chunk plus the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusHit {
    pub document: String,
    #[serde(flatten)]
    pub chunk: RankedChunk,
}

#[derive(Debug, Clone)]
struct Document {
    name: String,
    chunks: Vec<String>,
}

/// Built index over all documents.
struct CorpusIndex {
    output: EmbeddingOutput,
    /// Owning document name per pipeline input position.
    owners: Vec<String>,
    retriever: Retriever,
}

/// Collection of named documents sharing one vocabulary.
pub struct Corpus {
    pipeline: EmbeddingPipeline,
    sink: Arc<dyn DiagnosticsSink>,
    documents: Vec<Document>,
    index: Option<CorpusIndex>,
}

impl Corpus {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            pipeline: EmbeddingPipeline::new(config),
            sink: default_sink(),
            documents: Vec::new(),
            index: None,
        }
    }

    /// Replace the diagnostics sink (used by embedding and ranking).
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.pipeline = self.pipeline.with_sink(sink.clone());
        self.sink = sink;
        self.rebuild();
        self
    }

    pub fn config(&self) -> &EmbeddingConfig {
        self.pipeline.config()
    }

    pub fn config_errors(&self) -> &[ConfigError] {
        self.pipeline.config_errors()
    }

    /// Add a document, replacing any document with the same name.
    pub fn add_document(&mut self, name: &str, text: &str) {
        let chunks = chunk_text(text, self.config().processing_limits.max_chunk_size);
        self.insert(name, chunks);
    }

    /// Add a document from pre-split chunks.
    pub fn add_chunks<S: AsRef<str>>(&mut self, name: &str, chunks: &[S]) {
        let chunks = chunks.iter().map(|c| c.as_ref().to_string()).collect();
        self.insert(name, chunks);
    }

    /// Remove a document by name. Returns whether it existed.
    pub fn remove_document(&mut self, name: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.name != name);
        let removed = self.documents.len() != before;
        if removed {
            self.rebuild();
        }
        removed
    }

    pub fn document_names(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.iter().any(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Embedded chunks across all documents (zero-vector chunks excluded).
    pub fn chunks(&self) -> &[EmbeddedChunk] {
        match self.index {
            Some(ref index) => &index.output.chunks,
            None => &[],
        }
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.index.as_ref().map(|i| &i.output.vocabulary)
    }

    /// Warnings from the last rebuild.
    pub fn warnings(&self) -> &[ProcessingWarning] {
        match self.index {
            Some(ref index) => &index.output.warnings,
            None => &[],
        }
    }

    /// Rank chunks from every document against `query`.
    pub fn query(&self, query: &str, options: &RetrievalOptions) -> Vec<CorpusHit> {
        let Some(ref index) = self.index else {
            return Vec::new();
        };
        index
            .retriever
            .rank(query, &index.output.chunks, &index.output.vocabulary, options)
            .into_iter()
            .map(|chunk| CorpusHit {
                document: index
                    .owners
                    .get(chunk.metadata.position)
                    .cloned()
                    .unwrap_or_default(),
                chunk,
            })
            .collect()
    }

    fn insert(&mut self, name: &str, chunks: Vec<String>) {
        let document = Document {
            name: name.to_string(),
            chunks,
        };
        match self.documents.iter_mut().find(|d| d.name == name) {
            Some(existing) => *existing = document,
            None => self.documents.push(document),
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        if self.documents.is_empty() {
            self.index = None;
            return;
        }

        let mut owners = Vec::new();
        let mut texts: Vec<&str> = Vec::new();
        for document in &self.documents {
            for chunk in &document.chunks {
                owners.push(document.name.clone());
                texts.push(chunk);
            }
        }

        let output = self.pipeline.embed_chunks(&texts);
        info!(
            documents = self.documents.len(),
            chunks = output.chunks.len(),
            terms = output.vocabulary.len(),
            "corpus rebuilt"
        );
        let retriever = Retriever::for_output(&output).with_sink(self.sink.clone());
        self.index = Some(CorpusIndex {
            output,
            owners,
            retriever,
        });
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new(&EmbeddingConfig::default())
    }
}
