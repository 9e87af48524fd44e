//! Corpus files: a manifest, optional comparator options, and a list of cases.

use super::case::MrupCase;
use super::harness::{BatchResult, MrupHarness};
use super::{ConformanceError, ConformanceResult};
use crate::config::CompareOptions;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Corpus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorpusManifest {
    /// Format version of the corpus file.
    pub format_version: String,
    /// Engine the results were captured from, e.g. `sqlite 3.45.1`.
    #[serde(default)]
    pub engine: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A corpus of MRUP cases.
#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
    /// Corpus metadata.
    pub manifest: CorpusManifest,
    /// Comparator options for every case.
    #[serde(default)]
    pub options: CompareOptions,
    /// Cases in file order.
    pub cases: Vec<MrupCase>,
}

impl Corpus {
    /// Parse a corpus from JSON text.
    pub fn from_json(text: &str) -> ConformanceResult<Self> {
        let corpus: Corpus = serde_json::from_str(text)
            .map_err(|e| ConformanceError::Parse(format!("corpus: {}", e)))?;
        let mut seen = HashSet::with_capacity(corpus.cases.len());
        for case in &corpus.cases {
            if !seen.insert(case.id.as_str()) {
                return Err(ConformanceError::Parse(format!(
                    "duplicate case id '{}'",
                    case.id
                )));
            }
        }
        Ok(corpus)
    }
}

/// Runs every case of a corpus.
#[derive(Debug, Clone)]
pub struct CorpusRunner {
    corpus: Corpus,
    harness: MrupHarness,
}

impl CorpusRunner {
    /// Load a corpus from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> ConformanceResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ConformanceError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(Corpus::from_json(&text)?))
    }

    /// Build a runner for an already parsed corpus.
    pub fn new(corpus: Corpus) -> Self {
        let harness = MrupHarness::new(corpus.options);
        Self { corpus, harness }
    }

    /// The corpus manifest.
    pub fn manifest(&self) -> &CorpusManifest {
        &self.corpus.manifest
    }

    /// Number of cases.
    pub fn case_count(&self) -> usize {
        self.corpus.cases.len()
    }

    /// The cases in file order.
    pub fn cases(&self) -> &[MrupCase] {
        &self.corpus.cases
    }

    /// Run all cases.
    pub fn run_all(&self) -> BatchResult {
        info!(
            format_version = %self.corpus.manifest.format_version,
            engine = self.corpus.manifest.engine.as_deref().unwrap_or("unknown"),
            cases = self.case_count(),
            "running corpus"
        );
        self.harness.run_batch(&self.corpus.cases)
    }
}
