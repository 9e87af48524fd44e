//! Conformance harness for MRUP cases.
//!
//! Cases carry the three captured window results and the verdict they
//! expect. The harness runs them through the comparator, and any case whose
//! verdict differs from its expectation yields a [`ReproBundle`].

mod case;
pub mod corpus;
mod harness;
mod repro;

pub use case::{CaseInputs, CaseQueries, MrupCase};
pub use corpus::{Corpus, CorpusManifest, CorpusRunner};
pub use harness::{BatchResult, CaseResult, MrupHarness, TestResult};
pub use repro::ReproBundle;

use crate::error::ErrorCode;

/// Result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Errors raised while loading cases or corpora.
#[derive(Debug)]
pub enum ConformanceError {
    /// File could not be read or written.
    Io(String),
    /// File content is not a valid corpus.
    Parse(String),
    /// Comparator input violation.
    Oracle(ErrorCode),
}

impl ConformanceError {
    /// Numeric code in the [`ErrorCode`] scheme.
    pub fn code(&self) -> u32 {
        match self {
            Self::Io(_) => 101,
            Self::Parse(_) => 100,
            Self::Oracle(e) => e.code(),
        }
    }
}

impl std::fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Parse(msg) => write!(f, "invalid corpus: {}", msg),
            Self::Oracle(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConformanceError {}

impl From<ErrorCode> for ConformanceError {
    fn from(e: ErrorCode) -> Self {
        Self::Oracle(e)
    }
}
