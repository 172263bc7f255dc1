use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Split I/O error at {path}: {source}")]
    SplitIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Provider timed out after {waited:?} while {stage}")]
    ProviderTimeout { stage: String, waited: Duration },

    #[error("Provider returned an empty result")]
    ProviderEmptyResult,

    #[error("Provider session error: {0}")]
    ProviderSession(String),

    #[error("Incomplete run: {} of {total} chunks missing ({missing:?})", .missing.len())]
    IncompleteRun { total: usize, missing: Vec<usize> },

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid language pair: source and target are both {0}")]
    SameLanguage(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Fatal(Box<FatalPipelineError>),
}

impl TranslatorError {
    pub fn split_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TranslatorError::SplitIo {
            path: path.into(),
            source,
        }
    }

    pub fn timeout(stage: impl Into<String>, waited: Duration) -> Self {
        TranslatorError::ProviderTimeout {
            stage: stage.into(),
            waited,
        }
    }

    /// True for the provider-side failure kinds that end a run.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            TranslatorError::ProviderTimeout { .. }
                | TranslatorError::ProviderEmptyResult
                | TranslatorError::ProviderSession(_)
                | TranslatorError::HttpError(_)
        )
    }
}

/// A chunk failure that stops the run. Completed units stay on disk and the
/// next run resumes after them.
#[derive(Error, Debug)]
#[error("chunk {index}/{total} failed: {source}")]
pub struct FatalPipelineError {
    pub index: usize,
    pub total: usize,
    #[source]
    pub source: TranslatorError,
}

impl From<FatalPipelineError> for TranslatorError {
    fn from(err: FatalPipelineError) -> Self {
        TranslatorError::Fatal(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
