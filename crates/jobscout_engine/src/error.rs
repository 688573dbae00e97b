use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure while loading or rendering a results page. Local to one search task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("element `{selector}` not present after {waited:?}")]
    ElementMissing { selector: String, waited: Duration },
    #[error("no page loaded in this session")]
    NoPage,
    #[error("browser session unavailable: {0}")]
    Session(String),
}

/// Failure to obtain a verdict for one record. Recorded, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("scoring request failed: {0}")]
    Request(String),
    #[error("scoring backend returned status {0}")]
    Status(u16),
    #[error("malformed scoring response: {0}")]
    MalformedResponse(String),
    #[error("scoring response is missing `{0}`")]
    MissingField(&'static str),
    #[error("scoring runtime unavailable: {0}")]
    Runtime(String),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("could not read profile {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not extract text from {path:?}: {message}")]
    Extraction { path: PathBuf, message: String },
    #[error("profile {0:?} contains no extractable text")]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Run-level failures. Everything here aborts before any worker starts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline settings: {0}")]
    InvalidSettings(String),
    #[error("candidate profile unavailable: {0}")]
    Profile(#[from] ProfileError),
    #[error("scoring backend unreachable: {0}")]
    ScorerUnreachable(ScoringError),
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(TransportError),
    #[error("output sinks unavailable: {0}")]
    Sink(#[from] SinkError),
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}
