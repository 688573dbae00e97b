//! Jobscout engine: browser sessions, scoring, output sinks and the worker pools.
mod browser;
mod error;
mod fetch;
mod pipeline;
mod profile;
mod scoring;
mod serp;
mod sink;

pub use browser::{Browser, BrowserSession, HttpBrowser, PageControl};
pub use error::{PipelineError, ProfileError, ScoringError, SinkError, TransportError};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use pipeline::{
    Collaborators, Pipeline, PipelineSettings, RunSummary, ShutdownHandle, StatusRenderer,
};
pub use profile::extract_profile_text;
pub use scoring::{build_prompt, parse_verdict, OllamaScorer, OllamaSettings, Scorer};
pub use serp::{ResultsPage, ResultsParser, SearchHit, SearxParser};
pub use sink::{
    ensure_output_dir, CsvSink, OutputPaths, OutputSinks, AUDIT_HEADER, FAILURE_SENTINEL,
    FILTERED_HEADER, UNFILTERED_HEADER,
};
