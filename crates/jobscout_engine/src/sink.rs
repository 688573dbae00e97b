use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use jobscout_core::{AnalysisOutcome, JobRecord};
use tempfile::NamedTempFile;

use crate::SinkError;

pub const UNFILTERED_HEADER: [&str; 5] =
    ["Job Title", "Company Name", "Source Link", "Country", "Tier"];

pub const FILTERED_HEADER: [&str; 8] = [
    "score",
    "reason",
    "Job Title",
    "Company Name",
    "Source Link",
    "Country",
    "Tier",
    "matched_keywords",
];

pub const AUDIT_HEADER: [&str; 9] = [
    "is_match",
    "score",
    "reason",
    "matched_keywords",
    "Job Title",
    "Company Name",
    "Source Link",
    "Country",
    "Tier",
];

/// First cell of an audit row for a record the scorer could not judge.
pub const FAILURE_SENTINEL: &str = "LLM_PROCESS_FAILURE";
const NOT_AVAILABLE: &str = "N/A";

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), SinkError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| SinkError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(SinkError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| SinkError::OutputDir(e.to_string()))?;
    }
    // Writability probe.
    NamedTempFile::new_in(dir).map_err(|e| SinkError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Append-only CSV file. Rows from concurrent writers never interleave and each
/// row is flushed before `append` returns.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl CsvSink {
    /// Truncates any previous file at `path` and writes `header`.
    pub fn create(path: impl Into<PathBuf>, header: &[&str]) -> Result<Self, SinkError> {
        let path = path.into();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(header)?;
        writer.flush()?;
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn append<I, S>(&self, row: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Locations of the three result files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub unfiltered: PathBuf,
    pub filtered: PathBuf,
    pub audit: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path, unfiltered: &str, filtered: &str, audit: &str) -> Self {
        Self {
            unfiltered: dir.join(unfiltered),
            filtered: dir.join(filtered),
            audit: dir.join(audit),
        }
    }

    /// Parent directories that must exist before the sinks are opened.
    fn directories(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = [&self.unfiltered, &self.filtered, &self.audit]
            .into_iter()
            .map(|path| match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            })
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(
            Path::new("."),
            "company_list_unfiltered.csv",
            "company_list_filtered.csv",
            "llm_analysis_log.csv",
        )
    }
}

/// The three result sinks of a run: every discovery, every match, and one audit
/// row per analyzed record.
#[derive(Debug)]
pub struct OutputSinks {
    unfiltered: CsvSink,
    filtered: CsvSink,
    audit: CsvSink,
}

impl OutputSinks {
    /// Creates the output directories and truncates the files, writing fresh headers.
    pub fn prepare(paths: &OutputPaths) -> Result<Self, SinkError> {
        for dir in paths.directories() {
            ensure_output_dir(dir)?;
        }
        Ok(Self {
            unfiltered: CsvSink::create(&paths.unfiltered, &UNFILTERED_HEADER)?,
            filtered: CsvSink::create(&paths.filtered, &FILTERED_HEADER)?,
            audit: CsvSink::create(&paths.audit, &AUDIT_HEADER)?,
        })
    }

    pub fn record_discovery(&self, job: &JobRecord) -> Result<(), SinkError> {
        self.unfiltered.append(record_cells(job))
    }

    /// Writes a match row; outcomes that are not matches are ignored.
    pub fn record_match(&self, job: &JobRecord, outcome: &AnalysisOutcome) -> Result<(), SinkError> {
        let AnalysisOutcome::Scored(result) = outcome else {
            return Ok(());
        };
        if !result.is_match {
            return Ok(());
        }
        let [title, company, url, country, tier] = record_cells(job);
        self.filtered.append([
            result.score.to_string().as_str(),
            result.reason.as_str(),
            title,
            company,
            url,
            country,
            tier,
            result.keywords_joined().as_str(),
        ])
    }

    pub fn record_audit(&self, job: &JobRecord, outcome: &AnalysisOutcome) -> Result<(), SinkError> {
        let [title, company, url, country, tier] = record_cells(job);
        match outcome {
            AnalysisOutcome::Scored(result) => self.audit.append([
                result.is_match.to_string().as_str(),
                result.score.to_string().as_str(),
                result.reason.as_str(),
                result.keywords_joined().as_str(),
                title,
                company,
                url,
                country,
                tier,
            ]),
            AnalysisOutcome::Failed { .. } => self.audit.append([
                FAILURE_SENTINEL,
                NOT_AVAILABLE,
                NOT_AVAILABLE,
                NOT_AVAILABLE,
                title,
                company,
                url,
                country,
                tier,
            ]),
        }
    }
}

fn record_cells(job: &JobRecord) -> [&str; 5] {
    [
        job.title.as_str(),
        job.company.as_str(),
        job.source_url.as_str(),
        job.country.as_str(),
        job.tier.as_str(),
    ]
}
