use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use jobscout_core::{AnalysisOutcome, AnalysisResult, JobRecord};
use jobscout_engine::{
    ensure_output_dir, extract_profile_text, CsvSink, OutputPaths, OutputSinks, ProfileError,
    AUDIT_HEADER, FILTERED_HEADER, UNFILTERED_HEADER,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn rows(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn job(url: &str) -> JobRecord {
    JobRecord {
        title: "Quantitative Analyst at Acme Capital".to_string(),
        company: "Acme Capital".to_string(),
        source_url: url.to_string(),
        country: "USA".to_string(),
        tier: "Tier 1".to_string(),
    }
}

fn paths(dir: &Path) -> OutputPaths {
    OutputPaths::in_dir(dir, "unfiltered.csv", "filtered.csv", "audit.csv")
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("taken");
    fs::write(&file, "x").unwrap();
    assert!(ensure_output_dir(&file).is_err());
}

#[test]
fn prepare_truncates_previous_run_and_writes_headers() {
    let temp = TempDir::new().unwrap();
    let paths = paths(temp.path());
    fs::write(&paths.audit, "stale,row\n").unwrap();

    OutputSinks::prepare(&paths).unwrap();

    assert_eq!(rows(&paths.unfiltered), vec![UNFILTERED_HEADER.map(String::from).to_vec()]);
    assert_eq!(rows(&paths.filtered), vec![FILTERED_HEADER.map(String::from).to_vec()]);
    assert_eq!(rows(&paths.audit), vec![AUDIT_HEADER.map(String::from).to_vec()]);
}

#[test]
fn match_writes_filtered_and_audit_rows() {
    let temp = TempDir::new().unwrap();
    let paths = paths(temp.path());
    let sinks = OutputSinks::prepare(&paths).unwrap();
    let record = job("https://boards.greenhouse.io/acme-capital/jobs/1");
    let outcome = AnalysisOutcome::Scored(AnalysisResult {
        is_match: true,
        score: 8,
        reason: "strong fit".to_string(),
        matched_keywords: vec!["python".to_string(), "finance".to_string()],
    });

    sinks.record_discovery(&record).unwrap();
    sinks.record_audit(&record, &outcome).unwrap();
    sinks.record_match(&record, &outcome).unwrap();

    assert_eq!(
        rows(&paths.unfiltered)[1],
        vec![
            "Quantitative Analyst at Acme Capital",
            "Acme Capital",
            "https://boards.greenhouse.io/acme-capital/jobs/1",
            "USA",
            "Tier 1"
        ]
    );
    assert_eq!(
        rows(&paths.filtered)[1],
        vec![
            "8",
            "strong fit",
            "Quantitative Analyst at Acme Capital",
            "Acme Capital",
            "https://boards.greenhouse.io/acme-capital/jobs/1",
            "USA",
            "Tier 1",
            "python, finance"
        ]
    );
    assert_eq!(
        rows(&paths.audit)[1][..4].to_vec(),
        vec!["true", "8", "strong fit", "python, finance"]
    );
}

#[test]
fn no_match_and_failure_only_reach_the_audit_log() {
    let temp = TempDir::new().unwrap();
    let paths = paths(temp.path());
    let sinks = OutputSinks::prepare(&paths).unwrap();
    let no_match = AnalysisOutcome::Scored(AnalysisResult {
        is_match: false,
        score: 2,
        reason: "sales".to_string(),
        matched_keywords: Vec::new(),
    });
    let failed = AnalysisOutcome::Failed {
        detail: "malformed".to_string(),
    };

    for (record, outcome) in [(job("https://a"), &no_match), (job("https://b"), &failed)] {
        sinks.record_audit(&record, outcome).unwrap();
        sinks.record_match(&record, outcome).unwrap();
    }

    assert_eq!(rows(&paths.filtered).len(), 1);
    let audit = rows(&paths.audit);
    assert_eq!(audit[1][..4].to_vec(), vec!["false", "2", "sales", ""]);
    assert_eq!(
        audit[2],
        vec![
            "LLM_PROCESS_FAILURE",
            "N/A",
            "N/A",
            "N/A",
            "Quantitative Analyst at Acme Capital",
            "Acme Capital",
            "https://b",
            "USA",
            "Tier 1"
        ]
    );
}

#[test]
fn concurrent_appends_never_interleave_rows() {
    let temp = TempDir::new().unwrap();
    let sink = Arc::new(CsvSink::create(temp.path().join("log.csv"), &["worker", "row", "text"]).unwrap());

    let writers: Vec<_> = (0..8)
        .map(|worker| {
            let sink = sink.clone();
            thread::spawn(move || {
                for row in 0..50 {
                    let text = format!("a, \"quoted\" value from {worker}");
                    sink.append([worker.to_string(), row.to_string(), text]).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let written = rows(sink.path());
    assert_eq!(written.len(), 1 + 8 * 50);
    for row in &written[1..] {
        assert_eq!(row.len(), 3);
        assert_eq!(row[2], format!("a, \"quoted\" value from {}", row[0]));
    }
}

#[test]
fn text_profile_is_normalized() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("resume.txt");
    fs::write(&path, "Quant developer\n\n  Python,   C++\t finance\n").unwrap();
    assert_eq!(
        extract_profile_text(&path).unwrap(),
        "Quant developer Python, C++ finance"
    );
}

#[test]
fn missing_or_empty_profile_is_an_error() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        extract_profile_text(&temp.path().join("candidate_resume.pdf")),
        Err(ProfileError::Unreadable { .. })
    ));

    let blank = temp.path().join("blank.md");
    fs::write(&blank, " \n\t ").unwrap();
    assert!(matches!(
        extract_profile_text(&blank),
        Err(ProfileError::Empty(_))
    ));

    let garbage = temp.path().join("broken.pdf");
    fs::write(&garbage, "definitely not a pdf").unwrap();
    assert!(extract_profile_text(&garbage).is_err());
}
