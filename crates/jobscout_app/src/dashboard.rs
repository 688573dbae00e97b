//! Full-screen terminal dashboard redrawn on every reporter tick.

use std::io;

use console::{style, Term};
use jobscout_core::{ProgressSnapshot, WorkerPhase, WorkerRowView};
use jobscout_engine::StatusRenderer;

/// Longest query or job title shown on a worker row.
pub const MAX_LABEL_CHARS: usize = 70;

pub struct TerminalDashboard {
    term: Term,
    redraw: bool,
    cursor_hidden: bool,
}

impl TerminalDashboard {
    /// With `redraw` off the dashboard stays silent, leaving the terminal to the logger.
    pub fn new(redraw: bool) -> Self {
        Self {
            term: Term::stdout(),
            redraw,
            cursor_hidden: false,
        }
    }
}

impl StatusRenderer for TerminalDashboard {
    fn render(&mut self, snapshot: &ProgressSnapshot) -> io::Result<()> {
        if !self.redraw {
            return Ok(());
        }
        if !self.cursor_hidden {
            self.term.hide_cursor()?;
            self.cursor_hidden = true;
        }
        self.term.clear_screen()?;
        self.term.write_str(&render_lines(snapshot).join("\n"))?;
        self.term.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            self.term.clear_screen()?;
            self.term.show_cursor()?;
            self.cursor_hidden = false;
        }
        Ok(())
    }
}

impl Drop for TerminalDashboard {
    fn drop(&mut self) {
        if self.cursor_hidden {
            let _ = self.term.show_cursor();
        }
    }
}

/// One frame of the dashboard, top to bottom.
pub fn render_lines(snapshot: &ProgressSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    let bar = "=".repeat(20);
    lines.push(
        style(format!("{bar} LIVE JOB PIPELINE DASHBOARD {bar}"))
            .cyan()
            .bold()
            .to_string(),
    );

    lines.push(String::new());
    lines.push(section(&format!(
        "--- SCRAPER STATUS ({} Browser Tabs) ---",
        snapshot.scrapers.len()
    )));
    for (row, status) in snapshot
        .scraper_rows(MAX_LABEL_CHARS)
        .iter()
        .zip(&snapshot.scrapers)
    {
        let padded = style(format!("{:<20}", row.status));
        let colored = match status.phase {
            WorkerPhase::FoundJob { .. } => padded.green(),
            WorkerPhase::Searching => padded.yellow(),
            _ => padded.white(),
        };
        lines.push(worker_line(row, style(&row.slot).blue().to_string(), colored.to_string(), "Query: "));
    }

    lines.push(String::new());
    lines.push(section(&format!(
        "--- LLM ANALYZER STATUS ({} Workers) ---",
        snapshot.analyzers.len()
    )));
    for (row, status) in snapshot
        .analyzer_rows(MAX_LABEL_CHARS)
        .iter()
        .zip(&snapshot.analyzers)
    {
        let padded = style(format!("{:<20}", row.status));
        let colored = match status.phase {
            WorkerPhase::Analyzing => padded.cyan(),
            _ => padded.white(),
        };
        lines.push(worker_line(
            row,
            style(&row.slot).magenta().to_string(),
            colored.to_string(),
            "     Task:  ",
        ));
    }

    let counters = &snapshot.counters;
    lines.push(String::new());
    lines.push(section("--- OVERALL PROGRESS ---"));
    lines.push(format!(
        "  Searches Remaining: {}| Jobs Scraped: {}| Analysis Queue: {}| Matches Found: {}",
        style(format!("{:<6}", counters.tasks_remaining)).yellow(),
        style(format!("{:<6}", counters.jobs_scraped)).white(),
        style(format!("{:<6}", counters.analysis_backlog)).cyan(),
        style(format!("{:<6}", counters.matches_found)).green(),
    ));

    lines.push(String::new());
    lines.push(section("--- RECENT EVENTS (LLM Judgements) ---"));
    lines.extend(snapshot.events.iter().map(|event| format!("  {event}")));
    lines
}

fn section(title: &str) -> String {
    style(title).bold().to_string()
}

fn worker_line(row: &WorkerRowView, slot: String, status: String, label_tag: &str) -> String {
    format!("  [{slot}]  Status: {status} {label_tag}{}", row.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use jobscout_core::{EventKind, PipelineEvent, ProgressCounters, WorkerId, WorkerStatus};
    use pretty_assertions::assert_eq;

    fn plain(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|l| console::strip_ansi_codes(l).into_owned())
            .collect()
    }

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            scrapers: vec![
                WorkerStatus {
                    id: WorkerId::scraper(1),
                    phase: WorkerPhase::Searching,
                    label: "\"Quantitative Analyst\" \"USA\"".to_string(),
                },
                WorkerStatus {
                    id: WorkerId::scraper(2),
                    phase: WorkerPhase::FoundJob { backlog: 3 },
                    label: "x".repeat(90),
                },
            ],
            analyzers: vec![WorkerStatus {
                id: WorkerId::analyzer(1),
                phase: WorkerPhase::Analyzing,
                label: "Quantitative Analyst at Acme Capital".to_string(),
            }],
            counters: ProgressCounters {
                tasks_remaining: 96,
                analysis_backlog: 3,
                jobs_scraped: 5,
                matches_found: 1,
                ..ProgressCounters::default()
            },
            events: vec![PipelineEvent {
                at: NaiveTime::from_hms_opt(9, 30, 5).unwrap(),
                kind: EventKind::Match { score: 8 },
                text: "Quantitative Analyst at Acme Capital".to_string(),
            }],
        }
    }

    #[test]
    fn frame_lists_every_section_in_order() {
        let lines = plain(&render_lines(&snapshot()));

        assert_eq!(
            lines[0],
            "==================== LIVE JOB PIPELINE DASHBOARD ===================="
        );
        assert_eq!(lines[2], "--- SCRAPER STATUS (2 Browser Tabs) ---");
        assert_eq!(
            lines[3],
            format!(
                "  [Tab-1]  Status: {:<20} Query: \"Quantitative Analyst\" \"USA\"",
                "Searching..."
            )
        );
        assert_eq!(lines[6], "--- LLM ANALYZER STATUS (1 Workers) ---");
        assert_eq!(
            lines[7],
            format!(
                "  [LLM-1]  Status: {:<20}      Task:  Quantitative Analyst at Acme Capital",
                "Analyzing Job"
            )
        );
        assert_eq!(
            lines[10],
            "  Searches Remaining: 96    | Jobs Scraped: 5     | Analysis Queue: 3     | Matches Found: 1     "
        );
        assert_eq!(
            lines.last().unwrap(),
            "  [09:30:05] [\u{2713}] Match (Score: 8/10): Quantitative Analyst at Acme Capital"
        );
    }

    #[test]
    fn long_labels_are_truncated() {
        let lines = plain(&render_lines(&snapshot()));
        assert!(lines[4].contains("Found Job (3)"));
        assert!(lines[4].ends_with(&format!("Query: {}", "x".repeat(MAX_LABEL_CHARS))));
    }

    #[test]
    fn empty_snapshot_still_renders_headers() {
        let lines = plain(&render_lines(&ProgressSnapshot::default()));
        assert!(lines.contains(&"--- RECENT EVENTS (LLM Judgements) ---".to_string()));
        assert_eq!(lines.len(), 10);
    }
}
