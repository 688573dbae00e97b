//! Run configuration, read from a RON file.
//!
//! Every field has a default, so a config file only needs the keys it changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use jobscout_core::{SiteFilter, TitleTier, DEFAULT_EVENT_CAPACITY};
use jobscout_engine::{FetchSettings, OllamaSettings, OutputPaths, PipelineSettings};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = "jobscout.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Candidate resume: PDF, or plain text for `.txt`/`.md`.
    pub profile_path: PathBuf,
    pub scoring: ScoringConfig,
    pub job_titles: Vec<TierConfig>,
    /// Searched in this order before shuffling.
    pub countries: Vec<String>,
    pub scraper_tabs: usize,
    pub analyzer_workers: usize,
    pub max_pages_per_query: usize,
    pub ui_refresh_ms: u64,
    pub analysis_poll_ms: u64,
    pub page_wait_secs: u64,
    pub page_backoff_ms: (u64, u64),
    pub recent_events: usize,
    /// Bound on discovered records awaiting analysis; scrapers block when it is
    /// reached. `None` leaves the queue unbounded.
    pub analysis_queue_capacity: Option<usize>,
    pub shuffle_tasks: bool,
    pub search_endpoints: Vec<String>,
    pub target_job_sites: Vec<String>,
    pub output: OutputConfig,
    pub log_level: String,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub host: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub tier: String,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub unfiltered: String,
    pub filtered: String,
    pub audit: String,
}

const SEARXNG_INSTANCES: &[&str] = &[
    "https://search.inetol.net/",
    "https://searx.stream/",
    "https://searx.tiekoetter.com/",
    "https://search.rhscz.eu/",
    "https://search.indst.eu/",
    "https://search.hbubli.cc/",
    "https://searx.oloke.xyz/",
    "https://searx.dresden.network/",
    "https://search.sapti.me/",
    "https://searxng.f24o.zip/",
    "https://search.rowie.at/",
    "https://search.mdosch.de/",
    "https://searxng.hweeren.com/",
    "https://search.federicociro.com/",
    "https://seek.fyi/",
    "https://searx.tuxcloud.net/",
    "https://searx.foobar.vip/",
    "https://opnxng.com/",
    "https://searx.foss.family/",
    "https://search.einfachzocken.eu/",
    "https://search.catboy.house/",
    "https://kantan.cat/",
    "https://search.citw.lgbt/",
    "https://baresearch.org/",
    "https://priv.au/",
    "https://searx.perennialte.ch/",
    "https://suche.dasnetzundich.de/",
    "https://search.ononoki.org/",
    "https://search.projectsegfau.lt/",
    "https://search.080609.xyz/",
    "https://searxng.deliberate.world/",
    "https://searx.namejeff.xyz/",
    "https://search.nerdvpn.de/",
    "https://searxng.shreven.org/",
    "https://searx.sev.monster/",
    "https://searx.ro/",
    "https://searxng.website/",
    "https://darmarit.org/searx/",
    "https://searx.lunar.icu/",
    "https://search.oh64.moe/",
    "https://search.privacyredirect.com/",
    "https://s.datuan.dev/",
    "https://searxng.biz/",
    "https://nyc1.sx.ggtyler.dev/",
    "https://paulgo.io/",
    "https://northboot.xyz/",
    "https://search.url4irl.com/",
    "https://search.im-in.space/",
    "https://copp.gg/",
    "https://fairsuch.net/",
    "https://searx.mxchange.org/",
    "https://searx.party/",
    "https://searx.juancord.xyz/",
    "https://s.mble.dk/",
    "https://ooglester.com/",
    "https://metacat.online/",
    "https://searx.thefloatinglab.world/",
    "https://find.xenorio.xyz/",
    "https://etsi.me/",
    "https://sx.catgirl.cloud/",
    "https://search.canine.tools/",
    "https://searx.ox2.fr/",
    "https://www.gruble.de/",
    "https://searx.mbuf.net/",
    "https://search.ohaa.xyz/",
    "https://searx.ankha.ac/",
    "https://searx.zhenyapav.com/",
    "https://searxng.site/",
    "https://search.librenode.com/",
];

const TARGET_JOB_SITES: &[&str] = &[
    "boards.greenhouse.io",
    "jobs.lever.co",
    "myworkdayjobs.com",
    "icims.com",
    "workable.com",
    "smartrecruiters.com",
    "taleo.net",
    "ultipro.com",
    "bamboohr.com/jobs",
    "linkedin.com/jobs/view",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn tier(name: &str, titles: &[&str]) -> TierConfig {
    TierConfig {
        tier: name.to_string(),
        titles: strings(titles),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut config = Self {
            profile_path: PathBuf::from("candidate_resume.pdf"),
            scoring: ScoringConfig::default(),
            job_titles: vec![
                tier(
                    "Tier 1",
                    &[
                        "Investment Banking Analyst",
                        "Quantitative Analyst",
                        "Hedge Fund Analyst",
                        "Financial Modeling Analyst",
                        "M&A Analyst",
                        "Data Science Finance",
                        "Python Financial Analyst",
                    ],
                ),
                tier(
                    "Tier 2",
                    &[
                        "Private Equity Analyst",
                        "Venture Capital Analyst",
                        "Equity Research Analyst",
                        "Corporate Development Analyst",
                    ],
                ),
                tier(
                    "Tier 3",
                    &[
                        "Operations Management Finance",
                        "Financial Analyst",
                        "FP&A Analyst",
                    ],
                ),
            ],
            countries: strings(&[
                "USA",
                "Singapore",
                "Canada",
                "Australia",
                "United Kingdom",
                "Germany",
                "Hong Kong",
            ]),
            scraper_tabs: 8,
            analyzer_workers: 2,
            max_pages_per_query: 10,
            ui_refresh_ms: 1000,
            analysis_poll_ms: 1000,
            page_wait_secs: 15,
            page_backoff_ms: (2000, 4000),
            recent_events: DEFAULT_EVENT_CAPACITY,
            analysis_queue_capacity: None,
            shuffle_tasks: true,
            search_endpoints: strings(SEARXNG_INSTANCES),
            target_job_sites: strings(TARGET_JOB_SITES),
            output: OutputConfig::default(),
            log_level: "info".to_string(),
            log_file: PathBuf::from("jobscout.log"),
        };
        config.normalize();
        config
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let ollama = OllamaSettings::default();
        Self {
            host: ollama.host,
            model: ollama.model,
            temperature: ollama.temperature,
            request_timeout_secs: ollama.request_timeout.as_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            unfiltered: "company_list_unfiltered.csv".to_string(),
            filtered: "company_list_filtered.csv".to_string(),
            audit: "llm_analysis_log.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `explicit` if given (it must exist), else `./jobscout.ron` if present,
    /// else the built-in defaults. Returns the file that was read, if any.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if !fallback.is_file() {
                    return Ok((Self::default(), None));
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_ron_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok((config, Some(path)))
    }

    pub fn from_ron_str(text: &str) -> anyhow::Result<Self> {
        let mut config: Self = ron::from_str(text)?;
        config.normalize();
        Ok(config)
    }

    pub fn to_ron_pretty(&self) -> anyhow::Result<String> {
        let pretty = ron::ser::PrettyConfig::new();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Endpoints are used as a set: trimmed, sorted and deduplicated.
    fn normalize(&mut self) {
        self.search_endpoints = self
            .search_endpoints
            .iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self.search_endpoints.sort();
        self.search_endpoints.dedup();
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scraper_tabs == 0 {
            bail!("scraper_tabs must be at least 1");
        }
        if self.analyzer_workers == 0 {
            bail!("analyzer_workers must be at least 1");
        }
        if self.max_pages_per_query == 0 {
            bail!("max_pages_per_query must be at least 1");
        }
        if self.search_endpoints.is_empty() {
            bail!("search_endpoints is empty");
        }
        if self.page_backoff_ms.0 > self.page_backoff_ms.1 {
            bail!(
                "page_backoff_ms minimum {} exceeds maximum {}",
                self.page_backoff_ms.0,
                self.page_backoff_ms.1
            );
        }
        if self.ui_refresh_ms == 0 || self.analysis_poll_ms == 0 {
            bail!("ui_refresh_ms and analysis_poll_ms must be non-zero");
        }
        if self.recent_events == 0 {
            bail!("recent_events must be at least 1");
        }
        if self.analysis_queue_capacity == Some(0) {
            bail!("analysis_queue_capacity must be at least 1 when set");
        }
        if self.job_titles.iter().all(|t| t.titles.is_empty()) || self.countries.is_empty() {
            bail!("job_titles and countries must name at least one search");
        }
        if !(0.0..=2.0).contains(&self.scoring.temperature) {
            bail!("scoring temperature {} is outside 0.0..=2.0", self.scoring.temperature);
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn log_level_filter(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse()
            .with_context(|| format!("unknown log_level {:?}", self.log_level))
    }

    pub fn title_tiers(&self) -> Vec<TitleTier> {
        self.job_titles
            .iter()
            .map(|t| TitleTier::new(t.tier.as_str(), t.titles.iter().map(String::as_str)))
            .collect()
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        let refresh = Duration::from_millis(self.ui_refresh_ms);
        PipelineSettings {
            scraper_tabs: self.scraper_tabs,
            analyzer_workers: self.analyzer_workers,
            max_pages_per_query: self.max_pages_per_query,
            search_endpoints: self.search_endpoints.clone(),
            site_filter: SiteFilter::new(self.target_job_sites.iter().map(String::as_str)),
            page_wait: Duration::from_secs(self.page_wait_secs),
            page_backoff: (
                Duration::from_millis(self.page_backoff_ms.0),
                Duration::from_millis(self.page_backoff_ms.1),
            ),
            analysis_poll: Duration::from_millis(self.analysis_poll_ms),
            refresh_interval: refresh,
            reporter_grace: refresh * 2,
            event_capacity: self.recent_events,
            analysis_queue_capacity: self.analysis_queue_capacity,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(self.page_wait_secs),
            ..FetchSettings::default()
        }
    }

    pub fn ollama_settings(&self) -> OllamaSettings {
        OllamaSettings {
            host: self.scoring.host.clone(),
            model: self.scoring.model.clone(),
            temperature: self.scoring.temperature,
            request_timeout: Duration::from_secs(self.scoring.request_timeout_secs),
        }
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::in_dir(
            &self.output.dir,
            &self.output.unfiltered,
            &self.output.filtered,
            &self.output.audit,
        )
    }
}
