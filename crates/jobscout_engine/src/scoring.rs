use std::time::Duration;

use jobscout_core::{AnalysisResult, SCORE_RANGE};
use pipeline_logging::{pipeline_debug, pipeline_info};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ScoringError;

/// The judge that rates one job title against the candidate profile.
///
/// Calls are synchronous from the caller's point of view and may take seconds.
pub trait Scorer: Send + Sync {
    /// Confirms the backend is reachable before any worker starts.
    fn health_check(&self) -> Result<(), ScoringError>;

    fn evaluate(&self, profile: &str, title: &str) -> Result<AnalysisResult, ScoringError>;
}

#[derive(Debug, Clone)]
pub struct OllamaSettings {
    pub host: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:11434".to_string(),
            model: "deepseek-r1:8b".to_string(),
            temperature: 0.1,
            request_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    format: &'a str,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Scorer backed by a local Ollama server's chat endpoint.
pub struct OllamaScorer {
    settings: OllamaSettings,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl OllamaScorer {
    pub fn new(settings: OllamaSettings) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ScoringError::Request(err.to_string()))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("ollama-io")
            .enable_all()
            .build()
            .map_err(|err| ScoringError::Runtime(err.to_string()))?;
        pipeline_info!(
            "Ollama scorer configured: host={}, model={}",
            settings.host,
            settings.model
        );
        Ok(Self {
            settings,
            client,
            runtime,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.settings.host.trim_end_matches('/'))
    }

    async fn chat(&self, prompt: &str) -> Result<String, ScoringError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            format: "json",
            stream: false,
            options: ChatOptions {
                temperature: self.settings.temperature,
            },
        };
        let body = serde_json::to_vec(&request)
            .map_err(|err| ScoringError::Request(err.to_string()))?;

        let response = self
            .client
            .post(self.endpoint("/api/chat"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| ScoringError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ScoringError::Request(err.to_string()))?;
        let reply: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|err| ScoringError::MalformedResponse(err.to_string()))?;
        Ok(reply.message.content)
    }
}

impl Scorer for OllamaScorer {
    fn health_check(&self) -> Result<(), ScoringError> {
        self.runtime.block_on(async {
            let response = self
                .client
                .get(self.endpoint("/api/tags"))
                .send()
                .await
                .map_err(|err| ScoringError::Request(err.to_string()))?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(ScoringError::Status(response.status().as_u16()))
            }
        })
    }

    fn evaluate(&self, profile: &str, title: &str) -> Result<AnalysisResult, ScoringError> {
        let prompt = build_prompt(profile, title);
        let content = self.runtime.block_on(self.chat(&prompt))?;
        pipeline_debug!("Scorer reply for {title:?}: {content}");
        parse_verdict(&content)
    }
}

pub fn build_prompt(profile: &str, title: &str) -> String {
    format!(
        "You are a world-class career coach. Evaluate a single job title for a candidate based on their summary.\n\
         CANDIDATE'S SUMMARY:\n\
         {profile}\n\
         \n\
         JOB TITLE TO EVALUATE:\n\
         \"{title}\"\n\
         \n\
         Respond ONLY in a valid JSON object with these keys: \"is_match\" (boolean), \
         \"score\" (integer 1-10), \"reason\" (string), \"matched_keywords\" (list[string])."
    )
}

/// Parses the judge's reply into a verdict.
///
/// Text around the JSON object is ignored. `is_match` and `score` are required;
/// the score may be a number or numeric string and is clamped into [`SCORE_RANGE`].
pub fn parse_verdict(content: &str) -> Result<AnalysisResult, ScoringError> {
    let object = json_object(content)?;

    let is_match = match object.get("is_match") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) if text.eq_ignore_ascii_case("true") => true,
        Some(Value::String(text)) if text.eq_ignore_ascii_case("false") => false,
        Some(other) => {
            return Err(ScoringError::MalformedResponse(format!(
                "is_match is not a boolean: {other}"
            )))
        }
        None => return Err(ScoringError::MissingField("is_match")),
    };

    let raw_score = match object.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
        None => return Err(ScoringError::MissingField("score")),
    };
    let Some(raw_score) = raw_score.filter(|s| s.is_finite()) else {
        return Err(ScoringError::MalformedResponse(
            "score is not numeric".to_string(),
        ));
    };
    let score = raw_score
        .round()
        .clamp(f64::from(*SCORE_RANGE.start()), f64::from(*SCORE_RANGE.end())) as u8;

    let reason = match object.get("reason") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let matched_keywords = match object.get("matched_keywords") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|keyword| !keyword.is_empty())
            .collect(),
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(AnalysisResult {
        is_match,
        score,
        reason,
        matched_keywords,
    })
}

fn json_object(content: &str) -> Result<serde_json::Map<String, Value>, ScoringError> {
    let parsed = serde_json::from_str::<Value>(content.trim()).or_else(|first_err| {
        let start = content.find('{');
        let end = content.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str::<Value>(&content[start..=end])
            }
            _ => Err(first_err),
        }
    });
    match parsed {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ScoringError::MalformedResponse(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(err) => Err(ScoringError::MalformedResponse(err.to_string())),
    }
}
