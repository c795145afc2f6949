use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

pub const TOPIC_MIN_CHARS: usize = 2;
pub const TOPIC_MAX_CHARS: usize = 200;
pub const MAX_REVISION_ATTEMPTS: u32 = 5;
pub const DEFAULT_REVISION_ATTEMPTS: u32 = 3;
pub const MAX_DAYS_BACK: u32 = 30;
pub const DEFAULT_DAYS_BACK: u32 = 7;
pub const SUMMARY_MAX_CHARS: usize = 300;
pub const COLUMN_CATEGORY: &str = "정치";

const BLOCKED_TOPIC_KEYWORDS: [&str; 4] = ["욕설", "혐오", "비방", "개인정보"];

/// A validated, trimmed column topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len < TOPIC_MIN_CHARS {
            return Err(Error::InvalidInput(format!(
                "주제는 {}자 이상이어야 합니다",
                TOPIC_MIN_CHARS
            )));
        }
        if len > TOPIC_MAX_CHARS {
            return Err(Error::InvalidInput(format!(
                "주제는 {}자 이하여야 합니다",
                TOPIC_MAX_CHARS
            )));
        }
        let lowered = trimmed.to_lowercase();
        if let Some(keyword) = BLOCKED_TOPIC_KEYWORDS.iter().find(|k| lowered.contains(*k)) {
            return Err(Error::InvalidInput(format!(
                "부적절한 내용이 포함되어 있습니다: {}",
                keyword
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which part of a news item the topic similarity is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Title,
    All,
}

fn default_revision_attempts() -> u32 {
    DEFAULT_REVISION_ATTEMPTS
}

fn default_days_back() -> u32 {
    DEFAULT_DAYS_BACK
}

/// Inbound request as received from the HTTP layer or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRequest {
    pub topic: String,
    #[serde(default = "default_revision_attempts")]
    pub max_revision_attempts: u32,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default)]
    pub search_mode: SearchMode,
}

impl ColumnRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            max_revision_attempts: DEFAULT_REVISION_ATTEMPTS,
            days_back: DEFAULT_DAYS_BACK,
            search_mode: SearchMode::default(),
        }
    }

    pub fn with_max_revision_attempts(mut self, attempts: u32) -> Self {
        self.max_revision_attempts = attempts;
        self
    }

    pub fn with_days_back(mut self, days: u32) -> Self {
        self.days_back = days;
        self
    }

    pub fn validate(&self) -> Result<GenerationRequest> {
        let topic = Topic::parse(&self.topic)?;
        if !(1..=MAX_REVISION_ATTEMPTS).contains(&self.max_revision_attempts) {
            return Err(Error::InvalidInput(format!(
                "maxRevisionAttempts는 1-{} 사이여야 합니다",
                MAX_REVISION_ATTEMPTS
            )));
        }
        if !(1..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(Error::InvalidInput(format!(
                "daysBack은 1-{} 사이여야 합니다",
                MAX_DAYS_BACK
            )));
        }
        Ok(GenerationRequest {
            topic,
            max_revision_attempts: self.max_revision_attempts,
            news: NewsQuery {
                days_back: self.days_back,
                search_mode: self.search_mode,
            },
        })
    }
}

/// A request that passed validation; only this type reaches the pipeline.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: Topic,
    pub max_revision_attempts: u32,
    pub news: NewsQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsQuery {
    pub days_back: u32,
    pub search_mode: SearchMode,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            search_mode: SearchMode::default(),
        }
    }
}

/// Raw search result, already cleaned of provider markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    /// Publisher link when the provider knows it, otherwise the provider link.
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Topic similarity in `[0, 1]`.
    pub relevance: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Working column text. Revisions replace `content`; `sources` stay fixed.
#[derive(Debug, Clone)]
pub struct Draft {
    pub content: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Format,
    Balance,
    Readability,
    Completeness,
    Objectivity,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Format,
        Dimension::Balance,
        Dimension::Readability,
        Dimension::Completeness,
        Dimension::Objectivity,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Format => "format",
            Dimension::Balance => "balance",
            Dimension::Readability => "readability",
            Dimension::Completeness => "completeness",
            Dimension::Objectivity => "objectivity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Format => "형식/구조",
            Dimension::Balance => "균형성",
            Dimension::Readability => "가독성",
            Dimension::Completeness => "완성도",
            Dimension::Objectivity => "객관성",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Scores on a 0–100 scale, one field per evaluation dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    #[serde(default)]
    pub format: f64,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub readability: f64,
    #[serde(default)]
    pub completeness: f64,
    #[serde(default)]
    pub objectivity: f64,
}

impl QualityScores {
    pub fn uniform(score: f64) -> Self {
        Self {
            format: score,
            balance: score,
            readability: score,
            completeness: score,
            objectivity: score,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Format => self.format,
            Dimension::Balance => self.balance,
            Dimension::Readability => self.readability,
            Dimension::Completeness => self.completeness,
            Dimension::Objectivity => self.objectivity,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Clamps every field into range; NaN becomes the minimum.
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| {
            if v.is_nan() {
                SCORE_MIN
            } else {
                v.clamp(SCORE_MIN, SCORE_MAX)
            }
        };
        Self {
            format: clamp(self.format),
            balance: clamp(self.balance),
            readability: clamp(self.readability),
            completeness: clamp(self.completeness),
            objectivity: clamp(self.objectivity),
        }
    }

    pub fn average(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum::<f64>() / Dimension::ALL.len() as f64
    }

    pub fn weakest(&self) -> (Dimension, f64) {
        self.iter()
            .fold((Dimension::Format, f64::INFINITY), |acc, (d, v)| {
                if v < acc.1 {
                    (d, v)
                } else {
                    acc
                }
            })
    }

    pub fn grade(&self) -> Grade {
        Grade::from_average(self.average())
    }
}

/// Per-dimension pass thresholds. The gate is conjunctive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    pub format: f64,
    pub balance: f64,
    pub readability: f64,
    pub completeness: f64,
    pub objectivity: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self::uniform(85.0)
    }
}

impl QualityThresholds {
    pub fn uniform(threshold: f64) -> Self {
        Self {
            format: threshold,
            balance: threshold,
            readability: threshold,
            completeness: threshold,
            objectivity: threshold,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Format => self.format,
            Dimension::Balance => self.balance,
            Dimension::Readability => self.readability,
            Dimension::Completeness => self.completeness,
            Dimension::Objectivity => self.objectivity,
        }
    }

    pub fn failing(&self, scores: &QualityScores) -> Vec<Dimension> {
        scores
            .iter()
            .filter(|(d, v)| *v < self.get(*d))
            .map(|(d, _)| d)
            .collect()
    }

    pub fn passes(&self, scores: &QualityScores) -> bool {
        self.failing(scores).is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl Grade {
    pub fn from_average(average: f64) -> Self {
        if average >= 90.0 {
            Grade::Excellent
        } else if average >= 80.0 {
            Grade::Good
        } else if average >= 70.0 {
            Grade::Fair
        } else {
            Grade::NeedsWork
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "우수",
            Grade::Good => "양호",
            Grade::Fair => "보통",
            Grade::NeedsWork => "개선필요",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub scores: QualityScores,
    #[serde(rename = "pass")]
    pub passed: bool,
    pub feedback: String,
    pub revised_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub word_count: usize,
    pub category: String,
    pub created_date: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleData {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub metadata: ArticleMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnResponse {
    pub success: bool,
    pub article: ArticleData,
    pub processed_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub processed_date: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            processed_date: iso_timestamp(Utc::now()),
        }
    }

    pub fn from_error(error: &Error) -> Self {
        Self::new(error.public_message())
    }
}

/// The only two shapes the core hands back to its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ColumnOutcome {
    Success(ColumnResponse),
    Failure(ErrorResponse),
}

impl ColumnOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ColumnOutcome::Success(_))
    }
}

pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_bounds() {
        assert!(Topic::parse("").is_err());
        assert!(Topic::parse("   ").is_err());
        assert!(Topic::parse("A").is_err());
        assert!(Topic::parse(&"A".repeat(201)).is_err());
        assert!(Topic::parse(&"가".repeat(200)).is_ok());

        let topic = Topic::parse("  최근 대선 여론조사 결과 분석  ").unwrap();
        assert_eq!(topic.as_str(), "최근 대선 여론조사 결과 분석");
    }

    #[test]
    fn test_topic_rejects_blocked_keywords() {
        let err = Topic::parse("정치인 비방 모음").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_request_defaults_and_validation() {
        let request: ColumnRequest = serde_json::from_str(r#"{"topic": "테스트 주제"}"#).unwrap();
        assert_eq!(request.max_revision_attempts, 3);
        assert_eq!(request.days_back, 7);
        assert_eq!(request.search_mode, SearchMode::Title);
        assert!(request.validate().is_ok());

        assert!(request.clone().with_max_revision_attempts(0).validate().is_err());
        assert!(request.clone().with_max_revision_attempts(10).validate().is_err());
        assert!(request.clone().with_days_back(31).validate().is_err());

        let request: ColumnRequest =
            serde_json::from_str(r#"{"topic": "테스트 주제", "searchMode": "all"}"#).unwrap();
        assert_eq!(request.search_mode, SearchMode::All);
    }

    #[test]
    fn test_conjunctive_gate() {
        let thresholds = QualityThresholds::default();
        assert!(thresholds.passes(&QualityScores::uniform(85.0)));

        // A high average does not hide one failing dimension.
        let scores = QualityScores {
            balance: 0.0,
            ..QualityScores::uniform(100.0)
        };
        assert!(scores.average() > 75.0);
        assert!(!thresholds.passes(&scores));
        assert_eq!(thresholds.failing(&scores), vec![Dimension::Balance]);
        assert_eq!(scores.weakest(), (Dimension::Balance, 0.0));
    }

    #[test]
    fn test_scores_are_clamped() {
        let scores = QualityScores {
            format: 140.0,
            balance: -3.0,
            readability: f64::NAN,
            ..QualityScores::uniform(50.0)
        }
        .clamped();
        assert_eq!(scores.format, 100.0);
        assert_eq!(scores.balance, 0.0);
        assert_eq!(scores.readability, 0.0);
    }

    #[test]
    fn test_grades() {
        assert_eq!(QualityScores::uniform(92.0).grade(), Grade::Excellent);
        assert_eq!(QualityScores::uniform(80.0).grade(), Grade::Good);
        assert_eq!(QualityScores::uniform(70.0).grade(), Grade::Fair);
        assert_eq!(QualityScores::uniform(10.0).grade().label(), "개선필요");
    }

    #[test]
    fn test_outcome_envelope_shapes() {
        let failure = ColumnOutcome::Failure(ErrorResponse::from_error(&Error::RateLimited));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["processedDate"].as_str().unwrap().ends_with('Z'));
        assert!(json.get("article").is_none());
    }
}
