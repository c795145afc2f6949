use pc_core::logging::preview;
use pc_core::{
    Dimension, Error, EvaluationResult, LlmClient, QualityScores, QualityThresholds, Result,
};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::prompts::PromptBuilder;
use crate::structure::inspect;

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    #[serde(default)]
    scores: QualityScores,
    #[serde(default)]
    pass: Option<bool>,
    #[serde(default)]
    feedback: Option<String>,
}

/// Scores columns on five dimensions and rewrites the ones that fall short.
pub struct ContentEvaluator {
    llm: Arc<dyn LlmClient>,
    prompts: PromptBuilder,
    thresholds: QualityThresholds,
}

impl fmt::Debug for ContentEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentEvaluator")
            .field("llm", &self.llm.name())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

fn as_generation_failure(e: Error) -> Error {
    match e {
        Error::GenerationFailed(_) => e,
        other => Error::GenerationFailed(other.to_string()),
    }
}

/// Pulls the JSON object out of a reply that may be wrapped in prose or fences.
fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

/// Drops a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

impl ContentEvaluator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompts: PromptBuilder::new(),
            thresholds: QualityThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Scores `content`. The pass flag is decided here from the clamped
    /// scores, never taken from the model.
    pub async fn evaluate(&self, content: &str) -> Result<EvaluationResult> {
        let structure = inspect(content);
        let prompt = self.prompts.evaluation(content, &structure);
        let reply = self
            .llm
            .complete(&prompt)
            .await
            .map_err(as_generation_failure)?;

        let json = extract_json(&reply)
            .ok_or_else(|| Error::GenerationFailed("evaluation reply had no JSON object".to_string()))?;
        let raw: RawEvaluation = serde_json::from_str(json)
            .map_err(|e| Error::GenerationFailed(format!("unparseable evaluation: {}", e)))?;

        let mut scores = raw.scores.clamped();
        let ceiling = structure.format_ceiling();
        if scores.format > ceiling {
            scores.format = ceiling;
        }

        let passed = self.thresholds.passes(&scores);
        if let Some(model_pass) = raw.pass {
            if model_pass != passed {
                warn!(
                    "Model judged pass={} but thresholds give pass={}",
                    model_pass, passed
                );
            }
        }

        let mut feedback = raw.feedback.unwrap_or_default().trim().to_string();
        if !structure.is_complete() {
            let note = format!("구조 문제: {}", structure.issues().join(", "));
            feedback = if feedback.is_empty() {
                note
            } else {
                format!("{}\n{}", feedback, note)
            };
        }

        Ok(EvaluationResult {
            scores,
            passed,
            feedback,
            revised_content: None,
        })
    }

    pub fn failing(&self, evaluation: &EvaluationResult) -> Vec<Dimension> {
        self.thresholds.failing(&evaluation.scores)
    }

    /// Rewrites `content` against the evaluation's feedback and stores the
    /// result in `evaluation.revised_content`.
    pub async fn revise(&self, content: &str, evaluation: &mut EvaluationResult) -> Result<String> {
        let failing = self.failing(evaluation);
        let prompt = self.prompts.revision(content, evaluation, &failing);
        let reply = self
            .llm
            .complete(&prompt)
            .await
            .map_err(as_generation_failure)?;

        let revised = strip_code_fence(&reply).to_string();
        if revised.is_empty() {
            return Err(Error::GenerationFailed("revision came back empty".to_string()));
        }
        evaluation.revised_content = Some(revised.clone());
        Ok(revised)
    }

    pub fn log_quality_report(&self, evaluation: &EvaluationResult, round: u32) {
        let scores = &evaluation.scores;
        let (weakest, weakest_score) = scores.weakest();
        info!("📊 Quality report (round {})", round);
        for (dimension, score) in scores.iter() {
            let mark = if score >= self.thresholds.get(dimension) {
                "✅"
            } else {
                "❌"
            };
            info!("  {} {}: {:.1}", mark, dimension.label(), score);
        }
        info!(
            "  📈 average {:.1} ({}), weakest {} {:.1}",
            scores.average(),
            scores.grade().label(),
            weakest.label(),
            weakest_score
        );
        info!(
            "  {} {}",
            if evaluation.passed { "🎉 passed" } else { "🔄 needs revision" },
            preview(&evaluation.feedback, 150)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DummyClient;
    use async_trait::async_trait;
    use pc_core::{LlmClient, Prompt};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Scripted {
        replies: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for Scripted {
        async fn complete(&self, _prompt: &Prompt) -> Result<String> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| Error::Transient("script exhausted".into()))
        }
    }

    async fn well_formed_column() -> String {
        let topic = pc_core::Topic::parse("국회 예산 심사").unwrap();
        let prompt = PromptBuilder::new().draft(&topic, &[]);
        DummyClient::new().complete(&prompt).await.unwrap()
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```markdown\n## 제목\n본문\n```"), "## 제목\n본문");
        assert_eq!(strip_code_fence("  ## 제목  "), "## 제목");
    }

    #[tokio::test]
    async fn test_gate_is_computed_locally() {
        let column = well_formed_column().await;
        let reply = r#"Here you go: {"scores":{"format":90,"balance":84.9,"readability":95,"completeness":92,"objectivity":99},"pass":true,"feedback":"균형 보강 필요"}"#;
        let evaluator = ContentEvaluator::new(Scripted::new(&[reply]));
        let result = evaluator.evaluate(&column).await.unwrap();
        assert!(!result.passed);
        assert_eq!(evaluator.failing(&result), vec![Dimension::Balance]);
        assert_eq!(result.feedback, "균형 보강 필요");
    }

    #[tokio::test]
    async fn test_scores_are_clamped_and_capped_by_structure() {
        let reply = r#"```json
{"scores":{"format":150,"balance":-20,"readability":88,"completeness":88,"objectivity":88},"feedback":""}
```"#;
        let evaluator = ContentEvaluator::new(Scripted::new(&[reply]));
        let result = evaluator.evaluate("## 제목\n\n요약만 있다.").await.unwrap();
        assert_eq!(result.scores.format, crate::structure::INCOMPLETE_FORMAT_CEILING);
        assert_eq!(result.scores.balance, 0.0);
        assert!(!result.passed);
        assert!(result.feedback.starts_with("구조 문제:"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_generation_failure() {
        let evaluator = ContentEvaluator::new(Scripted::new(&["점수를 매길 수 없습니다"]));
        let result = evaluator.evaluate("본문").await;
        assert!(matches!(result, Err(Error::GenerationFailed(_))));
    }

    #[tokio::test]
    async fn test_revise_records_revised_content() {
        let evaluator = ContentEvaluator::new(Scripted::new(&["```\n## 고친 제목\n본문\n```"]));
        let mut evaluation = EvaluationResult {
            scores: QualityScores::uniform(60.0),
            passed: false,
            feedback: "전반적 보강".into(),
            revised_content: None,
        };
        let revised = evaluator.revise("## 제목\n본문", &mut evaluation).await.unwrap();
        assert_eq!(revised, "## 고친 제목\n본문");
        assert_eq!(evaluation.revised_content.as_deref(), Some("## 고친 제목\n본문"));
    }

    #[tokio::test]
    async fn test_revise_failure_leaves_evaluation_untouched() {
        let evaluator = ContentEvaluator::new(Scripted::new(&[]));
        let mut evaluation = EvaluationResult {
            scores: QualityScores::uniform(60.0),
            passed: false,
            feedback: String::new(),
            revised_content: None,
        };
        let result = evaluator.revise("본문", &mut evaluation).await;
        assert!(matches!(result, Err(Error::GenerationFailed(_))));
        assert!(evaluation.revised_content.is_none());
    }
}
