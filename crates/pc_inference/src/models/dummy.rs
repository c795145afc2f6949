use async_trait::async_trait;
use pc_core::{LlmClient, Prompt, ResponseFormat, Result};
use std::fmt;

use crate::prompts::{MANUSCRIPT_MARKER, TOPIC_LABEL};

/// Offline model that answers every prompt with fixed, well-formed output.
pub struct DummyClient {
    score: f64,
}

impl fmt::Debug for DummyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyClient").field("score", &self.score).finish()
    }
}

impl Default for DummyClient {
    fn default() -> Self {
        Self { score: 92.0 }
    }
}

impl DummyClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every evaluation reports this score on all dimensions.
    pub fn with_score(score: f64) -> Self {
        Self { score }
    }

    fn column(topic: &str) -> String {
        format!(
            "## {topic}: 쟁점과 전망\n\n\
             **{topic}**을 둘러싼 논의가 이어지고 있다. 여야는 서로 다른 해법을 제시하고 있으며 \
             핵심 쟁점은 제도의 실효성과 국민 부담이다.\n\n\
             ## 💬 {topic}에 대한 진영별 입장\n\n\
             ### 🔵 진보 진영 입장\n\
             - 제도 개선을 통해 사회적 약자 보호를 강화해야 한다는 입장이다.\n\
             - 공공의 역할을 넓혀야 한다고 본다.\n\
             - 절차의 투명성을 높여야 한다고 주장한다.\n\n\
             ### 🔴 보수 진영 입장\n\
             - 시장의 자율성을 해치지 않아야 한다는 입장이다.\n\
             - 재정 건전성을 우선해야 한다고 본다.\n\
             - 기존 제도의 보완으로 충분하다고 주장한다.\n\n\
             ## 🧨 {topic}의 핵심 쟁점\n\
             ### 쟁점 정리\n\n\
             1. **재원 마련**\n   - 양측 모두 재원 문제를 핵심으로 꼽는다.\n\
             2. **추진 일정**\n   - 시행 시기를 두고 의견이 갈린다.\n\n\
             ## 📌 결론: {topic}의 핵심과 전망\n\n\
             향후 국회 논의 과정에서 양측의 절충이 이루어질지가 관건이다.\n"
        )
    }

    fn evaluation(&self) -> String {
        serde_json::json!({
            "scores": {
                "format": self.score,
                "balance": self.score,
                "readability": self.score,
                "completeness": self.score,
                "objectivity": self.score,
            },
            "pass": self.score >= 85.0,
            "feedback": "구조와 균형이 적절하다.",
        })
        .to_string()
    }
}

#[async_trait]
impl LlmClient for DummyClient {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        if prompt.format == ResponseFormat::Json {
            return Ok(self.evaluation());
        }
        if let Some((_, manuscript)) = prompt.user.split_once(MANUSCRIPT_MARKER) {
            return Ok(manuscript.trim().to_string());
        }
        let topic = prompt
            .user
            .lines()
            .find_map(|line| line.strip_prefix(TOPIC_LABEL))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("정치 이슈");
        Ok(Self::column(topic))
    }
}
