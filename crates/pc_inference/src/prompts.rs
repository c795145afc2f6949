use pc_core::{Dimension, EvaluationResult, NewsItem, Prompt, Topic};

use crate::structure::StructureReport;

/// Line prefix that carries the topic inside a draft prompt.
pub const TOPIC_LABEL: &str = "주제: ";
/// Marker preceding the manuscript in evaluation and revision prompts.
pub const MANUSCRIPT_MARKER: &str = "[컬럼 원고]";

const DRAFT_SYSTEM: &str =
    "당신은 전문 정치 저널리스트입니다. 제공된 뉴스 데이터를 바탕으로 균형잡힌 정치 컬럼을 작성합니다.";
const EVALUATION_SYSTEM: &str =
    "당신은 콘텐츠 품질 관리 전문가입니다. 주어진 컬럼을 평가하고 JSON 형식으로만 응답합니다.";
const REVISION_SYSTEM: &str =
    "당신은 정치 컬럼 편집자입니다. 평가 피드백을 반영해 원고를 고쳐 쓰고, 수정된 원고 전문만 출력합니다.";

const WRITING_RULES: &str = "\
- 정치 초보자도 이해할 수 있는 쉬운 용어로 설명한다.
- 문장은 \"~이다.\" 형태의 보도문체로 끝맺는다.
- 핵심 키워드는 **굵게** 표시한다.
- 마크다운을 사용한다: ## 대제목, ### 소제목.
- 진보 진영 입장과 보수 진영 입장은 각각 정확히 3개의 '- ' 글머리표로 작성한다.
- 제공된 뉴스에 근거해 어느 쪽에도 치우치지 않게 서술한다.
- 제목 바로 아래 요약 단락은 300자 이내로 작성한다.";

const TEMPLATE: &str = "\
## (주제를 드러내는 중립적인 제목)

(핵심 내용을 300자 이내로 요약한 단락)

## 💬 (핵심 주제)에 대한 진영별 입장

### 🔵 진보 진영 입장
- (입장 1)
- (입장 2)
- (입장 3)

### 🔴 보수 진영 입장
- (입장 1)
- (입장 2)
- (입장 3)

## 🧨 (핵심 쟁점을 다루는 대제목)
### (소제목)

(쟁점을 번호와 하위 글머리표로 정리한 본문)

## 📌 결론: (핵심 주제)의 핵심과 전망

(300~400자 내외의 결론)

## 참고 자료
- [뉴스 제목](뉴스 URL)";

const EVALUATION_CRITERIA: &str = "\
1. format: 템플릿 구조(제목, 요약, 진영별 입장, 본문, 결론)를 모두 갖추었고 진영별 글머리표가 각각 3개인가?
2. balance: 진보와 보수 양측 입장이 같은 비중과 어조로 제시되었는가?
3. readability: 문장과 단락이 짧고 명확하며 초보자도 이해할 수 있는가?
4. completeness: 주제에 대한 질문에 충분한 정보로 답하고 논리 흐름이 자연스러운가?
5. objectivity: 사실에 근거하며 편향되거나 감정적인 표현이 없는가?";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_news_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self { max_news_chars: 400 }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self, topic: &Topic, news: &[&NewsItem]) -> Prompt {
        let news_block = if news.is_empty() {
            "관련 뉴스를 찾지 못했다. 일반적으로 알려진 사실만 사용하고 추측은 피한다.".to_string()
        } else {
            news.iter()
                .enumerate()
                .map(|(i, item)| self.format_news(i + 1, item))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let user = format!(
            "{label}{topic}\n\n\
             다음 최신 뉴스 정보를 바탕으로 위 주제에 대한 정치 컬럼을 작성해주세요.\n\n\
             [최신 뉴스 정보]\n{news_block}\n\n\
             [작성 규칙]\n{WRITING_RULES}\n\n\
             [템플릿]\n{TEMPLATE}\n\n\
             진보와 보수 진영의 입장은 뉴스에서 실제로 언급된 내용에 근거해야 한다. \
             참고 자료 섹션에는 사용한 뉴스의 링크를 [제목](URL) 형식으로 적는다.",
            label = TOPIC_LABEL,
            topic = topic,
        );

        Prompt::new(DRAFT_SYSTEM, user)
            .with_temperature(0.7)
            .with_max_tokens(3000)
    }

    pub fn evaluation(&self, content: &str, structure: &StructureReport) -> Prompt {
        let structure_note = if structure.is_complete() {
            "자동 구조 점검: 이상 없음".to_string()
        } else {
            format!("자동 구조 점검에서 발견된 문제: {}", structure.issues().join(", "))
        };

        let user = format!(
            "주어진 컬럼 원고를 아래 [평가 기준]에 따라 각 항목 0~100점으로 채점하세요.\n\n\
             [평가 기준]\n{EVALUATION_CRITERIA}\n\n\
             {structure_note}\n\n\
             다음 JSON 형식으로만 응답하세요:\n\
             {{\"scores\": {{\"format\": 0, \"balance\": 0, \"readability\": 0, \"completeness\": 0, \"objectivity\": 0}}, \
             \"pass\": false, \"feedback\": \"가장 낮은 항목 중심의 구체적인 개선 방향\"}}\n\n\
             {MANUSCRIPT_MARKER}\n{content}"
        );

        Prompt::new(EVALUATION_SYSTEM, user)
            .with_temperature(0.3)
            .with_max_tokens(1500)
            .json()
    }

    pub fn revision(&self, content: &str, evaluation: &EvaluationResult, failing: &[Dimension]) -> Prompt {
        let scores = evaluation
            .scores
            .iter()
            .map(|(d, v)| format!("- {} ({}): {:.0}", d.key(), d.label(), v))
            .collect::<Vec<_>>()
            .join("\n");
        let focus = if failing.is_empty() {
            "전반적인 완성도".to_string()
        } else {
            failing.iter().map(|d| d.label()).collect::<Vec<_>>().join(", ")
        };

        let user = format!(
            "아래 원고를 평가 결과에 맞춰 수정하세요. 특히 다음 항목을 개선해야 한다: {focus}\n\n\
             [항목별 점수]\n{scores}\n\n\
             [피드백]\n{feedback}\n\n\
             [작성 규칙]\n{WRITING_RULES}\n\n\
             템플릿 구조와 참고 자료 링크는 유지하고, 수정된 원고 전문만 마크다운으로 출력하세요.\n\n\
             {MANUSCRIPT_MARKER}\n{content}",
            feedback = evaluation.feedback,
        );

        Prompt::new(REVISION_SYSTEM, user)
            .with_temperature(0.5)
            .with_max_tokens(4000)
    }

    fn format_news(&self, index: usize, item: &NewsItem) -> String {
        let description: String = item.description.chars().take(self.max_news_chars).collect();
        let published = item
            .published_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "날짜 미상".to_string());
        format!(
            "[뉴스 {}] {}\n- 내용: {}\n- 발행일: {}\n- 링크: {}",
            index, item.title, description, published, item.link
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::inspect;
    use pc_core::{QualityScores, ResponseFormat};

    fn news_item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: "국회 본회의 표결 예정".to_string(),
            link: "https://news.example.com/1".to_string(),
            published_at: None,
            relevance: 1.0,
        }
    }

    #[test]
    fn test_draft_prompt_embeds_topic_news_and_summary_rule() {
        let topic = Topic::parse("최근 대선 여론조사 결과 분석").unwrap();
        let item = news_item("대선 여론조사 접전");
        let prompt = PromptBuilder::new().draft(&topic, &[&item]);
        assert!(prompt.user.starts_with("주제: 최근 대선 여론조사 결과 분석"));
        assert!(prompt.user.contains("[뉴스 1] 대선 여론조사 접전"));
        assert!(prompt.user.contains("300자 이내"));
        assert!(prompt.user.contains("진보 진영"));
        assert!(prompt.user.contains("보수 진영"));
        assert_eq!(prompt.format, ResponseFormat::Text);
    }

    #[test]
    fn test_draft_prompt_without_news() {
        let topic = Topic::parse("국회 예산 심사").unwrap();
        let prompt = PromptBuilder::new().draft(&topic, &[]);
        assert!(prompt.user.contains("관련 뉴스를 찾지 못했다"));
    }

    #[test]
    fn test_evaluation_prompt_requests_json() {
        let prompt = PromptBuilder::new().evaluation("## 제목\n본문", &inspect("## 제목\n본문"));
        assert_eq!(prompt.format, ResponseFormat::Json);
        assert!(prompt.user.contains("자동 구조 점검에서 발견된 문제"));
        assert!(prompt.user.ends_with("## 제목\n본문"));
    }

    #[test]
    fn test_revision_prompt_carries_scores_and_feedback() {
        let evaluation = EvaluationResult {
            scores: QualityScores {
                balance: 40.0,
                ..QualityScores::uniform(90.0)
            },
            passed: false,
            feedback: "보수 진영 입장이 부족하다".to_string(),
            revised_content: None,
        };
        let prompt = PromptBuilder::new().revision("원고", &evaluation, &[Dimension::Balance]);
        assert!(prompt.user.contains("balance (균형성): 40"));
        assert!(prompt.user.contains("보수 진영 입장이 부족하다"));
        assert!(prompt.user.contains("다음 항목을 개선해야 한다: 균형성"));
    }
}
