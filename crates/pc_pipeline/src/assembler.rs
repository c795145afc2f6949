use chrono::{DateTime, Utc};
use pc_core::{iso_timestamp, ArticleData, ArticleMetadata, Source, COLUMN_CATEGORY, SUMMARY_MAX_CHARS};
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_TITLE: &str = "정치 컬럼";
pub const DEFAULT_SUMMARY: &str = "정치 이슈에 대한 균형잡힌 분석입니다.";
const ELLIPSIS: &str = "...";

/// Leading markers of the fixed template headings; never used as the title.
const SECTION_MARKERS: [&str; 7] = ["💬", "🔵", "🔴", "🧨", "📌", "참고 자료", "결론"];

fn heading_text<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    // "## " must not match "### ".
    if rest.starts_with('#') {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "").trim().to_string()
}

fn is_section_heading(text: &str) -> bool {
    let text = text.trim_start_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
    SECTION_MARKERS.iter().any(|marker| text.starts_with(marker))
}

/// Picks the title and the summary paragraph from the final column.
pub fn extract_title_and_summary(content: &str) -> (String, String) {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    let title_at = lines
        .iter()
        .position(|l| heading_text(l, "## ").map_or(false, |t| !is_section_heading(t)))
        .or_else(|| lines.iter().position(|l| heading_text(l, "# ").is_some()));

    let title = title_at
        .and_then(|i| heading_text(lines[i], "## ").or_else(|| heading_text(lines[i], "# ")))
        .map(strip_emphasis)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let body_start = title_at.map_or(0, |i| i + 1);
    let paragraph: Vec<&str> = lines[body_start..]
        .iter()
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty() && !l.starts_with('#'))
        .filter(|l| !l.starts_with("- ") && !l.starts_with("* "))
        .copied()
        .collect();

    let summary = strip_emphasis(&paragraph.join(" "));
    let summary = if summary.is_empty() {
        DEFAULT_SUMMARY.to_string()
    } else {
        truncate_summary(&summary)
    };
    (title, summary)
}

/// Shortens `text` to at most [`SUMMARY_MAX_CHARS`] characters, cutting only
/// at whitespace and appending an ellipsis. Text with no usable break point
/// yields [`DEFAULT_SUMMARY`].
pub fn truncate_summary(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }

    let budget = SUMMARY_MAX_CHARS - ELLIPSIS.chars().count();
    // One extra char lets a word that ends exactly at the budget survive.
    let window_end = text
        .char_indices()
        .nth(budget + 1)
        .map_or(text.len(), |(i, _)| i);
    let window = &text[..window_end];

    match window.rfind(char::is_whitespace) {
        Some(cut) => {
            let head = window[..cut].trim_end();
            if head.is_empty() {
                DEFAULT_SUMMARY.to_string()
            } else {
                format!("{}{}", head, ELLIPSIS)
            }
        }
        None => DEFAULT_SUMMARY.to_string(),
    }
}

/// Characters excluding whitespace, counted as grapheme clusters.
pub fn word_count(content: &str) -> usize {
    content
        .graphemes(true)
        .filter(|g| !g.chars().all(char::is_whitespace))
        .count()
}

pub fn assemble(content: &str, sources: Vec<Source>, created_at: DateTime<Utc>) -> ArticleData {
    let (title, summary) = extract_title_and_summary(content);
    ArticleData {
        title,
        summary,
        content: content.to_string(),
        metadata: ArticleMetadata {
            word_count: word_count(content),
            category: COLUMN_CATEGORY.to_string(),
            created_date: iso_timestamp(created_at),
            sources,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_skips_section_headings() {
        let content = "## 💬 진영별 입장\n- a\n\n## **대선 여론조사** 분석\n\n첫 단락이다.\n둘째 줄이다.\n\n## 📌 결론\n끝.";
        let (title, summary) = extract_title_and_summary(content);
        assert_eq!(title, "대선 여론조사 분석");
        assert_eq!(summary, "첫 단락이다. 둘째 줄이다.");
    }

    #[test]
    fn test_title_may_mention_section_words() {
        let content = "## 헌재 탄핵 결론 임박, 정국 향방은\n\n헌법재판소 선고를 앞두고 여야가 맞선다.\n\n## 결론\n끝.";
        let (title, summary) = extract_title_and_summary(content);
        assert_eq!(title, "헌재 탄핵 결론 임박, 정국 향방은");
        assert_eq!(summary, "헌법재판소 선고를 앞두고 여야가 맞선다.");

        let (title, _) = extract_title_and_summary("## **결론**\n\n## 참고 자료 정리와 📌 해설\n본문");
        assert_eq!(title, DEFAULT_TITLE);
    }

    #[test]
    fn test_title_falls_back_to_level_one_then_default() {
        let (title, _) = extract_title_and_summary("# 큰 제목\n\n본문");
        assert_eq!(title, "큰 제목");

        let (title, summary) = extract_title_and_summary("### 소제목만 있다");
        assert_eq!(title, DEFAULT_TITLE);
        assert_eq!(summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_untitled_content_uses_first_paragraph() {
        let (title, summary) = extract_title_and_summary("머리말 없이 시작하는 글이다.\n\n## 📌 결론\n끝.");
        assert_eq!(title, DEFAULT_TITLE);
        assert_eq!(summary, "머리말 없이 시작하는 글이다.");
    }

    #[test]
    fn test_truncate_summary_cuts_at_word_boundary() {
        let text = "여론조사 결과가 발표되었다 ".repeat(40);
        let summary = truncate_summary(&text);
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
        assert!(summary.ends_with("..."));
        let body = summary.trim_end_matches("...");
        assert!(text.starts_with(body));
        // The cut lands right before a space in the source text.
        assert_eq!(text[body.len()..].chars().next(), Some(' '));
    }

    #[test]
    fn test_truncate_summary_keeps_short_text() {
        assert_eq!(truncate_summary("  짧은 요약이다.  "), "짧은 요약이다.");
        let exact = "가".repeat(SUMMARY_MAX_CHARS);
        assert_eq!(truncate_summary(&exact), exact);
    }

    #[test]
    fn test_truncate_summary_without_boundary_uses_default() {
        assert_eq!(truncate_summary(&"가".repeat(400)), DEFAULT_SUMMARY);
    }

    #[test]
    fn test_word_boundary_at_budget_edge() {
        let budget = SUMMARY_MAX_CHARS - 3;
        let text = format!("{} {}", "나".repeat(budget), "다".repeat(20));
        assert_eq!(truncate_summary(&text), format!("{}...", "나".repeat(budget)));
    }

    #[test]
    fn test_word_count_ignores_whitespace() {
        assert_eq!(word_count("가 나\n다"), 3);
        assert_eq!(word_count("👍🏽 ok"), 3);
    }

    #[test]
    fn test_assemble_metadata() {
        let sources = vec![Source {
            title: "기사".into(),
            uri: "https://news.example.com/1".into(),
        }];
        let created = DateTime::parse_from_rfc3339("2024-05-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let article = assemble("## 제목\n\n요약 문장이다.", sources.clone(), created);
        assert_eq!(article.title, "제목");
        assert_eq!(article.summary, "요약 문장이다.");
        assert_eq!(article.metadata.category, "정치");
        assert_eq!(article.metadata.created_date, "2024-05-01T09:30:00.000Z");
        assert_eq!(article.metadata.sources, sources);
    }
}
