use pc_core::Topic;

const KEYWORD_EXPANSIONS: [(&str, &str); 7] = [
    ("윤석열", "윤석열 대통령"),
    ("이재명", "이재명 민주당"),
    ("탄핵", "탄핵 정치"),
    ("국정감사", "국정감사 정치"),
    ("선거", "선거 정치"),
    ("여당", "여당 국민의힘"),
    ("야당", "야당 민주당"),
];

const QUERY_POLITICAL_MARKERS: [&str; 5] = ["정치", "대통령", "국회", "의원", "당"];

/// Words that mark an item as political news.
pub const POLITICAL_KEYWORDS: [&str; 34] = [
    "대통령", "정부", "청와대", "국무총리", "장관", "행정부",
    "국회", "의원", "국정감사", "국정조사", "법안", "입법", "의정",
    "민주당", "국민의힘", "정의당", "여당", "야당", "정치인", "정당",
    "선거", "투표", "공약", "정책", "개헌", "탄핵", "사퇴", "임명",
    "정치", "외교", "국정", "정무", "내각", "권력",
];

/// Expands well-known names and issues with political context so the
/// provider ranks political coverage first.
pub fn optimize_query(topic: &Topic) -> String {
    let mut query = topic.as_str().to_string();
    for (keyword, expanded) in KEYWORD_EXPANSIONS {
        if topic.as_str().contains(keyword) && !query.contains(expanded) {
            query = query.replacen(keyword, expanded, 1);
        }
    }
    let lowered = query.to_lowercase();
    if !QUERY_POLITICAL_MARKERS.iter().any(|m| lowered.contains(m)) {
        query.push_str(" 정치");
    }
    tracing::debug!("Optimized query: '{}' -> '{}'", topic, query);
    query
}

pub fn is_political(text: &str) -> bool {
    let lowered = text.to_lowercase();
    POLITICAL_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Distinct search terms of the topic, lowercased, at least two characters.
pub fn topic_terms(topic: &Topic) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in topic.as_str().split_whitespace() {
        let term: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if term.chars().count() >= 2 && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Share of topic terms found in `text`, in `[0, 1]`.
pub fn relevance(terms: &[String], text: &str) -> f32 {
    if terms.is_empty() {
        return 1.0;
    }
    let lowered = text.to_lowercase();
    let hits = terms.iter().filter(|t| lowered.contains(t.as_str())).count();
    hits as f32 / terms.len() as f32
}
