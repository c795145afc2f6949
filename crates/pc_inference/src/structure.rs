//! Cheap structural inspection of a generated column.
//!
//! The model scores format subjectively; this check gives the evaluator a
//! hard ceiling when required sections are plainly missing.

/// Highest format score a column with structural issues can receive.
pub const INCOMPLETE_FORMAT_CEILING: f64 = 70.0;
pub const REQUIRED_STANCE_BULLETS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Title,
    Stance,
    Progressive,
    Conservative,
    Body,
    Conclusion,
    References,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub has_title: bool,
    pub has_summary: bool,
    pub progressive_bullets: usize,
    pub conservative_bullets: usize,
    pub has_body: bool,
    pub has_conclusion: bool,
}

impl StructureReport {
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.has_title {
            issues.push("제목 없음".to_string());
        }
        if !self.has_summary {
            issues.push("요약 단락 없음".to_string());
        }
        if self.progressive_bullets != REQUIRED_STANCE_BULLETS {
            issues.push(format!(
                "진보 진영 입장 {}개 (3개 필요)",
                self.progressive_bullets
            ));
        }
        if self.conservative_bullets != REQUIRED_STANCE_BULLETS {
            issues.push(format!(
                "보수 진영 입장 {}개 (3개 필요)",
                self.conservative_bullets
            ));
        }
        if !self.has_body {
            issues.push("본문 섹션 없음".to_string());
        }
        if !self.has_conclusion {
            issues.push("결론 섹션 없음".to_string());
        }
        issues
    }

    pub fn is_complete(&self) -> bool {
        self.issues().is_empty()
    }

    pub fn format_ceiling(&self) -> f64 {
        if self.is_complete() {
            pc_core::SCORE_MAX
        } else {
            INCOMPLETE_FORMAT_CEILING
        }
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 {
        return None;
    }
    let text = line[level..].trim();
    Some((level, text))
}

fn classify(level: usize, text: &str, seen_title: bool) -> Section {
    if !seen_title && level <= 2 {
        return Section::Title;
    }
    if text.contains('🔵') {
        return Section::Progressive;
    }
    if text.contains('🔴') {
        return Section::Conservative;
    }
    if text.contains('🧨') {
        return Section::Body;
    }
    if text.contains('📌') || text.starts_with("결론") {
        return Section::Conclusion;
    }
    if text.contains('💬') || text.contains("진영별") {
        return Section::Stance;
    }
    if text.starts_with("참고") {
        return Section::References;
    }
    if level >= 3 && text.contains("진보") {
        return Section::Progressive;
    }
    if level >= 3 && text.contains("보수") {
        return Section::Conservative;
    }
    Section::Body
}

pub fn inspect(content: &str) -> StructureReport {
    let mut report = StructureReport::default();
    let mut section = Section::Preamble;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((level, text)) = heading(line) {
            let next = classify(level, text, report.has_title);
            // Sub-headings under the body keep counting as body.
            section = match (section, next) {
                (Section::Body, Section::Body) => Section::Body,
                (_, next) => next,
            };
            match section {
                Section::Title => report.has_title = true,
                Section::Body => report.has_body = true,
                Section::Conclusion => report.has_conclusion = true,
                _ => {}
            }
            continue;
        }

        let is_bullet = line.starts_with("- ") || line.starts_with("* ");
        match section {
            Section::Title if !is_bullet => report.has_summary = true,
            Section::Progressive if is_bullet => report.progressive_bullets += 1,
            Section::Conservative if is_bullet => report.conservative_bullets += 1,
            _ => {}
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
## 대선 여론조사, 접전 속 변수는

최근 여론조사에서 양 후보가 오차범위 내 접전을 보였다.

## 💬 여론조사에 대한 진영별 입장

### 🔵 진보 진영 입장
- 정권 심판 여론이 확산되고 있다.
- 청년층 지지가 늘었다.
- 정책 경쟁력이 부각되었다.

### 🔴 보수 진영 입장
- 안정론이 힘을 얻고 있다.
- 중도층 이탈은 제한적이다.
- 경제 성과가 평가받고 있다.

## 🧨 여론조사의 쟁점
### 표본과 방법론
1. 조사 방식에 따라 결과가 달라진다.

## 📌 결론: 여론조사의 핵심과 전망

결과 해석에는 신중함이 필요하다.

## 참고 자료
- [대선 여론조사 접전](https://news.example.com/1)
";

    #[test]
    fn test_well_formed_column_is_complete() {
        let report = inspect(WELL_FORMED);
        assert!(report.is_complete(), "{:?}", report.issues());
        assert_eq!(report.progressive_bullets, 3);
        assert_eq!(report.conservative_bullets, 3);
        assert_eq!(report.format_ceiling(), 100.0);
    }

    #[test]
    fn test_missing_sections_are_reported() {
        let report = inspect("## 제목\n\n요약이다.\n\n## 🧨 쟁점\n본문이다.");
        assert!(!report.is_complete());
        let issues = report.issues();
        assert!(issues.iter().any(|i| i.contains("진보")));
        assert!(issues.iter().any(|i| i.contains("결론")));
        assert_eq!(report.format_ceiling(), INCOMPLETE_FORMAT_CEILING);
    }

    #[test]
    fn test_title_mentioning_a_camp_is_still_the_title() {
        let report = inspect("## 보수 야당의 반발\n\n요약이다.");
        assert!(report.has_title);
        assert!(report.has_summary);
        assert_eq!(report.conservative_bullets, 0);
    }

    #[test]
    fn test_unbalanced_bullets() {
        let text = WELL_FORMED.replace("- 경제 성과가 평가받고 있다.\n", "");
        let report = inspect(&text);
        assert_eq!(report.conservative_bullets, 2);
        assert!(!report.is_complete());
    }
}
