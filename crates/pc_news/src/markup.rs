use scraper::Html;

/// Strips provider highlight tags and decodes entities.
pub fn clean_text(raw: &str) -> String {
    if !raw.contains('<') && !raw.contains('&') {
        return collapse_whitespace(raw);
    }
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<String>();
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_tags_and_entities() {
        assert_eq!(
            clean_text("<b>대선</b> 여론조사 &quot;접전&quot; &amp; 변수"),
            "대선 여론조사 \"접전\" & 변수"
        );
    }

    #[test]
    fn test_clean_text_plain_input() {
        assert_eq!(clean_text("  국회   본회의  "), "국회 본회의");
    }
}
