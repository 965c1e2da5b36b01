use regex::Regex;
use scraper::{Html, Node, Selector};
use std::sync::OnceLock;

pub const MAX_DESCRIPTION_CHARS: usize = 4000;

const HIDDEN_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\p{Cc}]+").expect("static regex"))
}

/// Collapses runs of whitespace and control characters into single spaces and trims.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").trim().to_string()
}

/// Truncates on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub fn clean_description(text: &str) -> String {
    truncate_chars(&collapse_whitespace(text), MAX_DESCRIPTION_CHARS)
}

/// Text of the first element matching any selector in order, skipping empty matches.
pub fn select_text(html: &str, selectors: &[&str]) -> Option<String> {
    let document = Html::parse_document(html);
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document
            .select(&selector)
            .map(|element| collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")))
            .find(|text| !text.is_empty())
    })
}

/// Visible body text of an HTML document, ignoring script and style content.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| HIDDEN_TAGS.contains(&element.name()))
                .unwrap_or(false)
        });
        if !hidden {
            parts.push(text.text.to_string());
        }
    }

    collapse_whitespace(&parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace_and_control_chars() {
        let raw = "  Senior\tRust\n\n Engineer\u{0007}  (Remote)\r\n";
        assert_eq!(collapse_whitespace(raw), "Senior Rust Engineer (Remote)");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_clean_description_caps_length() {
        let long = "word ".repeat(2000);
        let cleaned = clean_description(&long);
        assert_eq!(cleaned.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_select_text_falls_through_chain() {
        let html = r#"<html><body>
            <div class="empty">   </div>
            <section class="job-desc"><p>Build   pipelines</p><p>in Rust</p></section>
        </body></html>"#;

        let text = select_text(html, &["#missing", ".empty", "section.job-desc"]);
        assert_eq!(text.as_deref(), Some("Build pipelines in Rust"));
        assert_eq!(select_text(html, &["#missing", "[[invalid"]), None);
    }

    #[test]
    fn test_page_text_skips_scripts() {
        let html = r#"<html><head><title>T</title><style>p{}</style></head>
            <body><p>Visible</p><script>var hidden = 1;</script><div>text</div></body></html>"#;
        assert_eq!(page_text(html), "Visible text");
    }
}
