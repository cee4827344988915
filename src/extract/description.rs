use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::{
    ExtractError, Matcher, Page, collapse_whitespace, element_text, first_selector_text,
    looks_like_example, parse_selector,
};

const SELECTORS: &[&str] = &[
    r#"[data-cy="question-content"]"#,
    r#"div[data-track-load="description_content"]"#,
    r#"div[class*="content__"]"#,
    r#"div[class*="question-content"]"#,
    ".elfjS",
];

pub(crate) const MAX_CHARS: usize = 2000;

pub(super) const MATCHERS: &[Matcher] = &[from_selectors, from_paragraphs];

fn from_selectors(page: &Page) -> Result<Option<String>, ExtractError> {
    let Some(text) = first_selector_text(&page.doc, SELECTORS)? else {
        return Ok(None);
    };
    let statement = cut_before_examples(&text)?;
    Ok(Some(cap_length(collapse_whitespace(statement))))
}

/// Paragraphs outside code blocks that do not read like examples.
fn from_paragraphs(page: &Page) -> Result<Option<String>, ExtractError> {
    let selector = parse_selector("p")?;
    let paragraphs: Vec<String> = page
        .doc
        .select(&selector)
        .filter(|p| !inside_code_block(*p))
        .map(element_text)
        .filter(|text| !text.trim().is_empty() && !looks_like_example(text))
        .collect();

    if paragraphs.is_empty() {
        return Ok(None);
    }
    Ok(Some(cap_length(collapse_whitespace(&paragraphs.join(" ")))))
}

fn inside_code_block(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|el| matches!(el.name(), "pre" | "code"))
}

static EXAMPLE_MARKER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"Example\s*\d+\s*:"));

fn example_marker() -> Result<&'static Regex, ExtractError> {
    EXAMPLE_MARKER
        .as_ref()
        .map_err(|e| ExtractError::Pattern(e.clone()))
}

/// The statement ends at the first `Example N:` marker. A bare `Example` only
/// counts when it sits in the first half of the text.
pub(crate) fn cut_before_examples(text: &str) -> Result<&str, ExtractError> {
    let marker = example_marker()?;
    if let Some(found) = marker.find(text) {
        return Ok(&text[..found.start()]);
    }
    match text.find("Example") {
        Some(pos) if pos < text.len() / 2 => Ok(&text[..pos]),
        _ => Ok(text),
    }
}

pub(crate) fn cap_length(text: String) -> String {
    if text.chars().count() <= MAX_CHARS {
        return text;
    }
    let mut capped: String = text.chars().take(MAX_CHARS).collect();
    capped.push_str("...");
    capped
}
