use super::{
    ExtractError, Matcher, Page, collapse_whitespace, element_text, first_selector_text,
    looks_like_code, looks_like_example, parse_selector,
};

const SELECTORS: &[&str] = &[
    r#"[data-cy="question-title"]"#,
    r#"div[class*="text-title-large"] a"#,
    r#"div[class*="text-title-large"]"#,
    ".mr-2.text-lg",
    r#"[class*="question-title"] h3"#,
];

const HEADING_SCAN: &str = "h1, h2, h3, h4, div";

pub(super) const MATCHERS: &[Matcher] = &[from_selectors, from_url, from_shortest_heading];

fn from_selectors(page: &Page) -> Result<Option<String>, ExtractError> {
    Ok(first_selector_text(&page.doc, SELECTORS)?.map(|t| collapse_whitespace(&t)))
}

/// `/problems/two-sum/description` → `Two Sum`.
fn from_url(page: &Page) -> Result<Option<String>, ExtractError> {
    let Some(url) = &page.url else {
        return Ok(None);
    };
    let Some(segments) = url.path_segments() else {
        return Ok(None);
    };
    let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();

    let slug = match segments.iter().position(|s| *s == "problems") {
        Some(i) => segments.get(i + 1).copied(),
        None => segments.last().copied(),
    };
    Ok(slug.map(title_case_slug).filter(|t| !t.is_empty()))
}

fn title_case_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last resort: the shortest heading-ish text that is neither code nor an
/// example block.
fn from_shortest_heading(page: &Page) -> Result<Option<String>, ExtractError> {
    let selector = parse_selector(HEADING_SCAN)?;
    let shortest = page
        .doc
        .select(&selector)
        .map(|element| collapse_whitespace(&element_text(element)))
        .filter(|text| text.chars().any(char::is_alphabetic))
        .filter(|text| !looks_like_code(text) && !looks_like_example(text))
        .min_by_key(|text| text.chars().count());
    Ok(shortest)
}
