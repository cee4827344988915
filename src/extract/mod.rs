//! Problem-page extraction.
//!
//! Each field is resolved by an ordered list of matchers; the first one that
//! yields non-empty text wins. Selectors are parsed and queried on every
//! call, so the same page can be re-extracted as it changes.

mod code;
mod description;
mod title;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Reply to a `getProblemDetails` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub title: String,
    pub description: String,
    pub code: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProblemDetails {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Messages understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtractorRequest {
    GetProblemDetails,
}

pub fn handle_request(request: ExtractorRequest, html: &str, page_url: Option<&str>) -> ProblemDetails {
    match request {
        ExtractorRequest::GetProblemDetails => extract_problem_details(html, page_url),
    }
}

/// Never fails: any error is folded into `success: false`.
pub fn extract_problem_details(html: &str, page_url: Option<&str>) -> ProblemDetails {
    match try_extract(html, page_url) {
        Ok(details) => details,
        Err(e) => {
            warn!("problem extraction failed: {}", e);
            ProblemDetails::failure(e.to_string())
        }
    }
}

fn try_extract(html: &str, page_url: Option<&str>) -> Result<ProblemDetails, ExtractError> {
    let page = Page {
        doc: Html::parse_document(html),
        url: page_url.and_then(|u| Url::parse(u).ok()),
    };

    let title = first_match(&page, title::MATCHERS)?;
    let description = first_match(&page, description::MATCHERS)?;
    let code = first_match(&page, code::MATCHERS)?;

    Ok(ProblemDetails {
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        code: code.unwrap_or_default(),
        success: true,
        error: None,
    })
}

pub(crate) struct Page {
    pub doc: Html,
    pub url: Option<Url>,
}

pub(crate) type Matcher = fn(&Page) -> Result<Option<String>, ExtractError>;

pub(crate) fn first_match(page: &Page, matchers: &[Matcher]) -> Result<Option<String>, ExtractError> {
    for matcher in matchers {
        if let Some(found) = matcher(page)?.filter(|s| !s.trim().is_empty()) {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Text of the first element matching any selector, in selector order.
pub(crate) fn first_selector_text(doc: &Html, selectors: &[&str]) -> Result<Option<String>, ExtractError> {
    for raw in selectors {
        let selector = parse_selector(raw)?;
        for element in doc.select(&selector) {
            let text = element_text(element);
            if !text.trim().is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

/// Concatenated descendant text, like the DOM's `textContent`.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

const CODE_HINTS: &[&str] = &["{", "}", ";", "=>", "return ", "class ", "def "];
const EXAMPLE_HINTS: &[&str] = &["Example", "Input:", "Output:", "Explanation:", "Constraints:"];

pub(crate) fn looks_like_code(text: &str) -> bool {
    CODE_HINTS.iter().any(|hint| text.contains(hint))
}

pub(crate) fn looks_like_example(text: &str) -> bool {
    EXAMPLE_HINTS.iter().any(|hint| text.contains(hint))
}
