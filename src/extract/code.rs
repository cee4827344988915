use super::{ExtractError, Matcher, Page, element_text, parse_selector};

/// Editor containers paired with the selector of their rendered lines.
const EDITORS: &[(&str, &str)] = &[
    (".monaco-editor", ".view-line"),
    (".CodeMirror", ".CodeMirror-line"),
];

const TEXTAREAS: &[&str] = &["textarea#code", "textarea"];

pub(super) const MATCHERS: &[Matcher] = &[from_editor_lines, from_textarea];

fn from_editor_lines(page: &Page) -> Result<Option<String>, ExtractError> {
    for (container, line) in EDITORS {
        let container = parse_selector(container)?;
        let line = parse_selector(line)?;
        let Some(editor) = page.doc.select(&container).next() else {
            continue;
        };
        let lines: Vec<String> = editor.select(&line).map(element_text).collect();
        if lines.is_empty() {
            continue;
        }
        let code = normalize_code(&lines.join("\n"));
        if !code.is_empty() {
            return Ok(Some(code));
        }
    }
    Ok(None)
}

fn from_textarea(page: &Page) -> Result<Option<String>, ExtractError> {
    for raw in TEXTAREAS {
        let selector = parse_selector(raw)?;
        if let Some(area) = page.doc.select(&selector).next() {
            let code = normalize_code(&element_text(area));
            if !code.is_empty() {
                return Ok(Some(code));
            }
        }
    }
    Ok(None)
}

/// Trims every line, replaces non-breaking spaces and keeps at most two
/// consecutive blank lines.
pub(crate) fn normalize_code(raw: &str) -> String {
    let cleaned = raw.replace('\u{a0}', " ");
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    for line in cleaned.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::extract::first_match;

    fn page(html: &str) -> Page {
        Page {
            doc: Html::parse_document(html),
            url: None,
        }
    }

    #[test]
    fn long_blank_runs_collapse_to_two() {
        assert_eq!(normalize_code("a\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn lines_are_trimmed_and_nbsp_replaced() {
        assert_eq!(
            normalize_code("\u{a0}\u{a0}def f():\n\u{a0}\u{a0}\u{a0}\u{a0}return 1  \n"),
            "def f():\nreturn 1"
        );
    }

    #[test]
    fn codemirror_lines_are_read_when_monaco_is_absent() {
        let p = page(
            r#"<div class="CodeMirror">
                 <pre class="CodeMirror-line"><span>int main() {</span></pre>
                 <pre class="CodeMirror-line"><span>  return 0;</span></pre>
                 <pre class="CodeMirror-line"><span>}</span></pre>
               </div>"#,
        );
        assert_eq!(
            first_match(&p, MATCHERS).unwrap().as_deref(),
            Some("int main() {\nreturn 0;\n}")
        );
    }

    #[test]
    fn textarea_is_the_last_resort() {
        let p = page("<textarea>  x = 1\n  print(x)</textarea>");
        assert_eq!(
            first_match(&p, MATCHERS).unwrap().as_deref(),
            Some("x = 1\nprint(x)")
        );
    }

    #[test]
    fn no_editor_yields_nothing() {
        let p = page("<div><p>no code here</p></div>");
        assert_eq!(first_match(&p, MATCHERS).unwrap(), None);
    }
}
