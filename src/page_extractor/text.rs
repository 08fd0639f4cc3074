//! Structure-preserving text flattening

use scraper::{ElementRef, Node};

/// Tags whose contents never reach the shaped output
pub(crate) const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

/// Tags that start and end on their own line
const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "article", "section", "div",
];

pub(crate) fn is_skipped(element: &ElementRef) -> bool {
    SKIPPED_TAGS.contains(&element.value().name())
}

fn is_block(element: &ElementRef) -> bool {
    BLOCK_TAGS.contains(&element.value().name())
}

/// Flatten an element to text, one line per block-level element
///
/// Text nodes contribute their trimmed text; block tags emit a newline before
/// and after their contents. Runs of blank lines collapse to one.
pub fn structured_text(element: &ElementRef) -> String {
    let mut raw = String::new();
    walk(element, &mut raw);
    tidy_lines(&raw)
}

fn walk(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push_str(trimmed);
                    out.push(' ');
                }
            }
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_skipped(&child_el) {
                    continue;
                }
                let block = is_block(&child_el);
                if block {
                    out.push('\n');
                }
                walk(&child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Raw text content of an element, excluding skipped subtrees
///
/// Equivalent to `textContent` after script/style/noscript removal.
pub fn visible_text(element: &ElementRef) -> String {
    let mut out = String::new();
    collect_visible(element, &mut out);
    out
}

fn collect_visible(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child)
                    && !is_skipped(&child_el)
                {
                    collect_visible(&child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn tidy_lines(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            if !previous_blank {
                lines.push("");
            }
            previous_blank = true;
        } else {
            lines.push(line);
            previous_blank = false;
        }
    }

    while lines.last() == Some(&"") {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn first<'a>(doc: &'a Html, selector: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(selector).unwrap()).next().unwrap()
    }

    #[test]
    fn block_tags_become_lines() {
        let doc = body(
            "<body><h2>Upcoming</h2><ul><li>Band X <b>March 15</b></li><li>Band Y</li></ul>\
             <span>inline</span> <span>spans</span></body>",
        );
        let text = structured_text(&first(&doc, "body"));
        assert_eq!(text, "Upcoming\n\nBand X March 15\n\nBand Y\ninline spans");
    }

    #[test]
    fn skips_script_style_and_noscript() {
        let doc = body(
            "<body><p>Doors 8pm</p><script>var secret = 1;</script>\
             <style>.x { color: red }</style><noscript>enable js</noscript></body>",
        );
        let root = first(&doc, "body");
        let text = structured_text(&root);
        assert_eq!(text, "Doors 8pm");

        let raw = visible_text(&root);
        assert!(raw.contains("Doors 8pm"));
        assert!(!raw.contains("secret"));
        assert!(!raw.contains("color"));
        assert!(!raw.contains("enable js"));
    }

    #[test]
    fn table_rows_split_lines() {
        let doc = body(
            "<body><table><tr><td>Fri</td><td>Band X</td></tr><tr><td>Sat</td><td>Band Y</td></tr></table></body>",
        );
        let text = structured_text(&first(&doc, "body"));
        assert_eq!(text, "Fri Band X\n\nSat Band Y");
    }
}
