use scraper::{ElementRef, Html, Node, Selector};

/// Candidate containers for the page's primary content, most specific first.
const CONTENT_ROOTS: [&str; 5] = [
    "main",
    "[role=\"main\"]",
    "article",
    "#cs_control_main",
    "body",
];

/// Boilerplate and non-visible subtrees that never contribute text.
const SKIPPED_ELEMENTS: [&str; 10] = [
    "nav", "header", "footer", "aside", "script", "style", "noscript", "form", "template",
    "button",
];

const BLOCK_ELEMENTS: [&str; 24] = [
    "address",
    "article",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "section",
    "table",
    "td",
    "tr",
    "ul",
];

/// Pulls the readable text out of a page, dropping navigation and other chrome.
///
/// Each block-level element starts a new line; whitespace inside a line is
/// collapsed and blank lines are removed. Returns `None` when nothing readable
/// is left.
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    CONTENT_ROOTS.iter().find_map(|root| {
        let selector = Selector::parse(root).ok()?;
        let element = document.select(&selector).next()?;
        let text = readable_text(element);
        (!text.is_empty()).then_some(text)
    })
}

fn readable_text(root: ElementRef<'_>) -> String {
    let mut buffer = String::new();
    collect_text(root, &mut buffer);

    buffer
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, buffer: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source line breaks inside a text node are not content breaks.
            Node::Text(text) => buffer.extend(
                text.chars()
                    .map(|c| if c.is_whitespace() { ' ' } else { c }),
            ),
            Node::Element(inner) => {
                let name = inner.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    buffer.push('\n');
                }
                collect_text(child_element, buffer);
                if block {
                    buffer.push('\n');
                }
            }
            _ => {}
        }
    }
}
