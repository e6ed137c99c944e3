use scraper::{ElementRef, Html, Node as DomNode, Selector};
use url::Url;
use ns_core::{Error, Result};

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Browser(format!("Invalid selector {:?}: {:?}", selector, e)))
}

/// Text as a reader would see it: script and style content dropped, one
/// line per block element, runs of whitespace collapsed.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in element.descendants() {
        match node.value() {
            DomNode::Text(text) => {
                let hidden = node
                    .ancestors()
                    .take_while(|ancestor| ancestor.id() != element.id())
                    .filter_map(|ancestor| ancestor.value().as_element())
                    .any(|el| SKIPPED_TAGS.contains(&el.name()));
                if !hidden {
                    raw.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
                }
            }
            DomNode::Element(el) if BLOCK_TAGS.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Owned snapshot of one element: its markup, visible text and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    html: String,
    text: String,
    attributes: Vec<(String, String)>,
}

impl Node {
    fn from_element(element: ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
            text: visible_text(element),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First descendant matching `selector`, the node itself excluded.
    pub fn find_first(&self, selector: &str) -> Result<Option<Node>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        let Some(root) = fragment.root_element().children().find_map(ElementRef::wrap) else {
            return Ok(None);
        };
        let found = root
            .select(&selector)
            .find(|el| el.id() != root.id())
            .map(Node::from_element);
        Ok(found)
    }
}

/// A rendered document captured after navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    url: Url,
    html: String,
}

impl Page {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self { url, html: html.into() }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Content of the `<title>` element, empty when missing.
    pub fn title(&self) -> String {
        let document = Html::parse_document(&self.html);
        parse_selector("title")
            .ok()
            .and_then(|selector| {
                document
                    .select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
            })
            .unwrap_or_default()
    }

    /// Every element matching `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&selector).map(Node::from_element).collect())
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }
}
