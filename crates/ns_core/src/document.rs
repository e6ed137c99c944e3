use chrono::{DateTime, Local};
use crate::types::{ExtractedArticle, SearchResult};

const SECTION_SEPARATOR_WIDTH: usize = 80;

/// The article text handed to chunking: a header followed by one section
/// per extracted article, in result order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedDocument {
    text: String,
    sections: usize,
}

impl AggregatedDocument {
    pub fn new(topic: &str, searched_at: DateTime<Local>) -> Self {
        let text = format!(
            "# News: {}\nSearch time: {}\n\n",
            topic,
            searched_at.format("%Y-%m-%d %H:%M:%S")
        );
        Self { text, sections: 0 }
    }

    pub fn push_article(&mut self, result: &SearchResult, article: &ExtractedArticle) {
        let title = if article.title.trim().is_empty() {
            result.title.as_str()
        } else {
            article.title.as_str()
        };
        self.text.push_str(&format!(
            "## {}\nSource: {}\nDate: {}\n\n{}\n\n{}\n\n",
            title,
            result.source,
            result.date_text,
            article.content,
            "=".repeat(SECTION_SEPARATOR_WIDTH)
        ));
        self.sections += 1;
    }

    pub fn sections(&self) -> usize {
        self.sections
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
