use super::{Document, QueryError, TemplateNode};
use crate::error::Result;
use scraper::{Html, Selector};
use std::fs;
use std::path::Path;

/// Elements whose content the parser keeps as raw text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// A parsed HTML page. Selectors are full CSS selectors.
pub struct HtmlDocument {
    source: String,
    html: Html,
}

impl HtmlDocument {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let html = Html::parse_document(&source);
        Self { source, html }
    }

    /// Reads and parses an HTML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Ok(Self::parse(source))
    }

    /// Swaps in a new page, e.g. after the file changed on disk.
    pub fn replace_source(&mut self, source: impl Into<String>) {
        *self = Self::parse(source);
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("len", &self.source.len())
            .finish()
    }
}

impl Document for HtmlDocument {
    fn query(&self, selector: &str) -> std::result::Result<Option<TemplateNode>, QueryError> {
        let parsed = Selector::parse(selector)
            .map_err(|_| QueryError::InvalidSelector(selector.to_string()))?;

        Ok(self.html.select(&parsed).next().map(|element| {
            let value = element.value();
            let inner_html = if RAW_TEXT_ELEMENTS.contains(&value.name()) {
                element.text().collect::<String>()
            } else {
                element.inner_html()
            };
            let mut node = TemplateNode::new(value.name()).with_inner_html(inner_html);
            for (name, attr) in value.attrs() {
                node.set_attribute(name, attr);
            }
            node.attached()
        }))
    }
}
