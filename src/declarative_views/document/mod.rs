//! # Document Environment
//!
//! The template cache never touches a DOM directly. Everything it needs from
//! its environment goes through the [`Document`] trait:
//!
//! - **Query**: resolve a selector to zero or one [`TemplateNode`]
//! - **Wrap**: build a detached, non-rendering `<template>` node whose text
//!   content is a given markup string
//!
//! ## Implementations
//!
//! - [`memory::MemoryDocument`]: nodes held in memory, simple selectors,
//!   mutable. Used by tests and by hosts that register templates by hand.
//! - [`html::HtmlDocument`]: a parsed HTML page with full CSS selector
//!   support (via `scraper`). Used by the CLI.
//!
//! Nodes are returned as owned snapshots. A node's `data` map plays the role
//! of the environment's attribute cache: it may hold stale values, which is
//! why attribute extraction always reads [`TemplateNode::attribute`] instead.
//! Refreshed caches go back to the environment through
//! [`Document::sync_attribute_cache`].

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod html;
pub mod memory;

/// Tag name of the synthetic wrapper built around raw markup.
pub const TEMPLATE_TAG: &str = "template";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular element found in a document.
    Element,
    /// A non-rendering `<template>` wrapper.
    Template,
}

/// A resolved template node: its attributes and inner markup.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    tag_name: String,
    kind: NodeKind,
    attributes: BTreeMap<String, String>,
    inner_html: String,
    attached: bool,
    data: BTreeMap<String, Value>,
}

impl TemplateNode {
    /// Creates a detached element node.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            kind: NodeKind::Element,
            attributes: BTreeMap::new(),
            inner_html: String::new(),
            attached: false,
            data: BTreeMap::new(),
        }
    }

    /// Creates a detached `<template>` wrapper whose content is `text`,
    /// verbatim.
    pub fn template(text: impl Into<String>) -> Self {
        Self {
            tag_name: TEMPLATE_TAG.to_string(),
            kind: NodeKind::Template,
            attributes: BTreeMap::new(),
            inner_html: text.into(),
            attached: false,
            data: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Reads an attribute straight from the node's attribute storage.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn set_inner_html(&mut self, html: impl Into<String>) {
        self.inner_html = html.into();
    }

    /// Whether the node belongs to a live document.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The environment's attribute cache for this node, keyed by camel name.
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.data
    }

    /// A node is well-formed if it carries a plausible element tag name.
    pub fn is_well_formed(&self) -> bool {
        let mut chars = self.tag_name.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

/// Failure to run a selector query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Selector engine failure: {0}")]
    Engine(String),
}

/// The node-resolution capability the cache consumes.
pub trait Document {
    /// Resolves `selector` to the first matching node, if any.
    fn query(&self, selector: &str) -> Result<Option<TemplateNode>, QueryError>;

    /// Builds a detached `<template>` node whose text content is `markup`.
    fn create_template(&self, markup: &str) -> TemplateNode {
        TemplateNode::template(markup)
    }

    /// Replaces the attribute cache of the node `selector` resolves to.
    ///
    /// Environments without an attribute cache keep the default no-op.
    fn sync_attribute_cache(&self, selector: &str, data: &BTreeMap<String, Value>) {
        let _ = (selector, data);
    }
}

impl<T: Document + ?Sized> Document for &T {
    fn query(&self, selector: &str) -> Result<Option<TemplateNode>, QueryError> {
        (**self).query(selector)
    }

    fn create_template(&self, markup: &str) -> TemplateNode {
        (**self).create_template(markup)
    }

    fn sync_attribute_cache(&self, selector: &str, data: &BTreeMap<String, Value>) {
        (**self).sync_attribute_cache(selector, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_wrapper_keeps_text_verbatim() {
        let markup = "<p class='a'>x &amp; y</p>\n  ";
        let node = TemplateNode::template(markup);
        assert_eq!(node.inner_html(), markup);
        assert_eq!(node.kind(), NodeKind::Template);
        assert_eq!(node.tag_name(), "template");
        assert!(!node.is_attached());
    }

    #[test]
    fn attributes_are_lowercased_on_write() {
        let node = TemplateNode::new("DIV").with_attribute("Data-Tag-Name", "ul");
        assert_eq!(node.tag_name(), "div");
        assert_eq!(node.attribute("data-tag-name"), Some("ul"));
    }

    #[test]
    fn well_formed_requires_tag_name() {
        assert!(TemplateNode::new("script").is_well_formed());
        assert!(TemplateNode::new("my-widget").is_well_formed());
        assert!(!TemplateNode::new("").is_well_formed());
        assert!(!TemplateNode::new("1abc").is_well_formed());
    }
}
