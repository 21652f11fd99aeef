//! # Template Loading
//!
//! A loader turns a template identifier into a [`TemplateNode`]. The default
//! loader first tries the identifier as a selector; if that finds nothing
//! attached to the document and the identifier looks like markup, it wraps
//! the markup in a synthetic `<template>` node, copying any declarative
//! attributes from an embedded comment onto the wrapper.
//!
//! Loaders report "nothing here" as [`LoadOutcome::NotFound`], not as an
//! error. A [`LoaderError::Declarative`] error is a deliberate signal and
//! reaches the caller unchanged; a [`LoaderError::Failed`] error is logged
//! and treated like `NotFound`.

use crate::attributes::AttributeRegistry;
use crate::document::{Document, TemplateNode};
use crate::error::{BoxError, DeclarativeError};
use crate::view::View;
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Resolved(TemplateNode),
    NotFound,
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Declarative(#[from] DeclarativeError),

    #[error("Template loader failed: {0}")]
    Failed(#[source] BoxError),
}

impl LoaderError {
    pub fn failed(error: impl Into<BoxError>) -> Self {
        LoaderError::Failed(error.into())
    }
}

/// What a loader gets to see besides the identifier.
pub struct LoadContext<'a> {
    pub document: &'a dyn Document,
    pub registry: &'a AttributeRegistry,
    /// The view asking, if any. Only its id is guaranteed to be set up.
    pub view: Option<&'a View>,
}

pub type LoaderFn = Box<dyn Fn(&str, &LoadContext<'_>) -> Result<LoadOutcome, LoaderError>>;

/// Which loader produced a node. Used to name the culprit in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderOrigin {
    Default,
    ModifiedDefault,
    Custom,
}

impl LoaderOrigin {
    pub fn is_customized(self) -> bool {
        !matches!(self, LoaderOrigin::Default)
    }

    pub fn describe(self) -> &'static str {
        match self {
            LoaderOrigin::Default => "default loader",
            LoaderOrigin::ModifiedDefault => "modified default loader",
            LoaderOrigin::Custom => "custom loader",
        }
    }
}

/// The two user-settable loader slots. A custom loader wins over a modified
/// default, which wins over the built-in default.
#[derive(Default)]
pub struct LoaderSlots {
    custom: Option<LoaderFn>,
    default_override: Option<LoaderFn>,
}

impl LoaderSlots {
    pub fn set_custom<F>(&mut self, loader: F)
    where
        F: Fn(&str, &LoadContext<'_>) -> Result<LoadOutcome, LoaderError> + 'static,
    {
        self.custom = Some(Box::new(loader));
    }

    pub fn clear_custom(&mut self) {
        self.custom = None;
    }

    /// Replaces the built-in default loader.
    pub fn set_default<F>(&mut self, loader: F)
    where
        F: Fn(&str, &LoadContext<'_>) -> Result<LoadOutcome, LoaderError> + 'static,
    {
        self.default_override = Some(Box::new(loader));
    }

    pub fn restore_default(&mut self) {
        self.default_override = None;
    }

    pub fn origin(&self) -> LoaderOrigin {
        if self.custom.is_some() {
            LoaderOrigin::Custom
        } else if self.default_override.is_some() {
            LoaderOrigin::ModifiedDefault
        } else {
            LoaderOrigin::Default
        }
    }

    pub fn load(&self, identifier: &str, ctx: &LoadContext<'_>) -> Result<LoadOutcome, LoaderError> {
        match (&self.custom, &self.default_override) {
            (Some(loader), _) | (None, Some(loader)) => loader(identifier, ctx),
            (None, None) => load_template(identifier, ctx),
        }
    }
}

/// The built-in loader.
pub fn load_template(identifier: &str, ctx: &LoadContext<'_>) -> Result<LoadOutcome, LoaderError> {
    match ctx.document.query(identifier) {
        Ok(Some(node)) if node.is_attached() => return Ok(LoadOutcome::Resolved(node)),
        Ok(_) => {}
        Err(e) => trace!(identifier, error = %e, "identifier is not a selector"),
    }

    if !looks_like_markup(identifier) {
        return Ok(LoadOutcome::NotFound);
    }
    Ok(wrap_raw_markup(identifier, ctx))
}

/// Raw markup starts with a tag, comment or doctype after optional whitespace.
pub fn looks_like_markup(identifier: &str) -> bool {
    identifier.trim_start().starts_with('<')
}

/// Wraps `markup` in a detached `<template>` node.
///
/// Attributes from the first comment declaring a registered attribute are
/// copied onto the wrapper. If the wrapper's content differs from `markup`
/// the result is `NotFound`.
pub fn wrap_raw_markup(markup: &str, ctx: &LoadContext<'_>) -> LoadOutcome {
    let mut node = ctx.document.create_template(markup);
    if let Some(embedded) = ctx.registry.matcher().find(markup) {
        for (name, value) in embedded.attributes {
            node.set_attribute(&name, value);
        }
    }

    if node.inner_html() != markup {
        warn!("failed to wrap template markup without altering it");
        return LoadOutcome::NotFound;
    }
    LoadOutcome::Resolved(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::memory::fixtures::DocumentFixture;
    use crate::document::memory::MemoryDocument;
    use crate::document::QueryError;

    fn ctx<'a>(doc: &'a dyn Document, registry: &'a AttributeRegistry) -> LoadContext<'a> {
        LoadContext {
            document: doc,
            registry,
            view: None,
        }
    }

    #[test]
    fn resolves_selector() {
        let doc = DocumentFixture::new().with_template("t", "<p></p>").build();
        let registry = AttributeRegistry::with_defaults();
        match load_template("#t", &ctx(&doc, &registry)).unwrap() {
            LoadOutcome::Resolved(node) => assert_eq!(node.inner_html(), "<p></p>"),
            LoadOutcome::NotFound => panic!("expected a node"),
        }
    }

    #[test]
    fn missing_selector_is_not_found() {
        let doc = MemoryDocument::new();
        let registry = AttributeRegistry::with_defaults();
        assert_eq!(
            load_template("#doesNotExist", &ctx(&doc, &registry)).unwrap(),
            LoadOutcome::NotFound
        );
    }

    #[test]
    fn wraps_raw_markup_with_embedded_attributes() {
        let doc = MemoryDocument::new();
        let registry = AttributeRegistry::with_defaults();
        let markup = r#"<!-- data-tag-name="ul" data-attributes='{"role":"list"}' --><li>x</li>"#;

        let LoadOutcome::Resolved(node) = load_template(markup, &ctx(&doc, &registry)).unwrap()
        else {
            panic!("expected a node");
        };
        assert_eq!(node.tag_name(), "template");
        assert_eq!(node.inner_html(), markup);
        assert_eq!(node.attribute("data-tag-name"), Some("ul"));
        assert_eq!(node.attribute("data-attributes"), Some(r#"{"role":"list"}"#));
    }

    #[test]
    fn altered_wrapper_is_not_found() {
        struct Normalizing;
        impl Document for Normalizing {
            fn query(&self, _: &str) -> Result<Option<TemplateNode>, QueryError> {
                Err(QueryError::Engine("no selectors here".into()))
            }
            fn create_template(&self, markup: &str) -> TemplateNode {
                TemplateNode::template(markup.trim())
            }
        }

        let registry = AttributeRegistry::with_defaults();
        let outcome = load_template("  <p></p>  ", &ctx(&Normalizing, &registry)).unwrap();
        assert_eq!(outcome, LoadOutcome::NotFound);
    }

    #[test]
    fn detached_query_results_fall_back_to_markup() {
        struct Detached;
        impl Document for Detached {
            fn query(&self, _: &str) -> Result<Option<TemplateNode>, QueryError> {
                Ok(Some(TemplateNode::new("p")))
            }
        }

        let registry = AttributeRegistry::with_defaults();
        let LoadOutcome::Resolved(node) =
            load_template("<p>hi</p>", &ctx(&Detached, &registry)).unwrap()
        else {
            panic!("expected a node");
        };
        assert_eq!(node.tag_name(), "template");
    }

    #[test]
    fn slots_prefer_custom_over_modified_default() {
        let doc = MemoryDocument::new();
        let registry = AttributeRegistry::with_defaults();
        let mut slots = LoaderSlots::default();
        assert_eq!(slots.origin(), LoaderOrigin::Default);

        slots.set_default(|_, _| Ok(LoadOutcome::Resolved(TemplateNode::new("section"))));
        assert_eq!(slots.origin(), LoaderOrigin::ModifiedDefault);

        slots.set_custom(|_, _| Ok(LoadOutcome::NotFound));
        assert_eq!(slots.origin(), LoaderOrigin::Custom);
        assert_eq!(
            slots.load("anything", &ctx(&doc, &registry)).unwrap(),
            LoadOutcome::NotFound
        );

        slots.clear_custom();
        assert!(matches!(
            slots.load("anything", &ctx(&doc, &registry)).unwrap(),
            LoadOutcome::Resolved(_)
        ));
    }

    #[test]
    fn looks_like_markup_checks_first_char() {
        assert!(looks_like_markup("<p></p>"));
        assert!(looks_like_markup("\n  <!-- c -->"));
        assert!(!looks_like_markup("#id"));
        assert!(!looks_like_markup("plain text"));
    }
}
