//! Registered data attributes.
//!
//! The registry knows which `data-*` attributes are declarative, whether each
//! holds a plain string or JSON, and keeps the embedded-comment matcher in
//! sync with the registered names.

use super::matcher::DetectionMatcher;
use super::value::{AttrValue, DataAttributes};
use crate::document::TemplateNode;
use crate::error::{DeclarativeError, Result};
use crate::naming::{dashed_to_camel, is_valid_attribute_name};
use tracing::{debug, trace};

/// Prefix every declarative attribute carries in markup.
pub const ATTRIBUTE_PREFIX: &str = "data-";

/// Names that would collide with cache entry fields.
pub const RESERVED_NAMES: &[&str] = &["html", "compiled"];

pub const TAG_NAME: &str = "tag-name";
pub const CLASS_NAME: &str = "class-name";
pub const ID: &str = "id";
pub const ATTRIBUTES: &str = "attributes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Plain string value.
    Primitive,
    /// JSON-encoded value.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Dashed name without the `data-` prefix.
    pub name: String,
    pub kind: AttributeKind,
}

impl AttributeSpec {
    pub fn markup_name(&self) -> String {
        format!("{}{}", ATTRIBUTE_PREFIX, self.name)
    }

    pub fn camel_name(&self) -> String {
        dashed_to_camel(&self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    specs: Vec<AttributeSpec>,
    matcher: DetectionMatcher,
}

impl AttributeRegistry {
    /// An empty registry. Most callers want [`AttributeRegistry::with_defaults`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `tag-name`, `class-name`, `id` and `attributes`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.specs = vec![
            AttributeSpec {
                name: TAG_NAME.to_string(),
                kind: AttributeKind::Primitive,
            },
            AttributeSpec {
                name: CLASS_NAME.to_string(),
                kind: AttributeKind::Primitive,
            },
            AttributeSpec {
                name: ID.to_string(),
                kind: AttributeKind::Primitive,
            },
            AttributeSpec {
                name: ATTRIBUTES.to_string(),
                kind: AttributeKind::Json,
            },
        ];
        registry.matcher = DetectionMatcher::for_names(registry.specs.iter().map(|s| s.name.as_str()))
            .unwrap_or_default();
        registry
    }

    /// Registers a new attribute. Registration is permanent.
    ///
    /// Names are matched case-insensitively, like HTML attribute names, and
    /// stored lowercased.
    ///
    /// # Errors
    ///
    /// `Customization` if the name carries the `data-` prefix, is reserved,
    /// cannot form an HTML attribute name, or is already registered. The
    /// registry is left unchanged on error.
    pub fn register(&mut self, name: &str, kind: AttributeKind) -> Result<()> {
        let name = name.to_ascii_lowercase();
        if name.starts_with(ATTRIBUTE_PREFIX) {
            return Err(DeclarativeError::customization(format!(
                "Invalid attribute name \"{}\": register the name without the \"{}\" prefix",
                name, ATTRIBUTE_PREFIX
            )));
        }
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(DeclarativeError::customization(format!(
                "Invalid attribute name \"{}\": the name is reserved",
                name
            )));
        }
        if !is_valid_attribute_name(&name) {
            return Err(DeclarativeError::customization(format!(
                "Invalid attribute name \"{}\": not usable in an HTML attribute name",
                name
            )));
        }
        if self.is_registered(&name) {
            return Err(DeclarativeError::customization(format!(
                "Invalid attribute name \"{}\": the attribute is already registered",
                name
            )));
        }

        let matcher = DetectionMatcher::for_names(
            self.specs
                .iter()
                .map(|s| s.name.as_str())
                .chain(std::iter::once(name.as_str())),
        )?;

        debug!(attribute = %name, ?kind, "registered data attribute");
        self.specs.push(AttributeSpec { name, kind });
        self.matcher = matcher;
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.get_spec(name).is_some()
    }

    pub fn get_spec(&self, name: &str) -> Option<&AttributeSpec> {
        self.specs.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn specs(&self) -> &[AttributeSpec] {
        &self.specs
    }

    pub fn primitive_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(AttributeKind::Primitive)
    }

    pub fn json_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(AttributeKind::Json)
    }

    fn names_of(&self, kind: AttributeKind) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(move |s| s.kind == kind)
            .map(|s| s.name.as_str())
    }

    pub fn matcher(&self) -> &DetectionMatcher {
        &self.matcher
    }

    /// Reads every registered attribute from the node's attribute storage.
    ///
    /// The node's `data` cache is never consulted. JSON attributes that fail
    /// to parse are treated as absent.
    pub fn extract(&self, node: &TemplateNode) -> DataAttributes {
        let mut found = DataAttributes::new();
        for spec in &self.specs {
            let Some(raw) = node.attribute(&spec.markup_name()) else {
                continue;
            };
            let value = match spec.kind {
                AttributeKind::Primitive => AttrValue::Text(raw.to_string()),
                AttributeKind::Json => match serde_json::from_str(raw) {
                    Ok(json) => AttrValue::Json(json),
                    Err(e) => {
                        trace!(attribute = %spec.name, error = %e, "ignoring unparsable JSON attribute");
                        continue;
                    }
                },
            };
            found.insert(spec.camel_name(), value);
        }
        found
    }

    /// Refreshes the node's attribute cache for the registered names only.
    ///
    /// Registered names absent from the node are removed from the cache;
    /// unrelated cache entries are left alone.
    pub fn update_attribute_cache(&self, node: &mut TemplateNode) -> DataAttributes {
        let fresh = self.extract(node);
        let cache = node.data_mut();
        for spec in &self.specs {
            let key = spec.camel_name();
            match fresh.get(&key) {
                Some(value) => {
                    cache.insert(key, value.to_json());
                }
                None => {
                    cache.remove(&key);
                }
            }
        }
        fresh
    }
}
