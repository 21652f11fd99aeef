//! # Template Cache
//!
//! The single store mapping template identifiers to parsed template data.
//! Identifiers are compared by exact string equality: a selector and the
//! markup it resolves to are different keys.
//!
//! ## Creation Protocol
//!
//! On a miss, [`create_entry`] runs strictly in order:
//!
//! 1. **Load** the node (custom loader, modified default, or built-in)
//! 2. **Validate** nodes coming from customized loaders
//! 3. **Extract** registered attributes, refreshing the node's attribute cache
//! 4. **Compile** the final markup, if a compiler is configured
//! 5. **Notify** `cacheEntry:create` handlers, who may edit the entry
//!
//! A node that cannot be resolved yields [`CacheSlot::Invalid`], which is
//! memoized like any other result.

use crate::attributes::{AttrValue, AttributeRegistry, DataAttributes};
use crate::compiler::{try_compile, Compiled, CompilerFn};
use crate::document::Document;
use crate::error::{DeclarativeError, Result};
use crate::events::{CreateEvent, EventBus};
use crate::loader::{LoadContext, LoadOutcome, LoaderError, LoaderSlots};
use crate::view::{ElProperty, ElValue, View};
use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Free-form data plugins attach to an entry. Persisted across events.
pub type PluginData = serde_json::Map<String, serde_json::Value>;

/// The parsed form of one template.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub html: String,
    #[serde(skip)]
    pub compiled: Option<Compiled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(rename = "_pluginData")]
    plugin_data: RefCell<PluginData>,
}

impl CacheEntry {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    /// Downcasts the compiled template.
    pub fn compiled_as<T: 'static>(&self) -> Option<&T> {
        self.compiled.as_ref()?.downcast_ref::<T>()
    }

    pub fn plugin_data(&self) -> Ref<'_, PluginData> {
        self.plugin_data.borrow()
    }

    pub fn plugin_data_mut(&mut self) -> &mut PluginData {
        self.plugin_data.get_mut()
    }

    /// Writes plugin data back into a shared entry.
    pub(crate) fn replace_plugin_data(&self, data: PluginData) {
        *self.plugin_data.borrow_mut() = data;
    }

    pub fn el_value(&self, property: ElProperty) -> Option<ElValue> {
        match property {
            ElProperty::TagName => self.tag_name.clone().map(ElValue::Text),
            ElProperty::ClassName => self.class_name.clone().map(ElValue::Text),
            ElProperty::Id => self.id.clone().map(ElValue::Text),
            ElProperty::Attributes => self.attributes.clone().map(ElValue::Map),
        }
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("html", &self.html)
            .field("compiled", &self.compiled.is_some())
            .field("tag_name", &self.tag_name)
            .field("class_name", &self.class_name)
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("plugin_data", &self.plugin_data)
            .finish()
    }
}

/// What the store holds for an identifier.
#[derive(Debug, Clone)]
pub enum CacheSlot {
    Valid(Rc<CacheEntry>),
    /// Resolved, but nothing usable was found.
    Invalid,
}

impl CacheSlot {
    pub fn entry(&self) -> Option<Rc<CacheEntry>> {
        match self {
            CacheSlot::Valid(entry) => Some(Rc::clone(entry)),
            CacheSlot::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, CacheSlot::Valid(_))
    }
}

#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<String, CacheSlot>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, identifier: &str) -> Option<&CacheSlot> {
        self.entries.get(identifier)
    }

    pub fn insert(&mut self, identifier: String, slot: CacheSlot) {
        self.entries.insert(identifier, slot);
    }

    pub fn remove(&mut self, identifier: &str) -> bool {
        self.entries.remove(identifier).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Everything the creation protocol reads.
pub struct CreationContext<'a> {
    pub document: &'a dyn Document,
    pub registry: &'a AttributeRegistry,
    pub loaders: &'a LoaderSlots,
    pub compiler: Option<&'a CompilerFn>,
    pub view: Option<&'a View>,
}

/// Runs the creation protocol for `identifier`.
///
/// # Errors
///
/// Declarative errors raised by a loader propagate unchanged. A customized
/// loader returning a malformed node is a `Customization` error; a failing
/// compiler is a `Compiler` error. No slot is produced in either case.
pub fn create_entry(
    identifier: &str,
    ctx: &CreationContext<'_>,
    events: &mut EventBus,
) -> Result<CacheSlot> {
    let load_ctx = LoadContext {
        document: ctx.document,
        registry: ctx.registry,
        view: ctx.view,
    };
    let origin = ctx.loaders.origin();

    let outcome = match ctx.loaders.load(identifier, &load_ctx) {
        Ok(outcome) => outcome,
        Err(LoaderError::Declarative(e)) => return Err(e),
        Err(LoaderError::Failed(e)) => {
            debug!(identifier, error = %e, "loader failed, caching as invalid");
            LoadOutcome::NotFound
        }
    };

    let LoadOutcome::Resolved(mut node) = outcome else {
        trace!(identifier, "template not found");
        return Ok(CacheSlot::Invalid);
    };

    if origin.is_customized() && !node.is_well_formed() {
        return Err(DeclarativeError::customization(format!(
            "Invalid return value. The {} must return a template node, but the node it returned for \"{}\" has no valid tag name",
            origin.describe(),
            identifier
        )));
    }

    let data = ctx.registry.update_attribute_cache(&mut node);
    if node.is_attached() {
        ctx.document.sync_attribute_cache(identifier, node.data());
    }
    let html = node.inner_html().to_string();
    let compiled = try_compile(ctx.compiler, &html, &node)?;

    let mut entry = CacheEntry {
        html,
        compiled,
        tag_name: data.text("tagName"),
        class_name: data.text("className"),
        id: data.text("id"),
        attributes: data
            .get("attributes")
            .and_then(AttrValue::to_attribute_map),
        plugin_data: RefCell::default(),
    };

    emit_create(identifier, &mut entry, &data, events);
    debug!(identifier, "created cache entry");
    Ok(CacheSlot::Valid(Rc::new(entry)))
}

fn emit_create(
    identifier: &str,
    entry: &mut CacheEntry,
    data: &DataAttributes,
    events: &mut EventBus,
) {
    let mut event = CreateEvent {
        identifier,
        entry,
        data_attributes: data,
    };
    events.emit_create(&mut event);
}
