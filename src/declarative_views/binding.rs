//! # View Binding
//!
//! Each view owns a [`TemplateBinding`] created at construction. The binding
//! resolves the view's template identifier once, lazily, and locks it in:
//! reassigning `view.template` afterwards changes nothing.
//!
//! Once resolved, a view that found its template by identifier re-reads the
//! global cache on every access, so a cleared and repopulated entry is
//! picked up. `cacheEntry:view:process` edits are kept on the binding as a
//! per-view diff and reapplied to whatever entry the cache currently holds.
//!
//! Precedence for el-defining properties: instance property, then
//! construction option, then the template.

use crate::api::DeclarativeViews;
use crate::cache::{CacheEntry, PluginData};
use crate::compiler::Compiled;
use crate::document::Document;
use crate::error::Result;
use crate::events::{FetchEvent, ProcessEvent};
use crate::view::{ElProperty, ElValue, Element, View, ViewId, ViewOptions, DEFAULT_TAG_NAME};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Resolution state of one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingMeta {
    pub processed: bool,
    pub in_global_cache: bool,
    /// The identifier captured at first resolution.
    pub original_template: Option<String>,
    pub view_id: ViewId,
}

#[derive(Debug, Clone)]
pub struct TemplateBinding {
    meta: BindingMeta,
    overrides: BTreeMap<ElProperty, Option<ElValue>>,
}

impl TemplateBinding {
    pub fn new(view_id: ViewId) -> Self {
        Self {
            meta: BindingMeta {
                processed: false,
                in_global_cache: false,
                original_template: None,
                view_id,
            },
            overrides: BTreeMap::new(),
        }
    }

    pub fn meta(&self) -> &BindingMeta {
        &self.meta
    }

    pub(crate) fn mark_cached(&mut self, identifier: &str) {
        self.meta.processed = true;
        self.meta.in_global_cache = true;
        self.meta.original_template = Some(identifier.to_string());
    }

    pub(crate) fn mark_uncacheable(&mut self) {
        self.meta.processed = true;
        self.meta.in_global_cache = false;
    }

    /// Stores the el-defining fields a process handler changed.
    pub(crate) fn record_overrides(&mut self, before: &ViewTemplateData, after: &ViewTemplateData) {
        for property in ElProperty::ALL {
            let value = after.get(property);
            if value != before.get(property) {
                self.overrides.insert(property, value);
            }
        }
    }

    pub(crate) fn apply_overrides(&self, data: &mut ViewTemplateData) {
        for (property, value) in &self.overrides {
            data.set(*property, value.clone());
        }
    }
}

/// A view's private copy of a cache entry.
///
/// Handed to `process` and `fetch` handlers. Only `plugin_data` is written
/// back to the shared entry.
#[derive(Clone, Default)]
pub struct ViewTemplateData {
    pub html: String,
    pub compiled: Option<Compiled>,
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub id: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub plugin_data: PluginData,
}

impl ViewTemplateData {
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            html: entry.html.clone(),
            compiled: entry.compiled.clone(),
            tag_name: entry.tag_name.clone(),
            class_name: entry.class_name.clone(),
            id: entry.id.clone(),
            attributes: entry.attributes.clone(),
            plugin_data: entry.plugin_data().clone(),
        }
    }

    pub fn get(&self, property: ElProperty) -> Option<ElValue> {
        match property {
            ElProperty::TagName => self.tag_name.clone().map(ElValue::Text),
            ElProperty::ClassName => self.class_name.clone().map(ElValue::Text),
            ElProperty::Id => self.id.clone().map(ElValue::Text),
            ElProperty::Attributes => self.attributes.clone().map(ElValue::Map),
        }
    }

    /// Sets one el-defining field. A value of the wrong shape clears it.
    pub fn set(&mut self, property: ElProperty, value: Option<ElValue>) {
        match property {
            ElProperty::TagName => self.tag_name = value.and_then(ElValue::into_text),
            ElProperty::ClassName => self.class_name = value.and_then(ElValue::into_text),
            ElProperty::Id => self.id = value.and_then(ElValue::into_text),
            ElProperty::Attributes => self.attributes = value.and_then(ElValue::into_map),
        }
    }

    pub fn compiled_as<T: 'static>(&self) -> Option<&T> {
        self.compiled.as_ref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for ViewTemplateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTemplateData")
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

impl<D: Document> DeclarativeViews<D> {
    /// Constructs a view the way the host does.
    ///
    /// The element is built from the el-defining accessors unless an `el` was
    /// passed in. With template loading enforced, the template is resolved in
    /// either case.
    ///
    /// # Errors
    ///
    /// Any error raised while resolving the template. A template that simply
    /// cannot be found is not an error: the view gets a plain `div`.
    pub fn create_view(&mut self, options: ViewOptions) -> Result<View> {
        let mut view = View::new(options);
        if self.enforce_template_loading {
            self.view_template_data(&mut view)?;
        }
        if view.el.is_none() {
            self.ensure_element(&mut view)?;
        }
        Ok(view)
    }

    /// Builds the view's element: `attributes`, then `id`, `className`,
    /// `tagName`.
    pub fn ensure_element(&mut self, view: &mut View) -> Result<()> {
        let mut attributes = self.attributes(view)?.unwrap_or_default();
        if let Some(id) = self.el_id(view)?.filter(|id| !id.is_empty()) {
            attributes.insert("id".to_string(), id);
        }
        if let Some(class) = self.class_name(view)?.filter(|c| !c.is_empty()) {
            attributes.insert("class".to_string(), class);
        }
        let tag_name = self
            .tag_name(view)?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG_NAME.to_string());

        view.el = Some(Element::new(tag_name).with_attributes(attributes));
        Ok(())
    }

    pub fn tag_name(&mut self, view: &mut View) -> Result<Option<String>> {
        Ok(self
            .el_property(view, ElProperty::TagName)?
            .and_then(ElValue::into_text))
    }

    pub fn class_name(&mut self, view: &mut View) -> Result<Option<String>> {
        Ok(self
            .el_property(view, ElProperty::ClassName)?
            .and_then(ElValue::into_text))
    }

    pub fn el_id(&mut self, view: &mut View) -> Result<Option<String>> {
        Ok(self
            .el_property(view, ElProperty::Id)?
            .and_then(ElValue::into_text))
    }

    pub fn attributes(&mut self, view: &mut View) -> Result<Option<BTreeMap<String, String>>> {
        Ok(self
            .el_property(view, ElProperty::Attributes)?
            .and_then(ElValue::into_map))
    }

    /// Resolves one el-defining property for `view`.
    ///
    /// Own properties short-circuit. Otherwise the template is consulted and
    /// `cacheEntry:view:fetch` fires for this property.
    pub fn el_property(&mut self, view: &mut View, property: ElProperty) -> Result<Option<ElValue>> {
        if let Some(value) = view.own_property(property) {
            return Ok(Some(value));
        }

        let Some(mut data) = self.view_template_data(view)? else {
            return Ok(None);
        };
        let identifier = view
            .binding
            .meta()
            .original_template
            .clone()
            .unwrap_or_default();
        let entry = self.cached_entry(&identifier);

        self.events.emit_view_fetch(&mut FetchEvent {
            identifier: &identifier,
            view: &*view,
            property,
            data: &mut data,
        });
        if let Some(entry) = entry {
            entry.replace_plugin_data(data.plugin_data.clone());
        }
        Ok(data.get(property))
    }

    /// The view's template data, resolving on first use.
    ///
    /// `None` for views without a cacheable template and for templates that
    /// could not be found.
    pub fn view_template_data(&mut self, view: &mut View) -> Result<Option<ViewTemplateData>> {
        if !view.binding.meta().processed {
            return self.resolve_view(view);
        }
        if !view.binding.meta().in_global_cache {
            return Ok(None);
        }

        let identifier = view
            .binding
            .meta()
            .original_template
            .clone()
            .unwrap_or_default();
        let Some(entry) = self.get_cached_template(&identifier, Some(&*view))? else {
            return Ok(None);
        };
        let mut data = ViewTemplateData::from_entry(&entry);
        view.binding.apply_overrides(&mut data);
        Ok(Some(data))
    }

    fn resolve_view(&mut self, view: &mut View) -> Result<Option<ViewTemplateData>> {
        let Some(identifier) = view.template_identifier().map(str::to_string) else {
            trace!(view = %view.cid(), "view has no cacheable template");
            view.binding.mark_uncacheable();
            return Ok(None);
        };

        let entry = self.get_cached_template(&identifier, Some(&*view))?;
        view.binding.mark_cached(&identifier);
        let Some(entry) = entry else {
            return Ok(None);
        };

        let before = ViewTemplateData::from_entry(&entry);
        let mut data = before.clone();
        self.events.emit_view_process(&mut ProcessEvent {
            identifier: &identifier,
            view: &*view,
            data: &mut data,
        });
        view.binding.record_overrides(&before, &data);
        entry.replace_plugin_data(data.plugin_data.clone());
        Ok(Some(data))
    }

    /// The entry currently stored for `identifier`, without creating one.
    fn cached_entry(&self, identifier: &str) -> Option<Rc<CacheEntry>> {
        self.cache.lookup(identifier).and_then(|slot| slot.entry())
    }

    /// The per-view template API.
    pub fn declarative_views<'a>(&'a mut self, view: &'a mut View) -> ViewTemplates<'a, D> {
        ViewTemplates {
            service: self,
            view,
        }
    }

    /// The per-view template API under a registered alias.
    ///
    /// # Errors
    ///
    /// `Generic` if `alias` was never registered with
    /// [`DeclarativeViews::register_cache_alias`].
    pub fn cache_alias<'a>(&'a mut self, view: &'a mut View, alias: &str) -> Result<ViewTemplates<'a, D>> {
        if !self.aliases.contains(alias) {
            return Err(crate::error::DeclarativeError::Generic(format!(
                "No cache alias named \"{}\" has been registered",
                alias
            )));
        }
        Ok(self.declarative_views(view))
    }
}

/// The template API bound to one view.
pub struct ViewTemplates<'a, D: Document> {
    service: &'a mut DeclarativeViews<D>,
    view: &'a mut View,
}

impl<D: Document> ViewTemplates<'_, D> {
    /// The view's template data, resolving it if needed.
    pub fn get_cached_template(&mut self) -> Result<Option<ViewTemplateData>> {
        self.service.view_template_data(self.view)
    }

    /// Clears the view's template from the global cache.
    ///
    /// A resolved view clears its locked-in identifier; an unresolved view
    /// clears whatever identifier its `template` currently holds.
    pub fn clear_cached_template(&mut self) -> Result<()> {
        let meta = self.view.binding.meta();
        let identifier = if meta.processed {
            meta.in_global_cache
                .then(|| meta.original_template.clone())
                .flatten()
        } else {
            self.view.template_identifier().map(str::to_string)
        };

        if let Some(identifier) = identifier {
            self.service.clear_cached_template(identifier)?;
        }
        Ok(())
    }

    pub fn meta(&self) -> &BindingMeta {
        self.view.binding.meta()
    }
}
