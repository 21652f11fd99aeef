//! A minimal model of the host framework's view.
//!
//! Only what the binding layer needs: a unique id assigned at construction,
//! the `template` property, the four el-defining properties (on the
//! instance and as construction options), and the element built from them.

use crate::binding::{BindingMeta, TemplateBinding};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Tag the host uses when nothing else defines one.
pub const DEFAULT_TAG_NAME: &str = "div";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// The properties that define a view's root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElProperty {
    TagName,
    ClassName,
    Id,
    Attributes,
}

impl ElProperty {
    pub const ALL: [ElProperty; 4] = [
        ElProperty::TagName,
        ElProperty::ClassName,
        ElProperty::Id,
        ElProperty::Attributes,
    ];

    /// Property name as exposed to plugins.
    pub fn name(self) -> &'static str {
        match self {
            ElProperty::TagName => "tagName",
            ElProperty::ClassName => "className",
            ElProperty::Id => "id",
            ElProperty::Attributes => "attributes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElValue {
    Text(String),
    Map(BTreeMap<String, String>),
}

impl ElValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            ElValue::Text(s) => Some(s),
            ElValue::Map(_) => None,
        }
    }

    pub fn into_map(self) -> Option<BTreeMap<String, String>> {
        match self {
            ElValue::Map(m) => Some(m),
            ElValue::Text(_) => None,
        }
    }
}

/// A view's `template` property.
#[derive(Clone)]
pub enum TemplateProp {
    /// A selector or raw markup. The only cacheable form.
    Identifier(String),
    /// A precompiled render function.
    Function(Rc<dyn Fn(&Value) -> String>),
}

impl TemplateProp {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            TemplateProp::Identifier(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for TemplateProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateProp::Identifier(s) => f.debug_tuple("Identifier").field(s).finish(),
            TemplateProp::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for TemplateProp {
    fn from(s: &str) -> Self {
        TemplateProp::Identifier(s.to_string())
    }
}

impl From<String> for TemplateProp {
    fn from(s: String) -> Self {
        TemplateProp::Identifier(s)
    }
}

/// The element a view renders into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// `<tag a="1" b="2">`, attribute values escaped.
    pub fn opening_tag(&self) -> String {
        let mut out = format!("<{}", self.tag_name);
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
        out.push('>');
        out
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Options passed when constructing a view.
///
/// `None` means "not provided": it never shadows a template-derived value.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub template: Option<TemplateProp>,
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub id: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub el: Option<Element>,
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(mut self, template: impl Into<TemplateProp>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn el(mut self, el: Element) -> Self {
        self.el = Some(el);
        self
    }
}

#[derive(Debug, Clone, Default)]
struct ElOptions {
    tag_name: Option<String>,
    class_name: Option<String>,
    id: Option<String>,
    attributes: Option<BTreeMap<String, String>>,
}

/// A view instance.
///
/// The public `Option` fields are instance properties; setting one shadows
/// both the construction option and the template for that property.
#[derive(Debug, Clone)]
pub struct View {
    pub template: Option<TemplateProp>,
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub id: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
    options: ElOptions,
    pub(crate) el: Option<Element>,
    pub(crate) binding: TemplateBinding,
}

impl View {
    /// Constructs a view without building its element.
    pub fn new(options: ViewOptions) -> Self {
        let cid = ViewId::new();
        Self {
            template: options.template,
            tag_name: None,
            class_name: None,
            id: None,
            attributes: None,
            options: ElOptions {
                tag_name: options.tag_name,
                class_name: options.class_name,
                id: options.id,
                attributes: options.attributes,
            },
            el: options.el,
            binding: TemplateBinding::new(cid),
        }
    }

    pub fn cid(&self) -> ViewId {
        self.binding.meta().view_id
    }

    pub fn el(&self) -> Option<&Element> {
        self.el.as_ref()
    }

    pub fn binding_meta(&self) -> &BindingMeta {
        self.binding.meta()
    }

    /// The cacheable identifier currently in `template`, if any.
    pub fn template_identifier(&self) -> Option<&str> {
        self.template.as_ref().and_then(TemplateProp::identifier)
    }

    /// Instance property, else construction option.
    pub(crate) fn own_property(&self, property: ElProperty) -> Option<ElValue> {
        match property {
            ElProperty::TagName => self
                .tag_name
                .clone()
                .or_else(|| self.options.tag_name.clone())
                .map(ElValue::Text),
            ElProperty::ClassName => self
                .class_name
                .clone()
                .or_else(|| self.options.class_name.clone())
                .map(ElValue::Text),
            ElProperty::Id => self
                .id
                .clone()
                .or_else(|| self.options.id.clone())
                .map(ElValue::Text),
            ElProperty::Attributes => self
                .attributes
                .clone()
                .or_else(|| self.options.attributes.clone())
                .map(ElValue::Map),
        }
    }
}
