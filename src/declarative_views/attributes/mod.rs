//! # Declarative Attributes
//!
//! A template declares its view's root element through `data-*` attributes:
//!
//! | Attribute | Kind | Exposed as |
//! |-----------|------|------------|
//! | `data-tag-name` | primitive | `tagName` |
//! | `data-class-name` | primitive | `className` |
//! | `data-id` | primitive | `id` |
//! | `data-attributes` | JSON object | `attributes` |
//!
//! Plugins register further names through [`AttributeRegistry::register`].
//! On a template element the attributes sit on the element itself; in a raw
//! markup string they sit inside an HTML comment (see [`matcher`]).

pub mod matcher;
mod registry;
mod value;

pub use matcher::{DetectionMatcher, EmbeddedAttributes};
pub use registry::{
    AttributeKind, AttributeRegistry, AttributeSpec, ATTRIBUTES, ATTRIBUTE_PREFIX, CLASS_NAME, ID,
    RESERVED_NAMES, TAG_NAME,
};
pub use value::{AttrValue, DataAttributes};
