//! # Declarative Views Architecture
//!
//! A view declares its root element (tag name, class, id, extra attributes)
//! inside its HTML template instead of in code:
//!
//! ```html
//! <script id="item" type="text/x-template"
//!         data-tag-name="li" data-class-name="item" data-attributes='{"role":"option"}'>
//!   <span>{{ label }}</span>
//! </script>
//! ```
//!
//! The library parses those declarations once per template and memoizes the
//! result in a keyed cache shared by every view.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cli/, wired by main.rs)                               │
//! │  - Parses arguments, prints entries and elements            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Service (api.rs, binding.rs)                               │
//! │  - DeclarativeViews<D>: global, plugin, peer and view APIs  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Cache (cache.rs, loader.rs, compiler.rs, events.rs)        │
//! │  - load → extract → compile → notify, memoized per id       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Environment (document/, attributes/)                       │
//! │  - Document trait: MemoryDocument, HtmlDocument             │
//! │  - Attribute registry and embedded-comment matcher          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and synchronous. Entries are shared as
//! `Rc<CacheEntry>`; the service is neither `Send` nor `Sync`.
//!
//! ## Module Overview
//!
//! - [`api`]: The service facade
//! - [`binding`]: Per-view resolution and el-defining accessors
//! - [`cache`]: The store and the creation protocol
//! - [`loader`]: Identifier to node resolution, custom loader slots
//! - [`compiler`]: Optional compilation, the stencil compiler
//! - [`events`]: `cacheEntry:*` lifecycle events
//! - [`attributes`]: Registered data attributes
//! - [`document`]: The environment abstraction
//! - [`peer`]: Keeping external template caches in sync
//! - [`view`]: The host view model
//! - [`config`]: Configuration file
//! - [`naming`]: dashed/camel name mapping
//! - [`error`]: Error types

pub mod api;
pub mod attributes;
pub mod binding;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod loader;
pub mod naming;
pub mod peer;
pub mod view;

pub use api::{ClearTarget, DeclarativeViews};
pub use cache::CacheEntry;
pub use error::{DeclarativeError, Result};
pub use view::{View, ViewOptions};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
