//! # API Facade
//!
//! [`DeclarativeViews`] is the one service object owning all template state:
//! the attribute registry, the cache, loader and compiler slots, event
//! subscriptions and installed peers. There is no ambient global; callers
//! construct a service and pass it around. Tests build a fresh one each.
//!
//! ## Generic Over Document
//!
//! `DeclarativeViews<D: Document>` is generic over the environment that
//! resolves selectors:
//! - CLI: `DeclarativeViews<HtmlDocument>`
//! - Testing and embedding: `DeclarativeViews<MemoryDocument>`
//!
//! ## Surfaces
//!
//! - Global: [`get_cached_template`], [`clear_cached_template`], [`clear_cache`]
//! - Plugin: attribute registration, aliases, events, compiler and loader slots
//! - Peer: [`install_peer`], [`clear_from_peer`], [`template_for_peer`]
//! - Per view: see the `binding` module
//!
//! [`get_cached_template`]: DeclarativeViews::get_cached_template
//! [`clear_cached_template`]: DeclarativeViews::clear_cached_template
//! [`clear_cache`]: DeclarativeViews::clear_cache
//! [`install_peer`]: DeclarativeViews::install_peer
//! [`clear_from_peer`]: DeclarativeViews::clear_from_peer
//! [`template_for_peer`]: DeclarativeViews::template_for_peer

use crate::attributes::{AttributeKind, AttributeRegistry, DataAttributes};
use crate::cache::{create_entry, CacheEntry, CreationContext, TemplateCache};
use crate::compiler::{try_compile, Compiled, CompilerFn};
use crate::document::{Document, TemplateNode};
use crate::error::{BoxError, DeclarativeError, Result};
use crate::events::EventBus;
use crate::loader::LoaderSlots;
use crate::peer::{ClearOrigin, PeerCache, PeerCoordinator, PeerId, PeerInstall};
use crate::view::View;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::{debug, trace};

/// Identifiers to clear: one, many, or nested lists of either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearTarget {
    One(String),
    Many(Vec<ClearTarget>),
}

impl ClearTarget {
    /// All identifiers, depth first, with empty strings dropped.
    pub fn flatten(self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<String>) {
        match self {
            ClearTarget::One(id) if id.is_empty() => {}
            ClearTarget::One(id) => out.push(id),
            ClearTarget::Many(targets) => {
                for target in targets {
                    target.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for ClearTarget {
    fn from(id: &str) -> Self {
        ClearTarget::One(id.to_string())
    }
}

impl From<String> for ClearTarget {
    fn from(id: String) -> Self {
        ClearTarget::One(id)
    }
}

impl From<&String> for ClearTarget {
    fn from(id: &String) -> Self {
        ClearTarget::One(id.clone())
    }
}

impl<T: Into<ClearTarget>> From<Vec<T>> for ClearTarget {
    fn from(targets: Vec<T>) -> Self {
        ClearTarget::Many(targets.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ClearTarget> + Clone> From<&[T]> for ClearTarget {
    fn from(targets: &[T]) -> Self {
        ClearTarget::Many(targets.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<ClearTarget>, const N: usize> From<[T; N]> for ClearTarget {
    fn from(targets: [T; N]) -> Self {
        ClearTarget::Many(targets.into_iter().map(Into::into).collect())
    }
}

/// The template service.
pub struct DeclarativeViews<D: Document> {
    pub(crate) document: D,
    pub(crate) registry: AttributeRegistry,
    pub(crate) cache: TemplateCache,
    pub(crate) loaders: LoaderSlots,
    pub(crate) compiler: Option<CompilerFn>,
    pub(crate) events: EventBus,
    pub(crate) peers: PeerCoordinator,
    pub(crate) aliases: BTreeSet<String>,
    pub(crate) enforce_template_loading: bool,
}

impl<D: Document> DeclarativeViews<D> {
    /// A service with the default attributes registered and nothing else set.
    pub fn new(document: D) -> Self {
        Self {
            document,
            registry: AttributeRegistry::with_defaults(),
            cache: TemplateCache::new(),
            loaders: LoaderSlots::default(),
            compiler: None,
            events: EventBus::new(),
            peers: PeerCoordinator::new(),
            aliases: BTreeSet::new(),
            enforce_template_loading: false,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// The document, for mutation. Cached entries are not invalidated.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    // --- Global API ---

    /// The entry for `identifier`, creating it on a miss.
    ///
    /// Returns `None` for an empty identifier and for templates that could
    /// not be resolved. Two calls without an intervening clear return the
    /// same `Rc`.
    ///
    /// # Errors
    ///
    /// Errors raised deliberately by a loader, malformed nodes from a
    /// customized loader, and compiler failures.
    pub fn get_cached_template(
        &mut self,
        identifier: &str,
        view: Option<&View>,
    ) -> Result<Option<Rc<CacheEntry>>> {
        if identifier.is_empty() {
            return Ok(None);
        }
        if let Some(slot) = self.cache.lookup(identifier) {
            trace!(identifier, valid = slot.is_valid(), "template cache hit");
            return Ok(slot.entry());
        }

        trace!(identifier, "template cache miss");
        let ctx = CreationContext {
            document: &self.document,
            registry: &self.registry,
            loaders: &self.loaders,
            compiler: self.compiler.as_ref(),
            view,
        };
        let slot = create_entry(identifier, &ctx, &mut self.events)?;
        let entry = slot.entry();
        self.cache.insert(identifier.to_string(), slot);
        Ok(entry)
    }

    /// Removes the given identifiers and tells every peer.
    ///
    /// # Errors
    ///
    /// `Generic` if `targets` is a single empty identifier. A list that
    /// holds no identifier clears nothing.
    pub fn clear_cached_template(&mut self, targets: impl Into<ClearTarget>) -> Result<()> {
        self.clear_with_origin(targets.into(), ClearOrigin::Local)
    }

    /// Empties the cache and tells every peer.
    pub fn clear_cache(&mut self) {
        self.clear_all_with_origin(ClearOrigin::Local);
    }

    fn clear_with_origin(&mut self, targets: ClearTarget, origin: ClearOrigin) -> Result<()> {
        if matches!(&targets, ClearTarget::One(id) if id.is_empty()) {
            return Err(DeclarativeError::Generic(
                "Missing argument: no template identifier was passed to clear_cached_template".to_string(),
            ));
        }
        let identifiers = targets.flatten();
        if identifiers.is_empty() {
            return Ok(());
        }
        for identifier in &identifiers {
            if self.cache.remove(identifier) {
                debug!(identifier = identifier.as_str(), ?origin, "cleared cache entry");
            }
        }
        self.peers.notify_clear(&identifiers, origin);
        Ok(())
    }

    fn clear_all_with_origin(&mut self, origin: ClearOrigin) {
        debug!(entries = self.cache.len(), ?origin, "clearing template cache");
        self.cache.clear();
        self.peers.notify_clear_all(origin);
    }

    // --- Plugin API ---

    /// Registers a further declarative attribute.
    ///
    /// # Errors
    ///
    /// `Customization` for prefixed, reserved, malformed or duplicate names.
    pub fn register_data_attribute(&mut self, name: &str, kind: AttributeKind) -> Result<()> {
        self.registry.register(name, kind)
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Registered attribute values on `node`, read from its attributes.
    pub fn data_attributes(&self, node: &TemplateNode) -> DataAttributes {
        self.registry.extract(node)
    }

    /// Refreshes `node`'s attribute cache for the registered names.
    pub fn update_attribute_cache(&self, node: &mut TemplateNode) -> DataAttributes {
        self.registry.update_attribute_cache(node)
    }

    /// Makes the per-view API reachable under `alias`.
    ///
    /// # Errors
    ///
    /// `Customization` if `alias` is empty.
    pub fn register_cache_alias(&mut self, alias: &str) -> Result<()> {
        if alias.trim().is_empty() {
            return Err(DeclarativeError::customization(
                "A cache alias needs a non-empty name",
            ));
        }
        if self.aliases.insert(alias.to_string()) {
            debug!(alias, "registered cache alias");
        }
        Ok(())
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Compiles `html` with the configured compiler, if any.
    pub fn try_compile_template(&self, html: &str, node: &TemplateNode) -> Result<Option<Compiled>> {
        try_compile(self.compiler.as_ref(), html, node)
    }

    pub fn set_compiler<F>(&mut self, compiler: F)
    where
        F: Fn(&str, &TemplateNode) -> std::result::Result<Compiled, BoxError> + 'static,
    {
        self.compiler = Some(Box::new(compiler));
    }

    /// Installs an already boxed compiler, such as [`crate::compiler::stencil_compiler`].
    pub fn set_boxed_compiler(&mut self, compiler: CompilerFn) {
        self.compiler = Some(compiler);
    }

    pub fn clear_compiler(&mut self) {
        self.compiler = None;
    }

    pub fn has_compiler(&self) -> bool {
        self.compiler.is_some()
    }

    pub fn loaders_mut(&mut self) -> &mut LoaderSlots {
        &mut self.loaders
    }

    /// Resolve templates at view construction even when an `el` is passed.
    pub fn enforce_template_loading(&mut self) {
        self.enforce_template_loading = true;
    }

    pub fn is_template_loading_enforced(&self) -> bool {
        self.enforce_template_loading
    }

    // --- Peer API ---

    pub fn install_peer(&mut self, peer: Box<dyn PeerCache>) -> PeerInstall {
        self.peers.install(peer)
    }

    pub fn peers(&self) -> &PeerCoordinator {
        &self.peers
    }

    /// Applies a clear that happened in peer `from`.
    ///
    /// Every other peer is notified; `from` is not.
    ///
    /// # Errors
    ///
    /// `Generic` for an unknown peer or a single empty identifier.
    pub fn clear_from_peer(&mut self, from: PeerId, targets: impl Into<ClearTarget>) -> Result<()> {
        self.check_peer(from)?;
        self.clear_with_origin(targets.into(), ClearOrigin::Peer(from))
    }

    /// Applies a full clear that happened in peer `from`.
    pub fn clear_all_from_peer(&mut self, from: PeerId) -> Result<()> {
        self.check_peer(from)?;
        self.clear_all_with_origin(ClearOrigin::Peer(from));
        Ok(())
    }

    /// The read path for peers: the same entry views get.
    pub fn template_for_peer(&mut self, identifier: &str) -> Result<Option<Rc<CacheEntry>>> {
        self.get_cached_template(identifier, None)
    }

    fn check_peer(&self, id: PeerId) -> Result<()> {
        if self.peers.contains(id) {
            Ok(())
        } else {
            Err(DeclarativeError::Generic(format!(
                "Unknown peer cache {:?}",
                id
            )))
        }
    }
}
