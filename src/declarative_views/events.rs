//! Cache lifecycle events.
//!
//! Handlers run synchronously, in registration order. Each receives the event
//! by mutable reference, so a handler sees the edits of the handlers before it.

use crate::attributes::DataAttributes;
use crate::binding::ViewTemplateData;
use crate::cache::CacheEntry;
use crate::view::{ElProperty, View};
use std::fmt;
use tracing::trace;

pub const CREATE: &str = "cacheEntry:create";
pub const VIEW_PROCESS: &str = "cacheEntry:view:process";
pub const VIEW_FETCH: &str = "cacheEntry:view:fetch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEvent {
    Create,
    ViewProcess,
    ViewFetch,
}

impl CacheEvent {
    pub fn name(self) -> &'static str {
        match self {
            CacheEvent::Create => CREATE,
            CacheEvent::ViewProcess => VIEW_PROCESS,
            CacheEvent::ViewFetch => VIEW_FETCH,
        }
    }
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by the `on_*` methods, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    event: CacheEvent,
    seq: u64,
}

impl HandlerId {
    pub fn event(&self) -> CacheEvent {
        self.event
    }
}

/// A new entry was created.
///
/// Everything on `entry` persists. `data_attributes` holds every registered
/// attribute found on the node and is discarded after this event; copy what
/// you need into the entry's plugin data.
pub struct CreateEvent<'a> {
    pub identifier: &'a str,
    pub entry: &'a mut CacheEntry,
    pub data_attributes: &'a DataAttributes,
}

/// A view resolved its template.
///
/// Edits to el-defining fields apply to this view only. Plugin data persists.
pub struct ProcessEvent<'a> {
    pub identifier: &'a str,
    pub view: &'a View,
    pub data: &'a mut ViewTemplateData,
}

/// A view is reading one el-defining property from its template.
///
/// Setting `data`'s value for `property` changes what this read returns.
pub struct FetchEvent<'a> {
    pub identifier: &'a str,
    pub view: &'a View,
    pub property: ElProperty,
    pub data: &'a mut ViewTemplateData,
}

type CreateHandler = Box<dyn FnMut(&mut CreateEvent<'_>)>;
type ProcessHandler = Box<dyn FnMut(&mut ProcessEvent<'_>)>;
type FetchHandler = Box<dyn FnMut(&mut FetchEvent<'_>)>;

/// Subscriptions for the three cache events.
#[derive(Default)]
pub struct EventBus {
    next_seq: u64,
    create: Vec<(u64, CreateHandler)>,
    process: Vec<(u64, ProcessHandler)>,
    fetch: Vec<(u64, FetchHandler)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, event: CacheEvent) -> HandlerId {
        self.next_seq += 1;
        HandlerId {
            event,
            seq: self.next_seq,
        }
    }

    pub fn on_create<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&mut CreateEvent<'_>) + 'static,
    {
        let id = self.next_id(CacheEvent::Create);
        self.create.push((id.seq, Box::new(handler)));
        id
    }

    pub fn on_view_process<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&mut ProcessEvent<'_>) + 'static,
    {
        let id = self.next_id(CacheEvent::ViewProcess);
        self.process.push((id.seq, Box::new(handler)));
        id
    }

    pub fn on_view_fetch<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&mut FetchEvent<'_>) + 'static,
    {
        let id = self.next_id(CacheEvent::ViewFetch);
        self.fetch.push((id.seq, Box::new(handler)));
        id
    }

    /// Removes one handler. Returns false if it was already gone.
    pub fn off(&mut self, id: HandlerId) -> bool {
        fn remove<H>(handlers: &mut Vec<(u64, H)>, seq: u64) -> bool {
            let before = handlers.len();
            handlers.retain(|(s, _)| *s != seq);
            handlers.len() != before
        }
        match id.event {
            CacheEvent::Create => remove(&mut self.create, id.seq),
            CacheEvent::ViewProcess => remove(&mut self.process, id.seq),
            CacheEvent::ViewFetch => remove(&mut self.fetch, id.seq),
        }
    }

    /// Removes every handler for `event`.
    pub fn off_all(&mut self, event: CacheEvent) {
        match event {
            CacheEvent::Create => self.create.clear(),
            CacheEvent::ViewProcess => self.process.clear(),
            CacheEvent::ViewFetch => self.fetch.clear(),
        }
    }

    pub fn handler_count(&self, event: CacheEvent) -> usize {
        match event {
            CacheEvent::Create => self.create.len(),
            CacheEvent::ViewProcess => self.process.len(),
            CacheEvent::ViewFetch => self.fetch.len(),
        }
    }

    pub(crate) fn emit_create(&mut self, event: &mut CreateEvent<'_>) {
        trace!(event = CREATE, identifier = event.identifier, handlers = self.create.len());
        for (_, handler) in &mut self.create {
            handler(&mut *event);
        }
    }

    pub(crate) fn emit_view_process(&mut self, event: &mut ProcessEvent<'_>) {
        trace!(event = VIEW_PROCESS, identifier = event.identifier, handlers = self.process.len());
        for (_, handler) in &mut self.process {
            handler(&mut *event);
        }
    }

    pub(crate) fn emit_view_fetch(&mut self, event: &mut FetchEvent<'_>) {
        trace!(
            event = VIEW_FETCH,
            identifier = event.identifier,
            property = event.property.name(),
            handlers = self.fetch.len()
        );
        for (_, handler) in &mut self.fetch {
            handler(&mut *event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("create", &self.create.len())
            .field("process", &self.process.len())
            .field("fetch", &self.fetch.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewOptions;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_registration_order_and_see_edits() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        bus.on_create(move |event| {
            log.borrow_mut().push(format!("first:{}", event.entry.html));
            event.entry.html.push_str("!");
        });
        let log = Rc::clone(&seen);
        bus.on_create(move |event| log.borrow_mut().push(format!("second:{}", event.entry.html)));

        let mut entry = CacheEntry::new("x");
        let attrs = DataAttributes::new();
        bus.emit_create(&mut CreateEvent {
            identifier: "#t",
            entry: &mut entry,
            data_attributes: &attrs,
        });

        assert_eq!(*seen.borrow(), vec!["first:x", "second:x!"]);
        assert_eq!(entry.html, "x!");
    }

    #[test]
    fn off_removes_only_that_handler() {
        let mut bus = EventBus::new();
        let a = bus.on_view_fetch(|_| {});
        let b = bus.on_view_fetch(|_| {});
        bus.on_view_process(|_| {});

        assert!(bus.off(a));
        assert!(!bus.off(a));
        assert_eq!(bus.handler_count(CacheEvent::ViewFetch), 1);
        assert_eq!(b.event(), CacheEvent::ViewFetch);

        bus.off_all(CacheEvent::ViewProcess);
        assert_eq!(bus.handler_count(CacheEvent::ViewProcess), 0);
        assert_eq!(bus.handler_count(CacheEvent::ViewFetch), 1);
    }

    #[test]
    fn fetch_handler_can_override_value() {
        let mut bus = EventBus::new();
        bus.on_view_fetch(|event| {
            if event.property == ElProperty::TagName {
                event.data.tag_name = Some("aside".into());
            }
        });

        let view = View::new(ViewOptions::new());
        let mut data = ViewTemplateData::from_entry(&CacheEntry::new(""));
        bus.emit_view_fetch(&mut FetchEvent {
            identifier: "#t",
            view: &view,
            property: ElProperty::TagName,
            data: &mut data,
        });
        assert_eq!(data.tag_name.as_deref(), Some("aside"));
    }

    #[test]
    fn event_names() {
        assert_eq!(CacheEvent::Create.to_string(), "cacheEntry:create");
        assert_eq!(CacheEvent::ViewProcess.name(), "cacheEntry:view:process");
        assert_eq!(CacheEvent::ViewFetch.name(), "cacheEntry:view:fetch");
    }
}
