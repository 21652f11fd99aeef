//! # Peer Caches
//!
//! A peer is a template cache owned by another framework. Clears flow both
//! ways: a local clear is forwarded to every peer, and a clear a peer
//! reports through [`DeclarativeViews::clear_from_peer`] is applied locally
//! and forwarded to every *other* peer. Each clear carries its
//! [`ClearOrigin`], so a peer is never told about its own clear and no
//! chain of caches can ping-pong.
//!
//! Peers may also read templates through
//! [`DeclarativeViews::template_for_peer`] instead of touching the document.
//!
//! [`DeclarativeViews::clear_from_peer`]: crate::api::DeclarativeViews::clear_from_peer
//! [`DeclarativeViews::template_for_peer`]: crate::api::DeclarativeViews::template_for_peer

use crate::error::BoxError;
use std::fmt;
use tracing::debug;

/// The integration surface of an external template cache.
pub trait PeerCache {
    /// Unique per integration. Installing a second peer with the same name is a no-op.
    fn name(&self) -> &str;

    /// Drops `identifiers` from the peer. Unknown identifiers are fine to reject.
    fn clear(&mut self, identifiers: &[String]) -> Result<(), BoxError>;

    fn clear_all(&mut self) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(usize);

/// Who started a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOrigin {
    Local,
    Peer(PeerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerInstall {
    Installed(PeerId),
    AlreadyInstalled(PeerId),
}

impl PeerInstall {
    pub fn id(self) -> PeerId {
        match self {
            PeerInstall::Installed(id) | PeerInstall::AlreadyInstalled(id) => id,
        }
    }
}

#[derive(Default)]
pub struct PeerCoordinator {
    peers: Vec<Box<dyn PeerCache>>,
}

impl PeerCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, peer: Box<dyn PeerCache>) -> PeerInstall {
        if let Some(id) = self.find(peer.name()) {
            debug!(peer = peer.name(), "peer cache already installed");
            return PeerInstall::AlreadyInstalled(id);
        }
        debug!(peer = peer.name(), "installed peer cache");
        self.peers.push(peer);
        PeerInstall::Installed(PeerId(self.peers.len() - 1))
    }

    pub fn find(&self, name: &str) -> Option<PeerId> {
        self.peers.iter().position(|p| p.name() == name).map(PeerId)
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn contains(&self, id: PeerId) -> bool {
        id.0 < self.peers.len()
    }

    pub fn name(&self, id: PeerId) -> Option<&str> {
        self.peers.get(id.0).map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Forwards a clear to every peer except the one it came from.
    /// Peer errors are logged and dropped.
    pub fn notify_clear(&mut self, identifiers: &[String], origin: ClearOrigin) {
        for (index, peer) in self.others(origin) {
            if let Err(e) = peer.clear(identifiers) {
                debug!(peer = peer.name(), index, error = %e, "peer cache rejected clear");
            }
        }
    }

    pub fn notify_clear_all(&mut self, origin: ClearOrigin) {
        for (index, peer) in self.others(origin) {
            if let Err(e) = peer.clear_all() {
                debug!(peer = peer.name(), index, error = %e, "peer cache rejected clear_all");
            }
        }
    }

    fn others(
        &mut self,
        origin: ClearOrigin,
    ) -> impl Iterator<Item = (usize, &mut Box<dyn PeerCache>)> {
        self.peers
            .iter_mut()
            .enumerate()
            .filter(move |(index, _)| origin != ClearOrigin::Peer(PeerId(*index)))
    }
}

impl fmt::Debug for PeerCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.peers.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// What a [`RecordingPeer`] was asked to do.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PeerCall {
        Clear(Vec<String>),
        ClearAll,
    }

    /// A peer that records calls, optionally failing each one.
    #[derive(Debug, Clone)]
    pub struct RecordingPeer {
        name: String,
        fail: bool,
        calls: Rc<RefCell<Vec<PeerCall>>>,
    }

    impl RecordingPeer {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                fail: false,
                calls: Rc::default(),
            }
        }

        pub fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        /// A handle to the call log that outlives the boxed peer.
        pub fn calls(&self) -> Rc<RefCell<Vec<PeerCall>>> {
            Rc::clone(&self.calls)
        }

        fn record(&self, call: PeerCall) -> Result<(), BoxError> {
            self.calls.borrow_mut().push(call);
            if self.fail {
                return Err("unknown template".into());
            }
            Ok(())
        }
    }

    impl PeerCache for RecordingPeer {
        fn name(&self) -> &str {
            &self.name
        }

        fn clear(&mut self, identifiers: &[String]) -> Result<(), BoxError> {
            self.record(PeerCall::Clear(identifiers.to_vec()))
        }

        fn clear_all(&mut self) -> Result<(), BoxError> {
            self.record(PeerCall::ClearAll)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{PeerCall, RecordingPeer};
    use super::*;

    #[test]
    fn install_is_idempotent_by_name() {
        let mut peers = PeerCoordinator::new();
        let first = peers.install(Box::new(RecordingPeer::new("marionette")));
        let second = peers.install(Box::new(RecordingPeer::new("marionette")));
        assert!(matches!(first, PeerInstall::Installed(_)));
        assert_eq!(second, PeerInstall::AlreadyInstalled(first.id()));
        assert_eq!(peers.len(), 1);
        assert!(peers.is_installed("marionette"));
        assert_eq!(peers.name(first.id()), Some("marionette"));
    }

    #[test]
    fn clear_skips_the_originating_peer() {
        let mut peers = PeerCoordinator::new();
        let a = RecordingPeer::new("a");
        let b = RecordingPeer::new("b");
        let (a_calls, b_calls) = (a.calls(), b.calls());
        let a_id = peers.install(Box::new(a)).id();
        peers.install(Box::new(b));

        peers.notify_clear(&["#t".to_string()], ClearOrigin::Peer(a_id));
        assert!(a_calls.borrow().is_empty());
        assert_eq!(*b_calls.borrow(), vec![PeerCall::Clear(vec!["#t".into()])]);

        peers.notify_clear_all(ClearOrigin::Local);
        assert_eq!(*a_calls.borrow(), vec![PeerCall::ClearAll]);
        assert_eq!(b_calls.borrow().len(), 2);
    }

    #[test]
    fn peer_errors_are_swallowed() {
        let mut peers = PeerCoordinator::new();
        let failing = RecordingPeer::new("f").failing();
        let calls = failing.calls();
        peers.install(Box::new(failing));

        peers.notify_clear(&["#t".to_string()], ClearOrigin::Local);
        peers.notify_clear_all(ClearOrigin::Local);
        assert_eq!(calls.borrow().len(), 2);
    }
}
