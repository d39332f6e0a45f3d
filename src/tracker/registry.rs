use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

use super::types::PeerSnapshot;

/// One tracked remote endpoint. Both liveness fields are written together
/// under the entry lock, which keeps the invariant that an active peer's
/// `last_seen` is at least as fresh as its transition into active.
struct Peer {
    active: bool,
    last_seen: Option<Instant>,
    /// Wakes the probe attempt currently waiting on this peer, if any.
    confirmed: Arc<Notify>,
}

impl Peer {
    fn new() -> Self {
        Self {
            active: false,
            last_seen: None,
            confirmed: Arc::new(Notify::new()),
        }
    }
}

/// Concurrency-safe table of known peers and their liveness state.
///
/// The registry owns all peer records exclusively; every access goes through
/// a lock-guarded accessor and entries are never removed for the lifetime of
/// the process. Concurrent writers (receive loop, prober) and readers
/// (reporter, prober snapshots) see each entry atomically.
pub struct PeerRegistry {
    peers: DashMap<SocketAddr, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            peers: DashMap::new(),
        })
    }

    /// Registers `addr` with an inactive, never-seen state.
    ///
    /// Idempotent: re-registering an existing address is a strict no-op and
    /// never resets the liveness state of an already-live peer. Returns
    /// whether a new entry was created.
    pub fn register(&self, addr: SocketAddr) -> bool {
        match self.peers.entry(addr) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Peer::new());
                true
            }
        }
    }

    /// Marks `addr` active with a fresh `last_seen` and wakes any probe
    /// attempt waiting on it. Unknown addresses are registered implicitly
    /// (unsolicited responders).
    pub fn mark_active(&self, addr: SocketAddr) {
        let confirmed = {
            let mut peer = self.peers.entry(addr).or_insert_with(Peer::new);
            peer.active = true;
            peer.last_seen = Some(Instant::now());
            peer.confirmed.clone()
        };
        // Entry lock released before waking the waiter.
        confirmed.notify_waiters();
    }

    /// Marks `addr` inactive. `last_seen` is left untouched; no-op for
    /// unknown or already-inactive peers.
    pub fn mark_inactive(&self, addr: SocketAddr) {
        if let Some(mut peer) = self.peers.get_mut(&addr) {
            peer.active = false;
        }
    }

    /// Returns a consistent point-in-time copy of every peer, so callers can
    /// iterate (and send probes) without holding any registry lock.
    pub fn snapshot(&self) -> Vec<PeerSnapshot> {
        self.peers
            .iter()
            .map(|entry| PeerSnapshot {
                addr: *entry.key(),
                active: entry.value().active,
                last_seen: entry.value().last_seen,
            })
            .collect()
    }

    pub fn is_active(&self, addr: &SocketAddr) -> bool {
        self.peers
            .get(addr)
            .map(|peer| peer.active)
            .unwrap_or(false)
    }

    pub fn last_seen(&self, addr: &SocketAddr) -> Option<Instant> {
        self.peers.get(addr).and_then(|peer| peer.last_seen)
    }

    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.peers.contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Suspends until `addr` is confirmed live by a signal newer than
    /// `since`, or until `timeout` elapses. Returns whether the confirmation
    /// arrived.
    ///
    /// The `Notified` future is registered before the state check, so a
    /// confirmation landing between the check and the await is never missed;
    /// a stale wakeup (e.g. from an earlier attempt window) fails the
    /// freshness check and goes back to waiting.
    pub async fn wait_for_confirmation(
        &self,
        addr: SocketAddr,
        since: Option<Instant>,
        timeout: Duration,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let confirmed = match self.peers.get(&addr) {
                Some(peer) => peer.confirmed.clone(),
                // Unregistered mid-wait; nothing can confirm it.
                None => return false,
            };

            let notified = confirmed.notified();
            tokio::pin!(notified);

            if self.confirmed_since(&addr, since) {
                return true;
            }

            match tokio::time::timeout_at(deadline, &mut notified).await {
                Ok(()) => {
                    if self.confirmed_since(&addr, since) {
                        return true;
                    }
                    // Stale or foreign wakeup, keep waiting out the deadline.
                }
                Err(_) => return self.confirmed_since(&addr, since),
            }
        }
    }

    fn confirmed_since(&self, addr: &SocketAddr, since: Option<Instant>) -> bool {
        self.peers
            .get(addr)
            .map(|peer| {
                peer.active
                    && match (peer.last_seen, since) {
                        (Some(seen), Some(baseline)) => seen > baseline,
                        (Some(_), None) => true,
                        (None, _) => false,
                    }
            })
            .unwrap_or(false)
    }
}
