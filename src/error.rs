//! Error Taxonomy
//!
//! Only resource acquisition at startup is fatal to the caller. Per-datagram
//! and per-peer failures are handled inside the loops: transient receive
//! errors are logged and skipped, send failures demote the peer, and
//! confirmation timeouts are absorbed by the retry budget.

use std::net::SocketAddr;

/// Errors surfaced by the liveness tracking services.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("local socket address unavailable: {0}")]
    LocalAddr(#[source] std::io::Error),
}
