use serde::Serialize;
use std::net::SocketAddr;
use std::time::Instant;

/// Wire tag for an outbound liveness probe.
pub const ECHO_REQUEST: &[u8] = b"ECHO-REQUEST";
/// Wire tag for a liveness confirmation.
pub const ECHO_RESPONSE: &[u8] = b"ECHO-RESPONSE";

/// The wire protocol of the echo pair: two opaque ASCII tags, no length
/// prefix, no sequence numbers. Anything else on the socket is unrecognized
/// and discarded by the receive loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoMessage {
    /// `ECHO-REQUEST`, sent by the prober to a peer endpoint.
    Probe,
    /// `ECHO-RESPONSE`, sent back by a peer endpoint.
    Reply,
}

impl EchoMessage {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload {
            ECHO_REQUEST => Some(Self::Probe),
            ECHO_RESPONSE => Some(Self::Reply),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Probe => ECHO_REQUEST,
            Self::Reply => ECHO_RESPONSE,
        }
    }
}

/// Point-in-time copy of one tracked peer, taken under the registry's
/// entry lock so it can never expose a half-updated record.
#[derive(Debug, Clone)]
pub struct PeerSnapshot {
    pub addr: SocketAddr,
    pub active: bool,
    pub last_seen: Option<Instant>,
}

/// One peer line of a status report.
#[derive(Debug, Clone, Serialize)]
pub struct PeerStatus {
    pub addr: String,
    pub active: bool,
    /// Seconds since the last confirmed liveness signal, `None` if the peer
    /// was never seen.
    pub last_seen_secs: Option<f64>,
}

/// Read-only rendering of the registry, produced by the status reporter.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub total: usize,
    pub active: usize,
    pub peers: Vec<PeerStatus>,
}

impl StatusReport {
    pub fn from_snapshot(peers: &[PeerSnapshot], now: Instant) -> Self {
        let lines: Vec<PeerStatus> = peers
            .iter()
            .map(|peer| PeerStatus {
                addr: peer.addr.to_string(),
                active: peer.active,
                last_seen_secs: peer
                    .last_seen
                    .map(|seen| now.duration_since(seen).as_secs_f64()),
            })
            .collect();

        Self {
            total: lines.len(),
            active: lines.iter().filter(|line| line.active).count(),
            peers: lines,
        }
    }
}
