//! Run Configuration
//!
//! Both services treat their configuration as constants for one run: the
//! values are assembled once at startup (by the binaries' flag parsing or by
//! tests) and never change afterwards.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_INFLIGHT_PROBES: usize = 64;
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(100);

/// Configuration for the tracking service.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Address the shared tracking socket binds to.
    pub bind_addr: SocketAddr,
    /// Peers registered at startup. More may appear at runtime via
    /// unsolicited responses.
    pub peers: Vec<SocketAddr>,
    /// Time between probing cycles.
    pub probe_interval: Duration,
    /// How long one attempt waits for a confirmation.
    pub probe_timeout: Duration,
    /// Retry budget per peer per cycle.
    pub max_attempts: u32,
    /// Time between status reports.
    pub report_interval: Duration,
    /// Cap on simultaneously in-flight per-peer probe tasks.
    pub max_inflight_probes: usize,
    /// Also emit each status report as one JSON line on stdout.
    pub json_status: bool,
}

impl TrackerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            peers: Vec::new(),
            probe_interval: DEFAULT_PROBE_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            report_interval: DEFAULT_REPORT_INTERVAL,
            max_inflight_probes: DEFAULT_MAX_INFLIGHT_PROBES,
            json_status: false,
        }
    }
}

/// Configuration for the responder (peer endpoint) service.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub bind_addr: SocketAddr,
    /// Whether probes are answered at all. Disabled responders drop probes
    /// silently, which the tracker observes as an inactive peer.
    pub respond: bool,
    /// Simulated per-datagram processing latency, applied independently per
    /// receive-reply cycle.
    pub processing_delay: Duration,
}

impl ResponderConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            respond: true,
            processing_delay: DEFAULT_PROCESSING_DELAY,
        }
    }
}
