use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::TrackerConfig;
use crate::error::TrackerError;

use super::registry::PeerRegistry;
use super::types::{EchoMessage, StatusReport};

/// How long the receive loop pauses after a transient socket error.
const RECV_ERROR_PAUSE: Duration = Duration::from_millis(100);

/// The liveness tracking service.
///
/// Owns the shared UDP socket (receive loop and probe sends both go through
/// it) and the peer registry. `start` spawns one task per duty: the receive
/// loop, the probing cycle ticker and the status reporter. All of them unwind
/// promptly once the service's cancellation token is triggered.
pub struct TrackerService {
    config: TrackerConfig,
    registry: Arc<PeerRegistry>,
    socket: Arc<UdpSocket>,
    probe_permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl TrackerService {
    /// Binds the tracking socket and registers the configured peers.
    ///
    /// Socket allocation failure is the only startup-fatal condition and is
    /// returned to the caller.
    pub async fn new(config: TrackerConfig) -> Result<Arc<Self>, TrackerError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| TrackerError::Bind {
                addr: config.bind_addr,
                source: e,
            })?;

        let registry = PeerRegistry::new();
        for peer in &config.peers {
            registry.register(*peer);
        }

        info!(
            "Tracker listening on {}, {} peer(s) registered",
            socket.local_addr().map_err(TrackerError::LocalAddr)?,
            registry.len()
        );

        Ok(Arc::new(Self {
            probe_permits: Arc::new(Semaphore::new(config.max_inflight_probes)),
            shutdown: CancellationToken::new(),
            registry,
            socket: Arc::new(socket),
            config,
        }))
    }

    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TrackerError> {
        self.socket.local_addr().map_err(TrackerError::LocalAddr)
    }

    /// Token observed by every loop of this service. Dependents may clone it
    /// to follow the subsystem's shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Raises the single cancellation signal for the whole subsystem.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Spawns the receive loop, the prober and the reporter. Returns their
    /// handles so callers can await a full unwind after `shutdown`.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(3);

        let service = self.clone();
        handles.push(tokio::spawn(async move {
            service.receive_loop().await;
        }));

        let service = self.clone();
        handles.push(tokio::spawn(async move {
            service.probe_loop().await;
        }));

        let service = self.clone();
        handles.push(tokio::spawn(async move {
            service.report_loop().await;
        }));

        info!("Tracker background tasks started");
        handles
    }

    /// Single long-running receive loop over the tracking socket.
    ///
    /// Pure receive-and-update: confirmations update the registry, everything
    /// else is logged and skipped. Transient read errors never tear the loop
    /// down; a fatal socket error cancels the whole service.
    pub(crate) async fn receive_loop(self: Arc<Self>) {
        let mut buf = vec![0u8; 1024];

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Receive loop stopping");
                    return;
                }
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, src)) => self.handle_datagram(&buf[..len], src),
                    Err(e) if is_fatal_socket_error(&e) => {
                        tracing::error!("Tracking socket closed: {}", e);
                        self.shutdown.cancel();
                        return;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to receive UDP packet: {}", e);
                        tokio::time::sleep(RECV_ERROR_PAUSE).await;
                    }
                }
            }
        }
    }

    fn handle_datagram(&self, payload: &[u8], src: SocketAddr) {
        match EchoMessage::parse(payload) {
            Some(EchoMessage::Reply) => {
                let known = self.registry.contains(&src);
                self.registry.mark_active(src);
                if known {
                    tracing::debug!("Peer {} confirmed active", src);
                } else {
                    info!("New peer {} registered from unsolicited response", src);
                }
            }
            Some(EchoMessage::Probe) => {
                tracing::debug!("Ignoring probe on tracking socket from {}", src);
            }
            None => {
                tracing::warn!(
                    "Unrecognized datagram ({} bytes) from {}, discarding",
                    payload.len(),
                    src
                );
            }
        }
    }

    async fn probe_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.probe_interval);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Probe loop stopping");
                    return;
                }
                _ = interval.tick() => {
                    self.clone().probe_cycle().await;
                }
            }
        }
    }

    /// One full probing round: snapshot the registry and run every peer's
    /// retry procedure concurrently. In-flight probes are capped by the
    /// semaphore; per-peer independence is preserved either way.
    pub(crate) async fn probe_cycle(self: Arc<Self>) {
        let peers = self.registry.snapshot();
        if peers.is_empty() {
            return;
        }

        tracing::debug!("Probing {} peer(s)", peers.len());

        let mut probes = JoinSet::new();
        for peer in peers {
            let service = self.clone();
            probes.spawn(async move {
                let Ok(_permit) = service.probe_permits.clone().acquire_owned().await else {
                    return;
                };
                service.probe_peer(peer.addr).await;
            });
        }

        while probes.join_next().await.is_some() {}
    }

    /// Per-peer retry procedure: up to `max_attempts` strictly sequential
    /// probe-and-wait attempts. A send failure is decisive and demotes the
    /// peer immediately; a confirmation ends the cycle for this peer; the
    /// final timeout demotes it.
    async fn probe_peer(&self, addr: SocketAddr) {
        for attempt in 1..=self.config.max_attempts {
            let since = self.registry.last_seen(&addr);

            if let Err(e) = self.socket.send_to(EchoMessage::Probe.as_bytes(), addr).await {
                tracing::warn!("Failed to send probe to {}: {}", addr, e);
                self.registry.mark_inactive(addr);
                return;
            }

            tracing::debug!(
                "Sent probe to {} (attempt {}/{})",
                addr,
                attempt,
                self.config.max_attempts
            );

            let confirmed = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                confirmed = self
                    .registry
                    .wait_for_confirmation(addr, since, self.config.probe_timeout) => confirmed,
            };

            if confirmed {
                tracing::debug!("Peer {} confirmed on attempt {}", addr, attempt);
                return;
            }

            if attempt == self.config.max_attempts {
                self.registry.mark_inactive(addr);
                info!(
                    "Peer {} marked inactive after {} attempts",
                    addr, self.config.max_attempts
                );
            } else {
                tracing::debug!(
                    "No response from {} within {:?}, retrying",
                    addr,
                    self.config.probe_timeout
                );
            }
        }
    }

    async fn report_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.report_interval);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Reporter stopping");
                    return;
                }
                _ = interval.tick() => {
                    self.report_status();
                }
            }
        }
    }

    /// Read-only dump of the registry. Logs a human-readable summary and,
    /// when configured, one JSON line per report on stdout.
    fn report_status(&self) {
        let snapshot = self.registry.snapshot();
        let report = StatusReport::from_snapshot(&snapshot, Instant::now());

        info!("Peer status: {}/{} active", report.active, report.total);
        for peer in &report.peers {
            let status = if peer.active { "active" } else { "inactive" };
            match peer.last_seen_secs {
                Some(secs) => {
                    info!("  - {}: {} (last seen {:.1}s ago)", peer.addr, status, secs)
                }
                None => info!("  - {}: {} (never seen)", peer.addr, status),
            }
        }

        if self.config.json_status {
            if let Ok(line) = serde_json::to_string(&report) {
                println!("{}", line);
            }
        }
    }
}

/// Errors that mean the socket itself is gone, as opposed to a transient
/// per-datagram failure (e.g. an ICMP-induced connection reset).
pub(crate) fn is_fatal_socket_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof
    )
}
