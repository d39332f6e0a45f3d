use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ResponderConfig;
use crate::error::TrackerError;
use crate::tracker::service::is_fatal_socket_error;
use crate::tracker::types::EchoMessage;

/// How long the receive loop pauses after a transient socket error.
const RECV_ERROR_PAUSE: Duration = Duration::from_millis(100);

/// The peer endpoint: receives probes and optionally reflects them back to
/// the originating address.
///
/// Each datagram is handled in its own task, so the simulated processing
/// latency of one receive-reply cycle never starves concurrent probes.
pub struct ResponderService {
    config: ResponderConfig,
    socket: Arc<UdpSocket>,
    shutdown: CancellationToken,
}

impl ResponderService {
    pub async fn new(config: ResponderConfig) -> Result<Arc<Self>, TrackerError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| TrackerError::Bind {
                addr: config.bind_addr,
                source: e,
            })?;

        info!(
            "Responder listening on {}, will respond: {}",
            socket.local_addr().map_err(TrackerError::LocalAddr)?,
            config.respond
        );

        Ok(Arc::new(Self {
            shutdown: CancellationToken::new(),
            socket: Arc::new(socket),
            config,
        }))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TrackerError> {
        self.socket.local_addr().map_err(TrackerError::LocalAddr)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Spawns the receive loop and returns its handle.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            service.receive_loop().await;
        })
    }

    async fn receive_loop(self: Arc<Self>) {
        let mut buf = vec![0u8; 1024];

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Responder stopping");
                    return;
                }
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, src)) => {
                        let payload = buf[..len].to_vec();
                        let service = self.clone();
                        tokio::spawn(async move {
                            service.handle_datagram(payload, src).await;
                        });
                    }
                    Err(e) if is_fatal_socket_error(&e) => {
                        tracing::error!("Responder socket closed: {}", e);
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

    async fn handle_datagram(&self, payload: Vec<u8>, src: SocketAddr) {
        match EchoMessage::parse(&payload) {
            Some(EchoMessage::Probe) => {
                if !self.config.processing_delay.is_zero() {
                    tokio::time::sleep(self.config.processing_delay).await;
                }

                if !self.config.respond {
                    tracing::debug!("Responding disabled, dropping probe from {}", src);
                    return;
                }

                match self
                    .socket
                    .send_to(EchoMessage::Reply.as_bytes(), src)
                    .await
                {
                    Ok(_) => tracing::debug!("Sent response to {}", src),
                    Err(e) => tracing::warn!("Failed to send response to {}: {}", src, e),
                }
            }
            _ => {
                tracing::debug!(
                    "Ignoring unrecognized datagram ({} bytes) from {}",
                    payload.len(),
                    src
                );
            }
        }
    }
}
