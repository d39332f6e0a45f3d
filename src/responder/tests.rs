//! Responder Module Tests
//!
//! Exercises the reflector over loopback sockets: reply behavior, the
//! respond-disabled mode, payload filtering, and cycle independence under
//! simulated processing latency.

#[cfg(test)]
mod tests {
    use crate::config::ResponderConfig;
    use crate::responder::service::ResponderService;
    use crate::tracker::types::{ECHO_REQUEST, ECHO_RESPONSE};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::net::UdpSocket;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    async fn spawn_responder(respond: bool, delay: Duration) -> (Arc<ResponderService>, SocketAddr) {
        let mut config = ResponderConfig::new(loopback());
        config.respond = respond;
        config.processing_delay = delay;
        let service = ResponderService::new(config)
            .await
            .expect("Failed to bind responder");
        let addr = service.local_addr().expect("responder addr");
        service.start();
        (service, addr)
    }

    async fn recv_reply(socket: &UdpSocket, timeout: Duration) -> Option<(Vec<u8>, SocketAddr)> {
        let mut buf = vec![0u8; 1024];
        match tokio::time::timeout(timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, src))) => Some((buf[..len].to_vec(), src)),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_replies_to_probe() {
        let (_responder, addr) = spawn_responder(true, Duration::ZERO).await;

        let probe = UdpSocket::bind(loopback()).await.expect("bind");
        probe.send_to(ECHO_REQUEST, addr).await.expect("send");

        let (payload, src) = recv_reply(&probe, Duration::from_secs(1))
            .await
            .expect("no reply received");
        assert_eq!(payload, ECHO_RESPONSE);
        assert_eq!(src, addr);
    }

    #[tokio::test]
    async fn test_silent_when_responding_disabled() {
        let (_responder, addr) = spawn_responder(false, Duration::ZERO).await;

        let probe = UdpSocket::bind(loopback()).await.expect("bind");
        probe.send_to(ECHO_REQUEST, addr).await.expect("send");

        assert!(recv_reply(&probe, Duration::from_millis(300)).await.is_none());
    }

    #[tokio::test]
    async fn test_ignores_non_probe_payloads() {
        let (_responder, addr) = spawn_responder(true, Duration::ZERO).await;

        let probe = UdpSocket::bind(loopback()).await.expect("bind");
        probe.send_to(ECHO_RESPONSE, addr).await.expect("send");
        probe.send_to(b"GARBAGE", addr).await.expect("send");

        assert!(recv_reply(&probe, Duration::from_millis(300)).await.is_none());
    }

    #[tokio::test]
    async fn test_receive_reply_cycles_are_independent() {
        // 300ms of simulated processing per datagram; three concurrent
        // probes must all be answered in roughly one delay, not three.
        let (_responder, addr) = spawn_responder(true, Duration::from_millis(300)).await;

        let mut probes = Vec::new();
        for _ in 0..3 {
            let socket = UdpSocket::bind(loopback()).await.expect("bind");
            socket.send_to(ECHO_REQUEST, addr).await.expect("send");
            probes.push(socket);
        }

        let start = Instant::now();
        for socket in &probes {
            let (payload, _) = recv_reply(socket, Duration::from_secs(2))
                .await
                .expect("no reply received");
            assert_eq!(payload, ECHO_RESPONSE);
        }

        let elapsed = start.elapsed();
        assert!(elapsed < Duration::from_millis(700), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let config = ResponderConfig::new(loopback());
        let responder = ResponderService::new(config)
            .await
            .expect("Failed to bind responder");
        let handle = responder.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        responder.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("responder failed to stop after shutdown")
            .expect("responder panicked");
    }
}
