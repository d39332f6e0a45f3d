//! Peer Endpoint Module
//!
//! The responder is the standalone reflector half of the echo pair: it
//! listens on its own UDP socket and answers `ECHO-REQUEST` probes with
//! `ECHO-RESPONSE`, independent of any tracking logic. Responding can be
//! disabled to simulate an unreachable peer.

pub mod service;

#[cfg(test)]
mod tests;
