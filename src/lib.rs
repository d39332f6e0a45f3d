//! UDP Liveness Tracking Library
//!
//! This library crate defines the modules that make up the echo-based peer
//! tracking system. It serves as the foundation for the two binaries
//! (`tracker` and `responder`).
//!
//! ## Architecture Modules
//! The system is composed of loosely coupled subsystems:
//!
//! - **`tracker`**: The core liveness engine. A registry of known peers, a
//!   receive loop that confirms liveness from `ECHO-RESPONSE` datagrams, a
//!   prober that issues `ECHO-REQUEST` probes with a bounded retry budget,
//!   and a periodic status reporter.
//! - **`responder`**: The peer endpoint. A minimal reflector that answers
//!   probes with `ECHO-RESPONSE` (or drops them when responding is disabled).
//! - **`config`**: Static run configuration for both services.
//! - **`error`**: Startup-fatal error taxonomy.

pub mod config;
pub mod error;
pub mod responder;
pub mod tracker;
