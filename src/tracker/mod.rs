//! Liveness Tracking Module
//!
//! Tracks a set of remote peers over UDP and maintains an eventually
//! consistent activity status for each one.
//!
//! ## Core Mechanisms
//! - **Probing**: every cycle, each registered peer is sent an `ECHO-REQUEST`
//!   and given a bounded retry budget (3 attempts by default) to confirm
//!   liveness before being demoted to inactive.
//! - **Confirmation**: a single receive loop on the shared socket marks peers
//!   active on `ECHO-RESPONSE` and wakes the probe attempt waiting on them,
//!   so attempts return as soon as a reply lands instead of sleeping out the
//!   full timeout.
//! - **Independence**: peers are probed concurrently; one unreachable peer
//!   never delays liveness detection for the others.

pub mod registry;
pub mod service;
pub mod types;
