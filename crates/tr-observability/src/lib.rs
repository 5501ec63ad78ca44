//! Observability infrastructure for Ticket Relay.

pub mod logging;
