//! Core domain types and storage operations for Ticket Relay.
//!
//! This crate holds everything that does not talk to the network: the
//! persisted record shapes, object-key derivation, time-bucket
//! calculation, and the mapping/dedup store operations on top of the
//! [`ObjectStore`] abstraction. The Falcon-backed implementation of the
//! store lives in `tr-platform`; an in-memory implementation is provided
//! here for tests and local development.

pub mod bucket;
pub mod keys;
pub mod models;
pub mod store;

pub use bucket::{bucket_label, Clock, FixedClock, SystemClock, FOREVER_BUCKET_LABEL};
pub use models::{DedupRecord, ExternalEntityRecord, TimeBucket};
pub use store::{
    DedupStore, MappingStore, MemoryObjectStore, ObjectStore, StoreError, StoreResult,
    COLLECTION_DEDUP_STORE, COLLECTION_TRACKED_ENTITIES,
};
