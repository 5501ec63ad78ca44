//! Persisted record shapes and the time-bucket enum.

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// A mapping between an internal security entity and the ticket it was
/// materialized into in an external ITSM system.
///
/// For any `(external_system_id, internal_entity_id)` pair at most one
/// record exists in the tracked-entities collection; writes overwrite
/// unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEntityRecord {
    pub internal_entity_id: String,
    pub external_entity_id: String,
    pub external_system_id: String,
}

/// Time interval for time-based deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBucket {
    #[serde(rename = "forever")]
    Forever,
    #[serde(rename = "5 minutes")]
    FiveMinutes,
    #[serde(rename = "30 minutes")]
    ThirtyMinutes,
}

impl TimeBucket {
    /// The wire representation of this bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Forever => "forever",
            TimeBucket::FiveMinutes => "5 minutes",
            TimeBucket::ThirtyMinutes => "30 minutes",
        }
    }

    /// Parses the wire representation of a bucket.
    ///
    /// The enum is closed: anything other than the three accepted values
    /// is rejected.
    pub fn parse(value: &str) -> Result<Self, StoreError> {
        match value {
            "forever" => Ok(TimeBucket::Forever),
            "5 minutes" => Ok(TimeBucket::FiveMinutes),
            "30 minutes" => Ok(TimeBucket::ThirtyMinutes),
            other => Err(StoreError::UnsupportedTimeBucket(other.to_string())),
        }
    }

    /// Width of the bucket window in minutes, or `None` for `Forever`.
    pub fn window_minutes(&self) -> Option<u32> {
        match self {
            TimeBucket::Forever => None,
            TimeBucket::FiveMinutes => Some(5),
            TimeBucket::ThirtyMinutes => Some(30),
        }
    }
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A claim on a composite dedup key within one bucket window.
///
/// The stored `time_bucket` always equals the bucket that was active when
/// the record was written. Records are never mutated; they fall out of use
/// when the bucket label rolls over and the derived key changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRecord {
    pub time_bucket: TimeBucket,
}
