//! Bucketed deduplication over the dedup-store collection.

use std::sync::Arc;

use super::{ObjectStore, StoreError, StoreResult, COLLECTION_DEDUP_STORE};
use crate::bucket::{bucket_label, Clock};
use crate::keys::dedup_key;
use crate::models::{DedupRecord, TimeBucket};

/// Operations on the dedup-store collection.
pub struct DedupStore {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
}

impl DedupStore {
    pub fn new(store: Arc<dyn ObjectStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Checks whether the composite dedup identity has already been
    /// claimed within the currently active bucket window, claiming it when
    /// it has not.
    ///
    /// Returns `true` when a prior claim exists, `false` when this call
    /// made the first claim. The check-then-put sequence is not atomic:
    /// two concurrent first calls may both observe a miss and both write,
    /// each returning `false`. That yields at most one extra allowed
    /// action per contention episode and the claim still converges.
    pub async fn check_and_claim(
        &self,
        internal_entity_id: &str,
        dedup_obj_type: &str,
        dedup_obj_id: &str,
        time_bucket: &str,
    ) -> StoreResult<bool> {
        let bucket = TimeBucket::parse(time_bucket)?;
        let label = bucket_label(bucket, self.clock.as_ref());
        let key = dedup_key(internal_entity_id, dedup_obj_type, dedup_obj_id, &label);

        let body = match self.store.get(COLLECTION_DEDUP_STORE, &key).await {
            Ok(body) => body,
            Err(StoreError::NotFound) => {
                self.claim(&key, bucket).await?;
                return Ok(false);
            }
            Err(err) => {
                return Err(StoreError::Backend(format!(
                    "failed to check dedup record: {}",
                    err
                )))
            }
        };

        let _record: DedupRecord = serde_json::from_slice(&body).map_err(|err| {
            StoreError::Serialization(format!("failed to decode dedup record: {}", err))
        })?;

        Ok(true)
    }

    async fn claim(&self, key: &str, bucket: TimeBucket) -> StoreResult<()> {
        let record = DedupRecord {
            time_bucket: bucket,
        };

        let body = serde_json::to_vec(&record).map_err(|err| {
            StoreError::Serialization(format!("failed to encode dedup record: {}", err))
        })?;

        self.store
            .put(COLLECTION_DEDUP_STORE, key, body)
            .await
            .map_err(|err| StoreError::Backend(format!("failed to store dedup record: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::FixedClock;
    use crate::store::MemoryObjectStore;
    use chrono::{DateTime, Utc};

    fn clock_at(s: &str) -> Arc<FixedClock> {
        let instant: DateTime<Utc> = s.parse().expect("valid RFC 3339 timestamp");
        Arc::new(FixedClock(instant))
    }

    fn dedup_store_at(s: &str) -> (Arc<MemoryObjectStore>, DedupStore) {
        let store = Arc::new(MemoryObjectStore::new());
        let dedup = DedupStore::new(store.clone(), clock_at(s));
        (store, dedup)
    }

    #[tokio::test]
    async fn test_first_claim_returns_false_then_true() {
        let (_store, dedup) = dedup_store_at("2023-05-15T10:00:00Z");

        let exists = dedup
            .check_and_claim("e", "alert", "a1", "forever")
            .await
            .unwrap();
        assert!(!exists);

        let exists = dedup
            .check_and_claim("e", "alert", "a1", "forever")
            .await
            .unwrap();
        assert!(exists);
    }

    #[tokio::test]
    async fn test_claim_persists_active_bucket() {
        let (store, dedup) = dedup_store_at("2023-05-15T10:03:00Z");

        dedup
            .check_and_claim("e", "alert", "a1", "5 minutes")
            .await
            .unwrap();

        let key = dedup_key("e", "alert", "a1", "2023-05-15_10:00");
        let body = store.get(COLLECTION_DEDUP_STORE, &key).await.unwrap();
        let record: DedupRecord = serde_json::from_slice(&body).unwrap();
        assert_eq!(record.time_bucket, TimeBucket::FiveMinutes);
    }

    #[tokio::test]
    async fn test_invalid_bucket_is_rejected() {
        let (store, dedup) = dedup_store_at("2023-05-15T10:00:00Z");

        let err = dedup
            .check_and_claim("e", "alert", "a1", "1 hour")
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("unsupported time bucket value: 1 hour"));
        assert!(store.is_empty(COLLECTION_DEDUP_STORE).await);
    }

    #[tokio::test]
    async fn test_distinct_identities_do_not_collide() {
        let (_store, dedup) = dedup_store_at("2023-05-15T10:00:00Z");

        assert!(!dedup
            .check_and_claim("e", "alert", "a1", "forever")
            .await
            .unwrap());
        assert!(!dedup
            .check_and_claim("e", "alert", "a2", "forever")
            .await
            .unwrap());
        assert!(!dedup
            .check_and_claim("e", "detection", "a1", "forever")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_bucket_rollover_permits_again() {
        let store = Arc::new(MemoryObjectStore::new());

        let before = DedupStore::new(store.clone(), clock_at("2023-05-15T10:19:59.999Z"));
        assert!(!before
            .check_and_claim("e", "alert", "a1", "5 minutes")
            .await
            .unwrap());

        // Same identity one tick past the window boundary lands in a new
        // bucket and is unclaimed there.
        let after = DedupStore::new(store.clone(), clock_at("2023-05-15T10:20:00Z"));
        assert!(!after
            .check_and_claim("e", "alert", "a1", "5 minutes")
            .await
            .unwrap());

        assert_eq!(store.len(COLLECTION_DEDUP_STORE).await, 2);
    }

    #[tokio::test]
    async fn test_same_window_is_deduplicated() {
        let store = Arc::new(MemoryObjectStore::new());

        let first = DedupStore::new(store.clone(), clock_at("2023-05-15T10:31:00Z"));
        assert!(!first
            .check_and_claim("e", "alert", "a1", "30 minutes")
            .await
            .unwrap());

        let later = DedupStore::new(store.clone(), clock_at("2023-05-15T10:59:59Z"));
        assert!(later
            .check_and_claim("e", "alert", "a1", "30 minutes")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_get_errors_are_surfaced() {
        let (store, dedup) = dedup_store_at("2023-05-15T10:00:00Z");
        store.fail_next_get("kv outage").await;

        let err = dedup
            .check_and_claim("e", "alert", "a1", "forever")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("failed to check dedup record"));
        assert!(message.contains("kv outage"));
    }

    #[tokio::test]
    async fn test_put_errors_are_surfaced() {
        let (store, dedup) = dedup_store_at("2023-05-15T10:00:00Z");
        store.fail_next_put("kv outage").await;

        let err = dedup
            .check_and_claim("e", "alert", "a1", "forever")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to store dedup record"));
    }

    #[tokio::test]
    async fn test_undecodable_claim_is_an_error() {
        let (store, dedup) = dedup_store_at("2023-05-15T10:00:00Z");

        let key = dedup_key("e", "alert", "a1", "forever_bucket");
        store
            .put(COLLECTION_DEDUP_STORE, &key, b"{broken".to_vec())
            .await
            .unwrap();

        let err = dedup
            .check_and_claim("e", "alert", "a1", "forever")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to decode dedup record"));
    }
}
