//! Entity-to-ticket mapping operations over the tracked-entities
//! collection.

use std::sync::Arc;
use tracing::info;

use super::{ObjectStore, StoreError, StoreResult, COLLECTION_TRACKED_ENTITIES};
use crate::keys::tracked_entity_key;
use crate::models::ExternalEntityRecord;

/// Operations on the tracked-entities collection.
pub struct MappingStore {
    store: Arc<dyn ObjectStore>,
}

impl MappingStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Looks up the mapping for `internal_entity_id`, scoped to
    /// `external_system_id` when it is non-empty.
    ///
    /// A miss returns `Ok(None)`. A record stored under the same key but
    /// carrying a different `external_system_id` also returns `Ok(None)`:
    /// callers see the collection as one mapping per ticket class even
    /// though the key is shared.
    pub async fn lookup(
        &self,
        internal_entity_id: &str,
        external_system_id: &str,
    ) -> StoreResult<Option<ExternalEntityRecord>> {
        let key = tracked_entity_key(external_system_id, internal_entity_id)?;

        let body = match self.store.get(COLLECTION_TRACKED_ENTITIES, &key).await {
            Ok(body) => body,
            Err(StoreError::NotFound) => return Ok(None),
            Err(err) => {
                return Err(StoreError::Backend(format!(
                    "failed to check if external entity exists: {}",
                    err
                )))
            }
        };

        let record: ExternalEntityRecord = serde_json::from_slice(&body).map_err(|err| {
            StoreError::Serialization(format!(
                "failed to decode external entity record: {}",
                err
            ))
        })?;

        if !external_system_id.is_empty() && record.external_system_id != external_system_id {
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Writes `record`, overwriting any existing mapping at the same key.
    ///
    /// There is no compare-and-swap on the backend; concurrent writers
    /// converge through last-write-wins.
    pub async fn upsert(&self, record: &ExternalEntityRecord) -> StoreResult<()> {
        let body = serde_json::to_vec(record).map_err(|err| {
            StoreError::Serialization(format!("error encoding entity record: {}", err))
        })?;

        let key = tracked_entity_key(&record.external_system_id, &record.internal_entity_id)?;

        self.store
            .put(COLLECTION_TRACKED_ENTITIES, &key, body)
            .await
            .map_err(|err| {
                StoreError::Backend(format!(
                    "error storing entity mapping in collection: {}",
                    err
                ))
            })?;

        info!(
            internal_id = %record.internal_entity_id,
            external_id = %record.external_entity_id,
            system_id = %record.external_system_id,
            "stored entity mapping"
        );

        Ok(())
    }
}
