//! In-memory SIGMET store (testing and dry runs)
//!
//! `MemorySigmetStore` satisfies the [`SigmetStore`] contract without
//! touching the filesystem.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use sigmet_core::codec::content_digest;
use sigmet_core::obs::emit_sigmet_stored;
use sigmet_core::{
    validate_for_persist, SigmetRecord, SigmetStatus, ValidatedSigmet, Vocabulary,
};

use crate::error::{StoreError, StoreResult};
use crate::storage_traits::{
    check_replaceable, find_in, next_sequence_in, sort_records, SigmetStore,
};

/// In-memory store backed by a `HashMap<uuid, ValidatedSigmet>`.
#[derive(Debug, Default)]
pub struct MemorySigmetStore {
    sigmets: Mutex<HashMap<String, ValidatedSigmet>>,
}

impl MemorySigmetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sigmets(&self) -> MutexGuard<'_, HashMap<String, ValidatedSigmet>> {
        self.sigmets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn records(&self) -> Vec<SigmetRecord> {
        self.sigmets()
            .values()
            .map(|s| s.record().clone())
            .collect()
    }
}

impl SigmetStore for MemorySigmetStore {
    fn put(&self, sigmet: &ValidatedSigmet) -> StoreResult<String> {
        let digest = content_digest(sigmet)?;
        let mut sigmets = self.sigmets();
        if let Some(existing) = sigmets.get(sigmet.uuid()) {
            check_replaceable(existing)?;
        }
        sigmets.insert(sigmet.uuid().to_string(), sigmet.clone());
        emit_sigmet_stored(sigmet.uuid(), sigmet.lifecycle_status().code(), &digest);
        Ok(digest)
    }

    fn get(&self, uuid: &str) -> StoreResult<SigmetRecord> {
        self.sigmets()
            .get(uuid)
            .map(|s| s.record().clone())
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))
    }

    fn list(&self) -> StoreResult<Vec<SigmetRecord>> {
        let mut records = self.records();
        sort_records(&mut records);
        Ok(records)
    }

    fn next_sequence(&self, firname: &str, day: NaiveDate) -> StoreResult<i32> {
        Ok(next_sequence_in(&self.records(), firname, day))
    }

    fn find_by_sequence(
        &self,
        firname: &str,
        day: NaiveDate,
        sequence: i32,
    ) -> StoreResult<Option<SigmetRecord>> {
        Ok(find_in(&self.records(), firname, day, sequence))
    }

    fn mark_cancelled(&self, uuid: &str) -> StoreResult<ValidatedSigmet> {
        let mut sigmets = self.sigmets();
        let stored = sigmets
            .get(uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;
        if stored.status() != Some(SigmetStatus::Published) {
            return Err(StoreError::NotPublished {
                uuid: uuid.to_string(),
            });
        }

        let mut record = stored.record().clone();
        record.set_status(Some(SigmetStatus::Cancelled));
        let cancelled = validate_for_persist(&record)?;
        let digest = content_digest(&cancelled)?;
        sigmets.insert(uuid.to_string(), cancelled.clone());
        emit_sigmet_stored(uuid, SigmetStatus::Cancelled.code(), &digest);
        Ok(cancelled)
    }

    fn delete(&self, uuid: &str) -> StoreResult<()> {
        self.sigmets().remove(uuid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmet_core::testing::random_sigmet;

    #[test]
    fn test_put_get_list() {
        let store = MemorySigmetStore::new();
        let sigmet = validate_for_persist(&random_sigmet()).unwrap();
        store.put(&sigmet).unwrap();

        assert!(store.get(sigmet.uuid()).unwrap().same_content(&sigmet));
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(matches!(store.get("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_cancelled_record_is_immutable() {
        let store = MemorySigmetStore::new();
        let mut record = random_sigmet();
        record.set_status(Some(SigmetStatus::Published));
        let sigmet = validate_for_persist(&record).unwrap();
        store.put(&sigmet).unwrap();

        let cancelled = store.mark_cancelled(sigmet.uuid()).unwrap();
        assert!(matches!(
            store.put(&cancelled),
            Err(StoreError::Immutable {
                status: SigmetStatus::Cancelled,
                ..
            })
        ));
        assert!(matches!(
            store.mark_cancelled(sigmet.uuid()),
            Err(StoreError::NotPublished { .. })
        ));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemorySigmetStore::new();
        let sigmet = validate_for_persist(&random_sigmet()).unwrap();
        store.put(&sigmet).unwrap();

        store.delete(sigmet.uuid()).unwrap();
        store.delete(sigmet.uuid()).unwrap();
        assert!(matches!(store.get(sigmet.uuid()), Err(StoreError::NotFound(_))));
    }
}
