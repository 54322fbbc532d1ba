use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use sigmet_core::obs::emit_sigmet_stored;
use sigmet_core::{
    validate_for_persist, SigmetCodec, SigmetError, SigmetRecord, SigmetStatus, ValidatedSigmet,
    Vocabulary,
};

use crate::error::{StoreError, StoreResult};
use crate::storage_traits::{
    check_replaceable, find_in, next_sequence_in, sort_records, SigmetStore,
};

/// Filesystem-backed SIGMET store, one JSON document per record.
///
/// Layout: `<root>/sigmets/<uuid>.json`
pub struct FsSigmetStore {
    sigmets_dir: PathBuf,
    codec: SigmetCodec,
    write_lock: Mutex<()>,
}

impl FsSigmetStore {
    /// Create a store rooted at `root` using the canonical codec. Creates
    /// `root/sigmets/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_codec(root, SigmetCodec::default())
    }

    pub fn with_codec(root: impl AsRef<Path>, codec: SigmetCodec) -> StoreResult<Self> {
        let sigmets_dir = root.as_ref().join("sigmets");
        fs::create_dir_all(&sigmets_dir)?;
        Ok(Self {
            sigmets_dir,
            codec,
            write_lock: Mutex::new(()),
        })
    }

    pub fn sigmets_dir(&self) -> &Path {
        &self.sigmets_dir
    }

    fn record_path(&self, uuid: &str) -> StoreResult<PathBuf> {
        let usable = !uuid.is_empty()
            && uuid
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(StoreError::InvalidUuid(uuid.to_string()));
        }
        Ok(self.sigmets_dir.join(format!("{}.json", uuid)))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, uuid: &str) -> StoreResult<SigmetRecord> {
        let path = self.record_path(uuid)?;
        self.codec.read_file(&path).map_err(|e| match e {
            SigmetError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                StoreError::NotFound(uuid.to_string())
            }
            other => StoreError::Codec(other),
        })
    }

    fn write(&self, sigmet: &ValidatedSigmet) -> StoreResult<String> {
        let path = self.record_path(sigmet.uuid())?;
        self.codec.write_file(&path, sigmet)?;
        let digest = self.codec.content_digest(sigmet)?;
        emit_sigmet_stored(sigmet.uuid(), sigmet.lifecycle_status().code(), &digest);
        Ok(digest)
    }
}

impl SigmetStore for FsSigmetStore {
    fn put(&self, sigmet: &ValidatedSigmet) -> StoreResult<String> {
        let _guard = self.lock();
        match self.read(sigmet.uuid()) {
            Ok(existing) => check_replaceable(&existing)?,
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.write(sigmet)
    }

    fn get(&self, uuid: &str) -> StoreResult<SigmetRecord> {
        self.read(uuid)
    }

    fn list(&self) -> StoreResult<Vec<SigmetRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.sigmets_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            records.push(self.codec.read_file(&path)?);
        }
        sort_records(&mut records);
        Ok(records)
    }

    fn next_sequence(&self, firname: &str, day: NaiveDate) -> StoreResult<i32> {
        let records = self.list()?;
        Ok(next_sequence_in(&records, firname, day))
    }

    fn find_by_sequence(
        &self,
        firname: &str,
        day: NaiveDate,
        sequence: i32,
    ) -> StoreResult<Option<SigmetRecord>> {
        let records = self.list()?;
        Ok(find_in(&records, firname, day, sequence))
    }

    fn mark_cancelled(&self, uuid: &str) -> StoreResult<ValidatedSigmet> {
        let _guard = self.lock();
        let mut record = self.read(uuid)?;
        if record.status() != Some(SigmetStatus::Published) {
            return Err(StoreError::NotPublished {
                uuid: uuid.to_string(),
            });
        }
        record.set_status(Some(SigmetStatus::Cancelled));
        let cancelled = validate_for_persist(&record)?;
        self.write(&cancelled)?;
        Ok(cancelled)
    }

    fn delete(&self, uuid: &str) -> StoreResult<()> {
        let path = self.record_path(uuid)?;
        let _guard = self.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmet_core::testing::random_sigmet;

    fn make_store() -> (tempfile::TempDir, FsSigmetStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSigmetStore::new(dir.path()).unwrap();
        (dir, store)
    }

    fn validated(status: SigmetStatus) -> ValidatedSigmet {
        let mut record = random_sigmet();
        record.set_status(Some(status));
        validate_for_persist(&record).unwrap()
    }

    #[test]
    fn record_roundtrip() {
        let (dir, store) = make_store();
        let sigmet = validated(SigmetStatus::Production);
        let digest = store.put(&sigmet).unwrap();
        assert_eq!(digest.len(), 64);

        let path = dir
            .path()
            .join("sigmets")
            .join(format!("{}.json", sigmet.uuid()));
        assert!(path.exists());

        let back = store.get(sigmet.uuid()).unwrap();
        assert!(back.same_content(&sigmet));
    }

    #[test]
    fn draft_can_be_replaced() {
        let (_dir, store) = make_store();
        let sigmet = validated(SigmetStatus::Production);
        store.put(&sigmet).unwrap();

        let mut edited = sigmet.clone().into_draft();
        edited.set_forecast_position(Some("N OF N52".to_string()));
        store.put(&validate_for_persist(&edited).unwrap()).unwrap();

        let back = store.get(sigmet.uuid()).unwrap();
        assert_eq!(back.forecast_position(), Some("N OF N52"));
    }

    #[test]
    fn published_record_is_immutable() {
        let (_dir, store) = make_store();
        let sigmet = validated(SigmetStatus::Published);
        store.put(&sigmet).unwrap();

        let err = store.put(&sigmet).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Immutable {
                status: SigmetStatus::Published,
                ..
            }
        ));
    }

    #[test]
    fn mark_cancelled_requires_published() {
        let (_dir, store) = make_store();
        let draft = validated(SigmetStatus::Production);
        store.put(&draft).unwrap();
        assert!(matches!(
            store.mark_cancelled(draft.uuid()),
            Err(StoreError::NotPublished { .. })
        ));

        let published = validated(SigmetStatus::Published);
        store.put(&published).unwrap();
        let cancelled = store.mark_cancelled(published.uuid()).unwrap();
        assert_eq!(cancelled.lifecycle_status(), SigmetStatus::Cancelled);
        assert_eq!(
            store.get(published.uuid()).unwrap().status(),
            Some(SigmetStatus::Cancelled)
        );
    }

    #[test]
    fn get_nonexistent_returns_not_found() {
        let (_dir, store) = make_store();
        let err = store.get("does-not-exist").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref uuid) if uuid == "does-not-exist"));
    }

    #[test]
    fn delete_removes_file_and_ignores_missing() {
        let (dir, store) = make_store();
        let sigmet = validated(SigmetStatus::Published);
        store.put(&sigmet).unwrap();

        store.delete(sigmet.uuid()).unwrap();
        let path = dir
            .path()
            .join("sigmets")
            .join(format!("{}.json", sigmet.uuid()));
        assert!(!path.exists());
        store.delete(sigmet.uuid()).unwrap();
        assert!(matches!(store.delete("../escape"), Err(StoreError::InvalidUuid(_))));
    }

    #[test]
    fn path_like_uuid_rejected() {
        let (_dir, store) = make_store();
        let err = store.get("../escape").unwrap_err();
        assert!(matches!(err, StoreError::InvalidUuid(_)));
    }

    #[test]
    fn list_skips_foreign_files() {
        let (dir, store) = make_store();
        store.put(&validated(SigmetStatus::Production)).unwrap();
        store.put(&validated(SigmetStatus::Test)).unwrap();
        fs::write(dir.path().join("sigmets").join("notes.txt"), "scratch").unwrap();

        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_file_is_codec_error() {
        let (dir, store) = make_store();
        fs::write(dir.path().join("sigmets").join("broken.json"), "{not json").unwrap();
        assert!(matches!(store.get("broken"), Err(StoreError::Codec(_))));
    }
}
