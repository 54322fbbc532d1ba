//! Publication desk: drives records through draft, publish, cancel and amend.
//!
//! The desk is the only writer that changes a record's lifecycle status. It
//! validates before every write and serializes numbering so that two
//! publications for the same FIR and day never share a sequence number.

use std::sync::{Mutex, MutexGuard, PoisonError};

use sigmet_core::obs::{
    emit_sequence_assigned, emit_sigmet_cancelled, emit_sigmet_published, SigmetSpan,
};
use sigmet_core::{
    validate_cancellation, validate_for_persist, SigmetRecord, SigmetStatus, ValidatedSigmet,
};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage_traits::{now, sequence_day, SigmetStore};

/// Result of [`SigmetDesk::amend`].
#[derive(Debug, Clone)]
pub struct Amendment {
    /// Published cancellation of the amended SIGMET.
    pub cancellation: ValidatedSigmet,
    /// Stored draft carrying the amended SIGMET's content.
    pub draft: ValidatedSigmet,
}

/// Lifecycle operations over a [`SigmetStore`].
pub struct SigmetDesk<S: SigmetStore> {
    store: S,
    numbering: Mutex<()>,
}

/// FIR name of a record about to be numbered. ICAO and MWO indicators must
/// be present as well.
fn numbering_fir(record: &SigmetRecord) -> StoreResult<String> {
    let missing = |field| StoreError::MissingIdentity {
        uuid: record.uuid().to_string(),
        field,
    };
    record
        .location_indicator_icao()
        .ok_or_else(|| missing("location_indicator_icao"))?;
    record
        .location_indicator_mwo()
        .ok_or_else(|| missing("location_indicator_mwo"))?;
    record
        .firname()
        .map(str::to_string)
        .ok_or_else(|| missing("firname"))
}

impl<S: SigmetStore> SigmetDesk<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            numbering: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn numbering(&self) -> MutexGuard<'_, ()> {
        self.numbering.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn roll_back(&self, uuid: &str, cause: &StoreError) {
        warn!(uuid = %uuid, error = %cause, "rolling back partial write");
        if let Err(e) = self.store.delete(uuid) {
            warn!(uuid = %uuid, error = %e, "rollback failed");
        }
    }

    /// Validate and store a draft.
    ///
    /// # Errors
    ///
    /// - `StoreError::Immutable`: the record carries a final status, or a
    ///   final record with the same uuid is already stored.
    /// - `StoreError::Validation`: the record fails persist validation.
    pub fn save_draft(&self, record: &SigmetRecord) -> StoreResult<ValidatedSigmet> {
        let _span = SigmetSpan::enter(record.uuid());
        if let Some(status) = record.status().filter(SigmetStatus::is_final) {
            return Err(StoreError::Immutable {
                uuid: record.uuid().to_string(),
                status,
            });
        }
        let validated = validate_for_persist(record)?;
        self.store.put(&validated)?;
        Ok(validated)
    }

    /// Publish a stored draft under the next sequence number of its FIR and day.
    ///
    /// The issue time is set to now when the draft has none.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: no record with this uuid.
    /// - `StoreError::Immutable`: the record is already published or cancelled.
    /// - `StoreError::MissingIdentity`: the record has no FIR name, ICAO or
    ///   MWO indicator.
    /// - `StoreError::Validation`: the record fails persist validation.
    pub fn publish(&self, uuid: &str) -> StoreResult<ValidatedSigmet> {
        let _span = SigmetSpan::enter(uuid);
        let _numbering = self.numbering();
        let mut record = self.store.get(uuid)?;
        if let Some(status) = record.status().filter(SigmetStatus::is_final) {
            return Err(StoreError::Immutable {
                uuid: uuid.to_string(),
                status,
            });
        }
        let firname = numbering_fir(&record)?;
        if record.issuedate().is_none() {
            record.set_issuedate(Some(now()));
        }

        let day = sequence_day(&record);
        let sequence = self.store.next_sequence(&firname, day)?;
        emit_sequence_assigned(&firname, &day.to_string(), sequence);

        record.set_sequence(sequence);
        record.set_status(Some(SigmetStatus::Published));
        let published = validate_for_persist(&record)?;
        self.store.put(&published)?;

        emit_sigmet_published(uuid, &firname, sequence);
        Ok(published)
    }

    /// Cancel a published SIGMET.
    ///
    /// Publishes a new record that copies the prior's content and references
    /// its sequence number, then marks the prior `CANCELLED`. If the prior
    /// cannot be marked, the cancellation is removed again.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: no record with this uuid.
    /// - `StoreError::NotPublished`: the record is not `PUBLISHED`.
    /// - `StoreError::MissingIdentity`: the record has no FIR name, ICAO or
    ///   MWO indicator.
    /// - `StoreError::Validation`: the cancellation fails validation.
    pub fn cancel(&self, uuid: &str) -> StoreResult<ValidatedSigmet> {
        let _span = SigmetSpan::enter(uuid);
        let _numbering = self.numbering();
        let prior = self.store.get(uuid)?;
        if prior.status() != Some(SigmetStatus::Published) {
            return Err(StoreError::NotPublished {
                uuid: uuid.to_string(),
            });
        }

        let firname = numbering_fir(&prior)?;
        let day = sequence_day(&prior);
        let sequence = self.store.next_sequence(&firname, day)?;
        emit_sequence_assigned(&firname, &day.to_string(), sequence);

        let mut cancellation = SigmetRecord::copy_of(&prior);
        cancellation.set_cancels(Some(prior.sequence()));
        cancellation.set_sequence(sequence);
        cancellation.set_status(Some(SigmetStatus::Published));
        cancellation.set_issuedate(Some(now()));

        let validated = validate_cancellation(&cancellation, &prior)?;
        self.store.put(&validated)?;
        if let Err(e) = self.store.mark_cancelled(uuid) {
            self.roll_back(validated.uuid(), &e);
            return Err(e);
        }

        emit_sigmet_cancelled(uuid, validated.uuid(), prior.sequence());
        Ok(validated)
    }

    /// Cancel a published SIGMET and store a new draft with its content.
    ///
    /// The draft keeps the content and FIR of the original under a fresh
    /// uuid; edit it and [`publish`](Self::publish) it to complete the
    /// amendment. The draft is stored first and removed again when the
    /// cancellation fails.
    pub fn amend(&self, uuid: &str) -> StoreResult<Amendment> {
        let prior = self.store.get(uuid)?;
        if prior.status() != Some(SigmetStatus::Published) {
            return Err(StoreError::NotPublished {
                uuid: uuid.to_string(),
            });
        }

        let mut draft = SigmetRecord::copy_of(&prior);
        draft.set_issuedate(None);
        let draft = self.save_draft(&draft)?;

        let cancellation = match self.cancel(uuid) {
            Ok(cancellation) => cancellation,
            Err(e) => {
                self.roll_back(draft.uuid(), &e);
                return Err(e);
            }
        };
        debug!(amended = %uuid, draft = %draft.uuid(), "amendment draft stored");

        Ok(Amendment {
            cancellation,
            draft,
        })
    }
}
