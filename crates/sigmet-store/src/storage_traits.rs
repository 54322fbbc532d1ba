//! Storage trait for SIGMET records and helpers shared by its backends.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use sigmet_core::{SigmetRecord, ValidatedSigmet};

use crate::error::{StoreError, StoreResult};

/// Persistent collection of SIGMET records keyed by uuid.
///
/// Backends refuse to overwrite a record whose stored status is final
/// (`PUBLISHED` or `CANCELLED`). The only permitted change to a final record
/// is [`SigmetStore::mark_cancelled`], apart from [`SigmetStore::delete`]
/// rolling back a write of the same operation.
pub trait SigmetStore: Send + Sync {
    /// Store a record, replacing a non-final record with the same uuid.
    /// Returns the content digest of what was written.
    fn put(&self, sigmet: &ValidatedSigmet) -> StoreResult<String>;

    /// Returns `StoreError::NotFound` if absent.
    fn get(&self, uuid: &str) -> StoreResult<SigmetRecord>;

    /// All stored records, ordered by validity start, sequence, then uuid.
    fn list(&self) -> StoreResult<Vec<SigmetRecord>>;

    /// Next free sequence number for a FIR on a validity day, starting at 1.
    ///
    /// Only published and cancelled records hold numbers. The number is not
    /// reserved until a record carrying it is stored.
    fn next_sequence(&self, firname: &str, day: NaiveDate) -> StoreResult<i32>;

    /// The published or cancelled record numbered `sequence` for a FIR on a day.
    fn find_by_sequence(
        &self,
        firname: &str,
        day: NaiveDate,
        sequence: i32,
    ) -> StoreResult<Option<SigmetRecord>>;

    /// Move a `PUBLISHED` record to `CANCELLED` and return the stored result.
    fn mark_cancelled(&self, uuid: &str) -> StoreResult<ValidatedSigmet>;

    /// Remove a record whatever its status. No-op if absent.
    ///
    /// Only used to undo a write that belongs to a failed desk operation.
    fn delete(&self, uuid: &str) -> StoreResult<()>;
}

/// Validity day a record is numbered under: the UTC date of its validity
/// start, else of its issue time, else today.
pub fn sequence_day(record: &SigmetRecord) -> NaiveDate {
    record
        .validdate()
        .or_else(|| record.issuedate())
        .unwrap_or_else(Utc::now)
        .date_naive()
}

/// Current time truncated to whole seconds, the precision of the wire format.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

fn holds_number(record: &SigmetRecord, firname: &str, day: NaiveDate) -> bool {
    record.has_sequence()
        && record.status().map_or(false, |s| s.is_final())
        && record.firname() == Some(firname)
        && sequence_day(record) == day
}

pub(crate) fn next_sequence_in<'a>(
    records: impl IntoIterator<Item = &'a SigmetRecord>,
    firname: &str,
    day: NaiveDate,
) -> i32 {
    records
        .into_iter()
        .filter(|r| holds_number(r, firname, day))
        .map(SigmetRecord::sequence)
        .max()
        .map_or(1, |highest| highest + 1)
}

pub(crate) fn find_in<'a>(
    records: impl IntoIterator<Item = &'a SigmetRecord>,
    firname: &str,
    day: NaiveDate,
    sequence: i32,
) -> Option<SigmetRecord> {
    records
        .into_iter()
        .find(|r| holds_number(r, firname, day) && r.sequence() == sequence)
        .cloned()
}

/// Fail if `existing` may not be replaced.
pub(crate) fn check_replaceable(existing: &SigmetRecord) -> StoreResult<()> {
    match existing.status() {
        Some(status) if status.is_final() => Err(StoreError::Immutable {
            uuid: existing.uuid().to_string(),
            status,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn sort_records(records: &mut [SigmetRecord]) {
    records.sort_by(|a, b| {
        a.validdate()
            .cmp(&b.validdate())
            .then(a.sequence().cmp(&b.sequence()))
            .then_with(|| a.uuid().cmp(b.uuid()))
    });
}
