//! Lifecycle validation for SIGMET records.
//!
//! Gates a record before it is persisted, published or handed to an exchange
//! converter, and computes the derived values the lifecycle relies on.
//! Everything here is pure: inputs are borrowed, defaults are applied to a
//! copy, and the only side effect is a tracing event per verdict.

use chrono::{DateTime, Duration, Utc};

use crate::domain::error::ValidationError;
use crate::domain::sigmet::{AdvisoryClass, SigmetRecord, ValidatedSigmet};
use crate::domain::vocabulary::{Phenomenon, SigmetStatus, Vocabulary};
use crate::obs::{emit_sigmet_rejected, emit_sigmet_validated};

/// Status a record gets when none was set.
pub fn default_status(record: &SigmetRecord) -> SigmetStatus {
    record.status().unwrap_or(SigmetStatus::Production)
}

/// Advisory class of a phenomenon.
///
/// Every phenomenon in the closed table is a WS advisory. Unrecognized codes
/// for volcanic ash (`VA ...`) or tropical cyclones (`TC ...`) map to WV.
pub fn advisory_class(phenomenon: &Phenomenon) -> AdvisoryClass {
    match phenomenon {
        Phenomenon::Unknown(code) if code.starts_with("VA") || code.starts_with("TC") => {
            AdvisoryClass::Wv
        }
        _ => AdvisoryClass::Ws,
    }
}

/// Default validity duration for a record, based on its phenomenon.
pub fn default_validity(record: &SigmetRecord) -> Duration {
    record
        .phenomenon()
        .map(advisory_class)
        .unwrap_or(AdvisoryClass::Ws)
        .default_validity()
}

/// End of the validity window: the explicit end when given, otherwise the
/// start plus the default validity. `None` when no start is known.
pub fn effective_validity_end(record: &SigmetRecord) -> Option<DateTime<Utc>> {
    record
        .validdate_end()
        .or_else(|| record.validdate().map(|start| start + default_validity(record)))
}

fn check_required(record: &SigmetRecord) -> Result<(), ValidationError> {
    if record.geojson().is_none() {
        return Err(ValidationError::MissingRequiredField { field: "geojson" });
    }
    match record.phenomenon() {
        None => Err(ValidationError::MissingRequiredField {
            field: "phenomenon",
        }),
        Some(Phenomenon::Unknown(code)) => Err(ValidationError::UnrecognizedCode {
            field: "phenomenon",
            code: code.clone(),
        }),
        Some(_) => Ok(()),
    }
}

fn finish(record: &SigmetRecord, cancellation: bool) -> ValidatedSigmet {
    let mut validated = record.clone();
    if validated.status().is_none() {
        validated.set_status(Some(SigmetStatus::Production));
    }
    emit_sigmet_validated(
        validated.uuid(),
        default_status(&validated).code(),
        cancellation,
    );
    ValidatedSigmet::new_unchecked(validated)
}

fn reject<T>(record: &SigmetRecord, error: ValidationError) -> Result<T, ValidationError> {
    emit_sigmet_rejected(record.uuid(), &error);
    Err(error)
}

/// Validate a record for storage or publication.
///
/// # Errors
///
/// - `ValidationError::MissingRequiredField`: `geojson` or `phenomenon` is absent.
/// - `ValidationError::UnrecognizedCode`: the phenomenon is a preserved
///   unknown code.
///
/// On success the returned record is a copy whose status defaults to
/// `PRODUCTION` when unset; `record` itself is not modified.
pub fn validate_for_persist(record: &SigmetRecord) -> Result<ValidatedSigmet, ValidationError> {
    match check_required(record) {
        Ok(()) => Ok(finish(record, false)),
        Err(e) => reject(record, e),
    }
}

fn check_cancellation(record: &SigmetRecord, prior: &SigmetRecord) -> Result<(), ValidationError> {
    if prior.status() != Some(SigmetStatus::Published) {
        return Err(ValidationError::cancellation(format!(
            "prior SIGMET {} is {}, not PUBLISHED",
            prior.uuid(),
            prior
                .status()
                .map_or_else(|| "unset".to_string(), |s| s.to_string())
        )));
    }

    let cancels = record.cancels().ok_or_else(|| {
        ValidationError::cancellation("record does not reference a prior sequence")
    })?;

    if cancels != prior.sequence() {
        return Err(ValidationError::cancellation(format!(
            "cancels {} but prior SIGMET has sequence {}",
            cancels,
            prior.sequence()
        )));
    }

    let same_fir = record.firname() == prior.firname()
        && record.location_indicator_icao() == prior.location_indicator_icao()
        && record.location_indicator_mwo() == prior.location_indicator_mwo();
    if !same_fir {
        return Err(ValidationError::cancellation(format!(
            "FIR {:?}/{:?}/{:?} does not match prior {:?}/{:?}/{:?}",
            record.firname(),
            record.location_indicator_icao(),
            record.location_indicator_mwo(),
            prior.firname(),
            prior.location_indicator_icao(),
            prior.location_indicator_mwo()
        )));
    }

    if record.has_sequence() && record.sequence() <= cancels {
        return Err(ValidationError::cancellation(format!(
            "own sequence {} must be greater than cancelled sequence {}",
            record.sequence(),
            cancels
        )));
    }

    Ok(())
}

/// Validate a cancellation record against the SIGMET it supersedes.
///
/// Checks (in order):
/// 1. `prior` is `PUBLISHED`.
/// 2. `record.cancels` is present and equals `prior.sequence`.
/// 3. Both records belong to the same FIR, location and watch office.
/// 4. When the record already has a sequence, it is greater than `cancels`.
/// 5. The record passes [`validate_for_persist`].
///
/// # Errors
///
/// `ValidationError::InvalidCancellationTarget` for checks 1–4, and the
/// persist errors for check 5.
pub fn validate_cancellation(
    record: &SigmetRecord,
    prior: &SigmetRecord,
) -> Result<ValidatedSigmet, ValidationError> {
    if let Err(e) = check_cancellation(record, prior).and_then(|_| check_required(record)) {
        return reject(record, e);
    }
    Ok(finish(record, true))
}
