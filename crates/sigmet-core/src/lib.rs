//! SIGMET Core Library
//!
//! Domain model, lifecycle validation, canonical JSON codec and exchange
//! conversion for ICAO SIGMET advisories.

pub mod codec;
pub mod convert;
pub mod domain;
pub mod lifecycle;
pub mod obs;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use domain::{
    AdvisoryClass, DecodeError, GeometryError, HazardArea, Lookup, ObsOrForecast, Phenomenon,
    Position, Result, SigmetChange, SigmetDirection, SigmetError, SigmetLevel, SigmetLevelPart,
    SigmetLevelUnit, SigmetMovement, SigmetRecord, SigmetStatus, ValidatedSigmet,
    ValidationError, Vocabulary, UNASSIGNED_SEQUENCE, WS_VALIDITY_HOURS, WV_VALIDITY_HOURS,
};

pub use codec::{CodecConfig, SigmetCodec, DATEFORMAT_ISO8601};
pub use convert::{
    ConversionError, ConversionSpecification, ExchangeConverter, TacConverter, SIGMET_TO_TAC,
};
pub use lifecycle::{
    advisory_class, default_status, default_validity, effective_validity_end,
    validate_cancellation, validate_for_persist,
};

/// SIGMET core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
