//! Domain models for SIGMET advisories.
//!
//! Canonical definitions for the core entities:
//! - `SigmetRecord`: editable draft of an advisory
//! - `ValidatedSigmet`: record that passed persist validation
//! - Vocabularies: `Phenomenon`, `SigmetLevelUnit`, `SigmetDirection`,
//!   `SigmetChange`, `SigmetStatus`
//! - `HazardArea`: validated GeoJSON hazard area

pub mod error;
pub mod geometry;
pub mod parts;
pub mod sigmet;
pub mod vocabulary;

// Re-export main types and errors
pub use error::{DecodeError, Result, SigmetError, ValidationError};
pub use geometry::{GeometryError, HazardArea, Position};
pub use parts::{ObsOrForecast, SigmetLevel, SigmetLevelPart, SigmetMovement};
pub use sigmet::{
    AdvisoryClass, SigmetRecord, ValidatedSigmet, UNASSIGNED_SEQUENCE, WS_VALIDITY_HOURS,
    WV_VALIDITY_HOURS,
};
pub use vocabulary::{
    Lookup, Phenomenon, SigmetChange, SigmetDirection, SigmetLevelUnit, SigmetStatus, Vocabulary,
};
