//! Conversion of validated SIGMETs into exchange formats.
//!
//! A converter declares what it converts through a [`ConversionSpecification`]
//! and only accepts a [`ValidatedSigmet`]. [`TacConverter`] renders the ICAO
//! Annex 3 traditional alphanumeric code (TAC).

use chrono::{DateTime, Utc};

use crate::domain::geometry::Position;
use crate::domain::parts::{ObsOrForecast, SigmetLevel, SigmetLevelPart, SigmetMovement};
use crate::domain::sigmet::{SigmetRecord, ValidatedSigmet};
use crate::domain::vocabulary::{SigmetLevelUnit, Vocabulary};
use crate::lifecycle::effective_validity_end;

/// Errors produced by an exchange converter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot convert without {0}")]
    MissingField(&'static str),

    #[error("sigmet has no sequence number yet")]
    NoSequence,

    #[error("unsupported conversion: {0}")]
    Unsupported(String),
}

/// Identifies a conversion: source format, target format and message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpecification {
    pub input: &'static str,
    pub output: &'static str,
    pub name: &'static str,
}

pub const SIGMET_TO_TAC: ConversionSpecification = ConversionSpecification {
    input: "SigmetRecord",
    output: "TAC",
    name: "ICAO Annex 3 SIGMET",
};

/// A converter from validated records to some exchange representation.
pub trait ExchangeConverter {
    type Output;

    fn specification(&self) -> &ConversionSpecification;

    fn convert(&self, sigmet: &ValidatedSigmet) -> Result<Self::Output, ConversionError>;

    /// Parse an exchange message back into a draft record.
    fn convert_back(&self, _input: &Self::Output) -> Result<SigmetRecord, ConversionError> {
        Err(ConversionError::Unsupported(format!(
            "{} -> {}",
            self.specification().output,
            self.specification().input
        )))
    }
}

/// Renders TAC text. Inverse conversion is not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TacConverter;

impl ExchangeConverter for TacConverter {
    type Output = String;

    fn specification(&self) -> &ConversionSpecification {
        &SIGMET_TO_TAC
    }

    fn convert(&self, sigmet: &ValidatedSigmet) -> Result<String, ConversionError> {
        let record = sigmet.record();
        if !record.has_sequence() {
            return Err(ConversionError::NoSequence);
        }
        let icao = record
            .location_indicator_icao()
            .ok_or(ConversionError::MissingField("location_indicator_icao"))?;
        let mwo = record
            .location_indicator_mwo()
            .ok_or(ConversionError::MissingField("location_indicator_mwo"))?;
        let firname = record
            .firname()
            .ok_or(ConversionError::MissingField("firname"))?;
        let valid_from = record
            .validdate()
            .ok_or(ConversionError::MissingField("validdate"))?;
        let valid_to =
            effective_validity_end(record).ok_or(ConversionError::MissingField("validdate_end"))?;
        let validity = format!("{}/{}", day_time(valid_from), day_time(valid_to));

        let header = format!(
            "{} SIGMET {} VALID {} {}-",
            icao,
            record.sequence(),
            validity,
            mwo
        );

        if let Some(cancels) = record.cancels() {
            return Ok(format!(
                "{}\n{} {} CNL SIGMET {} {}=",
                header, icao, firname, cancels, validity
            ));
        }

        let mut body = vec![
            icao.to_string(),
            firname.to_string(),
            sigmet.hazard().code().to_string(),
            observation(record.obs_or_forecast().copied().unwrap_or_default()),
            area(sigmet.hazard_area().outer_rings())?,
        ];
        if let Some(level) = record.level() {
            body.push(level_text(level));
        }
        if let Some(movement) = record.movement() {
            body.push(movement_text(movement));
        }
        if let Some(change) = record.change() {
            body.push(change.code().to_string());
        }

        Ok(format!("{}\n{}=", header, body.join(" ")))
    }
}

fn day_time(at: DateTime<Utc>) -> String {
    at.format("%d%H%M").to_string()
}

fn observation(value: ObsOrForecast) -> String {
    let keyword = if value.is_observed() { "OBS" } else { "FCST" };
    match value.time() {
        Some(at) => format!("{} AT {}Z", keyword, at.format("%H%M")),
        None => keyword.to_string(),
    }
}

/// Degrees and whole minutes, rounded to the nearest minute.
fn degrees_minutes(value: f64) -> (u32, u32) {
    let total = (value.abs() * 60.0).round() as u32;
    (total / 60, total % 60)
}

fn position_text(position: &Position) -> String {
    let (lat_deg, lat_min) = degrees_minutes(position.lat);
    let (lon_deg, lon_min) = degrees_minutes(position.lon);
    format!(
        "{}{:02}{:02} {}{:03}{:02}",
        if position.lat < 0.0 { 'S' } else { 'N' },
        lat_deg,
        lat_min,
        if position.lon < 0.0 { 'W' } else { 'E' },
        lon_deg,
        lon_min
    )
}

fn area(rings: &[Vec<Position>]) -> Result<String, ConversionError> {
    let ring = match rings {
        [ring] => ring,
        _ => {
            return Err(ConversionError::Unsupported(format!(
                "TAC describes one polygon, area has {}",
                rings.len()
            )))
        }
    };

    let mut points: Vec<String> = ring.iter().map(position_text).collect();
    if ring.first() != ring.last() {
        if let Some(first) = points.first().cloned() {
            points.push(first);
        }
    }
    Ok(format!("WI {}", points.join(" - ")))
}

fn part_text(part: &SigmetLevelPart) -> String {
    let value = part.value.round() as i64;
    match part.unit {
        SigmetLevelUnit::Fl => format!("FL{:03}", value),
        SigmetLevelUnit::Ft => format!("{}FT", value),
        SigmetLevelUnit::M => format!("{}M", value),
        SigmetLevelUnit::Sfc => "SFC".to_string(),
        SigmetLevelUnit::Top => format!("TOP FL{:03}", value),
        SigmetLevelUnit::TopAbv => format!("TOP ABV FL{:03}", value),
    }
}

fn level_text(level: &SigmetLevel) -> String {
    match level {
        SigmetLevel::At(part) => part_text(part),
        SigmetLevel::Between(lower, upper)
            if lower.unit == SigmetLevelUnit::Fl && upper.unit == SigmetLevelUnit::Fl =>
        {
            format!("FL{:03}/{:03}", lower.value.round() as i64, upper.value.round() as i64)
        }
        SigmetLevel::Between(lower, upper) => format!("{}/{}", part_text(lower), part_text(upper)),
    }
}

fn movement_text(movement: &SigmetMovement) -> String {
    match movement {
        SigmetMovement::Stationary => "STNR".to_string(),
        SigmetMovement::Moving { direction, speed } => {
            format!("MOV {} {}KT", direction.code(), speed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::{Phenomenon, SigmetChange, SigmetDirection};
    use crate::lifecycle::validate_for_persist;
    use chrono::TimeZone;

    const GEO: &str =
        r#"{"type":"Polygon","coordinates":[[[4.5,52.0],[5.25,52.0],[5.25,53.5],[4.5,52.0]]]}"#;

    fn record() -> SigmetRecord {
        let mut record = SigmetRecord::new("AMSTERDAM FIR", "EHAA", "EHDB", "uuid-1");
        record.set_sequence(3);
        record.set_phenomenon(Some(Phenomenon::SevTurb));
        record.set_geo_from_str(GEO).expect("geojson");
        record.set_obs_or_forecast(Some(ObsOrForecast::observed_at(
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 50, 0).unwrap(),
        )));
        record.set_level(Some(SigmetLevel::At(SigmetLevelPart::new(
            SigmetLevelUnit::Fl,
            100.0,
        ))));
        record.set_movement(Some(SigmetMovement::moving(SigmetDirection::Ne, 15)));
        record.set_change(Some(SigmetChange::Wkn));
        record.set_validdate(Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
        record
    }

    fn tac(record: &SigmetRecord) -> Result<String, ConversionError> {
        TacConverter.convert(&validate_for_persist(record).expect("valid"))
    }

    #[test]
    fn test_tac_golden() {
        let text = tac(&record()).expect("convert");
        assert_eq!(
            text,
            "EHAA SIGMET 3 VALID 011200/011600 EHDB-\n\
             EHAA AMSTERDAM FIR SEV TURB OBS AT 1150Z \
             WI N5200 E00430 - N5200 E00515 - N5330 E00515 - N5200 E00430 \
             FL100 MOV NE 15KT WKN="
        );
    }

    #[test]
    fn test_tac_cancellation_form() {
        let mut cancel = SigmetRecord::copy_of(&record());
        cancel.set_sequence(4);
        cancel.set_cancels(Some(3));
        assert_eq!(
            tac(&cancel).expect("convert"),
            "EHAA SIGMET 4 VALID 011200/011600 EHDB-\nEHAA AMSTERDAM FIR CNL SIGMET 3 011200/011600="
        );
    }

    #[test]
    fn test_tac_layer_and_stationary() {
        let mut record = record();
        record.set_level(Some(SigmetLevel::Between(
            SigmetLevelPart::new(SigmetLevelUnit::Sfc, 0.0),
            SigmetLevelPart::new(SigmetLevelUnit::Fl, 250.0),
        )));
        record.set_movement(Some(SigmetMovement::Stationary));
        record.set_obs_or_forecast(Some(ObsOrForecast::forecast()));
        record.set_change(None);

        let text = tac(&record).expect("convert");
        assert!(text.contains(" FCST WI "), "{}", text);
        assert!(text.ends_with("SFC/FL250 STNR="), "{}", text);
    }

    #[test]
    fn test_tac_requires_sequence() {
        let mut record = record();
        record.set_sequence(crate::domain::sigmet::UNASSIGNED_SEQUENCE);
        assert_eq!(tac(&record).unwrap_err(), ConversionError::NoSequence);
    }

    #[test]
    fn test_tac_requires_validity() {
        let mut record = record();
        record.set_validdate(None);
        assert_eq!(
            tac(&record).unwrap_err(),
            ConversionError::MissingField("validdate")
        );
    }

    #[test]
    fn test_tac_inverse_unsupported() {
        let err = TacConverter.convert_back(&"EHAA SIGMET 1".to_string()).unwrap_err();
        assert!(matches!(err, ConversionError::Unsupported(_)));
        assert_eq!(TacConverter.specification().name, "ICAO Annex 3 SIGMET");
    }
}
