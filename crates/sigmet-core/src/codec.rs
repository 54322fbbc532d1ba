//! Canonical JSON encoding of SIGMET records.
//!
//! The wire layout is fixed: field names and order match the exchange files
//! produced by the issuing offices, absent values are omitted, and
//! timestamps are written in UTC. Only a [`ValidatedSigmet`] can be encoded;
//! decoding yields a draft [`SigmetRecord`] that must be validated again
//! before it is stored or published.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::error::{DecodeError, Result};
use crate::domain::geometry::HazardArea;
use crate::domain::parts::{ObsOrForecast, SigmetLevel, SigmetLevelPart, SigmetMovement};
use crate::domain::sigmet::{SigmetRecord, ValidatedSigmet, UNASSIGNED_SEQUENCE};
use crate::domain::vocabulary::{
    Phenomenon, SigmetChange, SigmetDirection, SigmetLevelUnit, SigmetStatus,
};

/// Timestamp pattern of the canonical contract (`yyyy-MM-dd'T'HH:mm:ss'Z'`).
pub const DATEFORMAT_ISO8601: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Top-level members of the canonical document, in emission order.
pub const FIELDS: &[&str] = &[
    "geojson",
    "phenomenon",
    "obs_or_forecast",
    "level",
    "movement",
    "change",
    "forecast_position",
    "issuedate",
    "validdate",
    "validdate_end",
    "firname",
    "location_indicator_icao",
    "location_indicator_mwo",
    "uuid",
    "status",
    "sequence",
    "cancels",
];

/// Codec behaviour. `CodecConfig::default()` is the canonical contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    date_format: String,
    ignore_unknown_fields: bool,
    accept_single_value_as_array: bool,
    pretty: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            date_format: DATEFORMAT_ISO8601.to_string(),
            ignore_unknown_fields: true,
            accept_single_value_as_array: true,
            pretty: false,
        }
    }
}

impl CodecConfig {
    /// Use a `chrono` strftime pattern for encoding timestamps.
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    pub fn with_ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }

    pub fn with_accept_single_value_as_array(mut self, accept: bool) -> Self {
        self.accept_single_value_as_array = accept;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn ignore_unknown_fields(&self) -> bool {
        self.ignore_unknown_fields
    }

    pub fn accept_single_value_as_array(&self) -> bool {
        self.accept_single_value_as_array
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

fn unassigned() -> i32 {
    UNASSIGNED_SEQUENCE
}

fn yes() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
struct WireSigmet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geojson: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phenomenon: Option<Phenomenon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    obs_or_forecast: Option<WireObsFc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<WireLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    movement: Option<WireMovement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change: Option<SigmetChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forecast_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issuedate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validdate_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    firname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_indicator_icao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_indicator_mwo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<SigmetStatus>,
    #[serde(default = "unassigned")]
    sequence: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cancels: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireObsFc {
    #[serde(default = "yes")]
    obs: bool,
    #[serde(
        rename = "obsFcTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    obs_fc_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireLevel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lev1: Option<WireLevelPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lev2: Option<WireLevelPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireLevelPart {
    value: f64,
    unit: SigmetLevelUnit,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMovement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dir: Option<SigmetDirection>,
    #[serde(default = "yes")]
    stationary: bool,
}

impl From<SigmetLevelPart> for WireLevelPart {
    fn from(part: SigmetLevelPart) -> Self {
        Self {
            value: part.value,
            unit: part.unit,
        }
    }
}

impl From<WireLevelPart> for SigmetLevelPart {
    fn from(part: WireLevelPart) -> Self {
        SigmetLevelPart::new(part.unit, part.value)
    }
}

impl From<SigmetLevel> for WireLevel {
    fn from(level: SigmetLevel) -> Self {
        match level {
            SigmetLevel::At(part) => Self {
                lev1: Some(part.into()),
                lev2: None,
            },
            SigmetLevel::Between(lower, upper) => Self {
                lev1: Some(lower.into()),
                lev2: Some(upper.into()),
            },
        }
    }
}

impl From<SigmetMovement> for WireMovement {
    fn from(movement: SigmetMovement) -> Self {
        match movement {
            SigmetMovement::Stationary => Self {
                speed: None,
                dir: None,
                stationary: true,
            },
            SigmetMovement::Moving { direction, speed } => Self {
                speed: Some(i64::from(speed)),
                dir: Some(direction),
                stationary: false,
            },
        }
    }
}

fn level_from_wire(level: WireLevel) -> std::result::Result<Option<SigmetLevel>, DecodeError> {
    match (level.lev1, level.lev2) {
        (None, None) => Ok(None),
        (Some(lower), None) => Ok(Some(SigmetLevel::At(lower.into()))),
        (Some(lower), Some(upper)) => Ok(Some(SigmetLevel::Between(lower.into(), upper.into()))),
        (None, Some(_)) => Err(DecodeError::InvalidField {
            field: "level",
            reason: "lev2 given without lev1".to_string(),
        }),
    }
}

fn movement_from_wire(movement: WireMovement) -> std::result::Result<SigmetMovement, DecodeError> {
    if movement.stationary {
        return Ok(SigmetMovement::Stationary);
    }
    match (movement.dir, movement.speed) {
        (Some(direction), Some(speed)) => {
            let speed = u32::try_from(speed).map_err(|_| DecodeError::InvalidField {
                field: "movement",
                reason: format!("speed must be non-negative, got {}", speed),
            })?;
            Ok(SigmetMovement::moving(direction, speed))
        }
        _ => Err(DecodeError::InvalidField {
            field: "movement",
            reason: "a moving hazard needs both dir and speed".to_string(),
        }),
    }
}

/// Encoder/decoder bound to one [`CodecConfig`].
#[derive(Debug, Clone, Default)]
pub struct SigmetCodec {
    config: CodecConfig,
}

impl SigmetCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode to a JSON string, pretty-printed when the config asks for it.
    pub fn encode(&self, sigmet: &ValidatedSigmet) -> std::result::Result<String, serde_json::Error> {
        let wire = self.to_wire(sigmet);
        if self.config.pretty {
            serde_json::to_string_pretty(&wire)
        } else {
            serde_json::to_string(&wire)
        }
    }

    /// Encode to a JSON value tree.
    pub fn encode_value(
        &self,
        sigmet: &ValidatedSigmet,
    ) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self.to_wire(sigmet))
    }

    /// Decode a canonical JSON document into a draft record.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` for malformed JSON, an invalid hazard area, an
    /// unparseable timestamp, an unknown code in a closed vocabulary other
    /// than the phenomenon, an inconsistent level or movement, a missing
    /// `uuid`, or an unknown member when the config is strict.
    pub fn decode(&self, json: &str) -> std::result::Result<SigmetRecord, DecodeError> {
        let value: Value = serde_json::from_str(json)?;
        self.decode_value(value)
    }

    pub fn decode_value(&self, value: Value) -> std::result::Result<SigmetRecord, DecodeError> {
        if !self.config.ignore_unknown_fields {
            if let Some(unknown) = value
                .as_object()
                .and_then(|object| object.keys().find(|key| !FIELDS.contains(&key.as_str())))
            {
                return Err(DecodeError::UnknownField(unknown.clone()));
            }
        }

        let wire: WireSigmet = serde_json::from_value(value)?;
        self.from_wire(wire)
    }

    /// Write the encoded record to `path`, replacing it atomically.
    pub fn write_file(&self, path: &Path, sigmet: &ValidatedSigmet) -> Result<()> {
        let body = self.encode(sigmet)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Read and decode a record file.
    pub fn read_file(&self, path: &Path) -> Result<SigmetRecord> {
        let body = fs::read_to_string(path)?;
        Ok(self.decode(&body)?)
    }

    /// SHA-256 hex digest of the compact encoding.
    pub fn content_digest(
        &self,
        sigmet: &ValidatedSigmet,
    ) -> std::result::Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(&self.to_wire(sigmet))?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.format(&self.config.date_format).to_string()
    }

    /// Accepts RFC 3339 with any offset, or the configured pattern.
    fn parse_timestamp(
        &self,
        field: &'static str,
        value: &str,
    ) -> std::result::Result<DateTime<Utc>, DecodeError> {
        DateTime::parse_from_rfc3339(value)
            .or_else(|_| DateTime::parse_from_str(value, &self.config.date_format))
            .map(|at| at.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(value, &self.config.date_format)
                    .map(|naive| naive.and_utc())
            })
            .map_err(|_| DecodeError::Timestamp {
                field,
                value: value.to_string(),
            })
    }

    fn timestamp(
        &self,
        field: &'static str,
        value: Option<String>,
    ) -> std::result::Result<Option<DateTime<Utc>>, DecodeError> {
        value
            .map(|text| self.parse_timestamp(field, &text))
            .transpose()
    }

    fn to_wire(&self, sigmet: &ValidatedSigmet) -> WireSigmet {
        let record = sigmet.record();
        WireSigmet {
            geojson: record.geojson().map(|area| area.as_value().clone()),
            phenomenon: record.phenomenon().cloned(),
            obs_or_forecast: record.obs_or_forecast().map(|value| WireObsFc {
                obs: value.is_observed(),
                obs_fc_time: value.time().map(|at| self.format_timestamp(at)),
            }),
            level: record.level().copied().map(WireLevel::from),
            movement: record.movement().copied().map(WireMovement::from),
            change: record.change(),
            forecast_position: record.forecast_position().map(str::to_string),
            issuedate: record.issuedate().map(|at| self.format_timestamp(at)),
            validdate: record.validdate().map(|at| self.format_timestamp(at)),
            validdate_end: record.validdate_end().map(|at| self.format_timestamp(at)),
            firname: record.firname().map(str::to_string),
            location_indicator_icao: record.location_indicator_icao().map(str::to_string),
            location_indicator_mwo: record.location_indicator_mwo().map(str::to_string),
            uuid: Some(record.uuid().to_string()),
            status: Some(sigmet.lifecycle_status()),
            sequence: record.sequence(),
            cancels: record.cancels(),
        }
    }

    fn from_wire(&self, wire: WireSigmet) -> std::result::Result<SigmetRecord, DecodeError> {
        let uuid = wire.uuid.ok_or(DecodeError::MissingField("uuid"))?;

        let obs_or_forecast = match wire.obs_or_forecast {
            Some(value) => {
                let at = self.timestamp("obs_or_forecast", value.obs_fc_time)?;
                Some(if value.obs {
                    ObsOrForecast::Observed { at }
                } else {
                    ObsOrForecast::Forecast { at }
                })
            }
            None => None,
        };
        let level = match wire.level {
            Some(level) => level_from_wire(level)?,
            None => None,
        };
        let movement = wire.movement.map(movement_from_wire).transpose()?;
        let geojson = wire
            .geojson
            .map(|value| HazardArea::parse_with(value, self.config.accept_single_value_as_array))
            .transpose()?;

        let mut record = SigmetRecord::blank(uuid);
        record.set_identity(
            wire.firname,
            wire.location_indicator_icao,
            wire.location_indicator_mwo,
        );
        record.set_sequence(wire.sequence);
        record.set_status(wire.status);
        record.set_cancels(wire.cancels);
        record.set_phenomenon(wire.phenomenon);
        record.set_obs_or_forecast(obs_or_forecast);
        record.set_level(level);
        record.set_movement(movement);
        record.set_change(wire.change);
        record.set_forecast_position(wire.forecast_position);
        record.set_issuedate(self.timestamp("issuedate", wire.issuedate)?);
        record.set_validdate(self.timestamp("validdate", wire.validdate)?);
        record.set_validdate_end(self.timestamp("validdate_end", wire.validdate_end)?);
        record.set_geojson(geojson);
        Ok(record)
    }
}

/// Encode with the canonical configuration.
pub fn encode(sigmet: &ValidatedSigmet) -> std::result::Result<String, serde_json::Error> {
    SigmetCodec::default().encode(sigmet)
}

/// Decode with the canonical configuration.
pub fn decode(json: &str) -> std::result::Result<SigmetRecord, DecodeError> {
    SigmetCodec::default().decode(json)
}

pub fn write_file(path: &Path, sigmet: &ValidatedSigmet) -> Result<()> {
    SigmetCodec::default().write_file(path, sigmet)
}

pub fn read_file(path: &Path) -> Result<SigmetRecord> {
    SigmetCodec::default().read_file(path)
}

pub fn content_digest(sigmet: &ValidatedSigmet) -> std::result::Result<String, serde_json::Error> {
    SigmetCodec::default().content_digest(sigmet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::validate_for_persist;
    use chrono::TimeZone;
    use serde_json::json;

    const GEO: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[4.4,52.7],[1.4,52.0],[5.3,50.6],[7.7,50.5]]]},"properties":{"prop0":"value0"}}]}"#;

    fn record() -> SigmetRecord {
        let mut record = SigmetRecord::new("AMSTERDAM FIR", "EHAA", "EHDB", "uuid-1");
        record.set_phenomenon(Some(Phenomenon::SevTurb));
        record.set_geo_from_str(GEO).expect("geojson");
        record
    }

    fn full_record() -> SigmetRecord {
        let mut record = record();
        record.set_sequence(3);
        record.set_obs_or_forecast(Some(ObsOrForecast::forecast_at(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        )));
        record.set_level(Some(SigmetLevel::Between(
            SigmetLevelPart::new(SigmetLevelUnit::Sfc, 0.0),
            SigmetLevelPart::new(SigmetLevelUnit::Fl, 250.0),
        )));
        record.set_movement(Some(SigmetMovement::moving(SigmetDirection::Ne, 15)));
        record.set_change(Some(SigmetChange::Wkn));
        record.set_forecast_position(Some("N OF N52".to_string()));
        record.set_issuedate(Some(Utc.with_ymd_and_hms(2024, 3, 1, 11, 55, 0).unwrap()));
        record.set_validdate(Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
        record.set_validdate_end(Some(Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap()));
        record
    }

    fn encoded(record: &SigmetRecord) -> String {
        encode(&validate_for_persist(record).expect("valid")).expect("serialize")
    }

    #[test]
    fn test_full_record_roundtrip() {
        let original = full_record();
        let json = encoded(&original);
        let decoded = decode(&json).expect("deserialize");
        assert!(decoded.same_content(&original), "{}", json);
    }

    #[test]
    fn test_subsecond_times_roundtrip() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(500);
        let mut original = crate::testing::random_sigmet();
        original.set_issuedate(Some(late));
        original.set_validdate(Some(late));
        original.set_obs_or_forecast(Some(ObsOrForecast::observed_at(late)));

        let decoded = decode(&encoded(&original)).expect("deserialize");
        assert!(decoded.same_content(&original), "{}", decoded.describe());
    }

    #[test]
    fn test_minimal_record_roundtrip() {
        let original = record();
        let decoded = decode(&encoded(&original)).expect("deserialize");
        assert!(decoded.same_content(&original));
    }

    #[test]
    fn test_field_order_and_omissions() {
        let json = encoded(&record());
        let geojson = json.find("\"geojson\"").expect("geojson");
        let phenomenon = json.find("\"phenomenon\"").expect("phenomenon");
        let firname = json.find("\"firname\"").expect("firname");
        let uuid = json.find("\"uuid\"").expect("uuid");
        let sequence = json.find("\"sequence\"").expect("sequence");
        assert!(geojson < phenomenon && phenomenon < firname && firname < uuid && uuid < sequence);

        assert!(!json.contains("null"));
        assert!(!json.contains("\"level\""));
        assert!(!json.contains("\"cancels\""));
        assert!(json.contains("\"sequence\":-1"));
        assert!(json.contains("\"phenomenon\":\"SEV TURB\""));
    }

    #[test]
    fn test_cancels_emitted_when_present() {
        let mut record = record();
        record.set_cancels(Some(3));
        assert!(encoded(&record).contains("\"cancels\":3"));

        record.set_cancels(Some(0));
        assert!(encoded(&record).contains("\"cancels\":0"));
    }

    #[test]
    fn test_status_defaults_to_production() {
        let copy = SigmetRecord::copy_of(&record());
        assert!(copy.status().is_none());
        assert!(encoded(&copy).contains("\"status\":\"PRODUCTION\""));
    }

    #[test]
    fn test_timestamp_normalized_to_utc() {
        let json = format!(
            r#"{{"uuid":"u","phenomenon":"SEV ICE","geojson":{},"issuedate":"2024-03-01T13:45:07+02:00"}}"#,
            GEO
        );
        let decoded = decode(&json).expect("deserialize");
        assert_eq!(
            decoded.issuedate(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 11, 45, 7).unwrap())
        );
        assert!(encoded(&decoded).contains("\"issuedate\":\"2024-03-01T11:45:07Z\""));
    }

    #[test]
    fn test_nested_wire_shapes() {
        let value = encode_value(&full_record());
        assert_eq!(value["obs_or_forecast"], json!({"obs": false, "obsFcTime": "2024-03-01T12:30:00Z"}));
        assert_eq!(
            value["level"],
            json!({"lev1": {"value": 0.0, "unit": "SFC"}, "lev2": {"value": 250.0, "unit": "FL"}})
        );
        assert_eq!(value["movement"], json!({"speed": 15, "dir": "NE", "stationary": false}));
        assert_eq!(value["change"], "WKN");
    }

    fn encode_value(record: &SigmetRecord) -> Value {
        SigmetCodec::default()
            .encode_value(&validate_for_persist(record).expect("valid"))
            .expect("serialize")
    }

    #[test]
    fn test_stationary_movement_encoding() {
        let mut record = record();
        record.set_movement(Some(SigmetMovement::Stationary));
        assert_eq!(encode_value(&record)["movement"], json!({"stationary": true}));
    }

    #[test]
    fn test_unknown_fields_ignored_by_default() {
        let json = format!(r#"{{"uuid":"u","geojson":{},"extra":42}}"#, GEO);
        assert!(decode(&json).is_ok());

        let strict = SigmetCodec::new(CodecConfig::default().with_ignore_unknown_fields(false));
        match strict.decode(&json) {
            Err(DecodeError::UnknownField(name)) => assert_eq!(name, "extra"),
            other => panic!("Expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn test_single_feature_accepted_as_list() {
        let json = r#"{"uuid":"u","geojson":{"type":"FeatureCollection","features":{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[4.0,52.0],[5.0,52.0],[5.0,53.0]]]}}}}"#;
        let decoded = decode(json).expect("deserialize");
        assert!(decoded.geojson().expect("area").as_value()["features"].is_array());

        let strict =
            SigmetCodec::new(CodecConfig::default().with_accept_single_value_as_array(false));
        assert!(matches!(strict.decode(json), Err(DecodeError::Geometry(_))));
    }

    #[test]
    fn test_unknown_phenomenon_preserved() {
        let json = r#"{"uuid":"u","phenomenon":"VA CLD"}"#;
        let decoded = decode(json).expect("deserialize");
        assert_eq!(
            decoded.phenomenon(),
            Some(&Phenomenon::Unknown("VA CLD".to_string()))
        );
        assert!(validate_for_persist(&decoded).is_err());
    }

    #[test]
    fn test_legacy_phenomenon_identifier_accepted() {
        let decoded = decode(r#"{"uuid":"u","phenomenon":"EMBD_TS"}"#).expect("deserialize");
        assert_eq!(decoded.phenomenon(), Some(&Phenomenon::EmbdTs));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = decode(r#"{"uuid":"u","status":"DRAFT"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_negative_speed_rejected() {
        let err =
            decode(r#"{"uuid":"u","movement":{"stationary":false,"dir":"N","speed":-5}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "movement", .. }));
    }

    #[test]
    fn test_movement_defaults_to_stationary() {
        let decoded = decode(r#"{"uuid":"u","movement":{}}"#).expect("deserialize");
        assert_eq!(decoded.movement(), Some(&SigmetMovement::Stationary));
    }

    #[test]
    fn test_upper_level_without_lower_rejected() {
        let err = decode(r#"{"uuid":"u","level":{"lev2":{"value":100,"unit":"FL"}}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "level", .. }));
    }

    #[test]
    fn test_missing_uuid_rejected() {
        let err = decode(r#"{"phenomenon":"SEV ICE"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("uuid")));
    }

    #[test]
    fn test_bad_timestamp_names_field() {
        let err = decode(r#"{"uuid":"u","validdate":"tomorrow"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Timestamp { field: "validdate", .. }));
    }

    #[test]
    fn test_custom_date_format() {
        let codec = SigmetCodec::new(CodecConfig::default().with_date_format("%d%H%M %Y-%m"));
        let validated = validate_for_persist(&full_record()).expect("valid");
        let json = codec.encode(&validated).expect("serialize");
        assert!(json.contains("\"validdate\":\"011200 2024-03\""));
    }

    #[test]
    fn test_pretty_output_decodes() {
        let codec = SigmetCodec::new(CodecConfig::default().with_pretty(true));
        let validated = validate_for_persist(&full_record()).expect("valid");
        let json = codec.encode(&validated).expect("serialize");
        assert!(json.contains('\n'));
        assert!(codec.decode(&json).expect("deserialize").same_content(&validated));
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sigmet.json");
        let validated = validate_for_persist(&full_record()).expect("valid");

        write_file(&path, &validated).expect("write");
        let back = read_file(&path).expect("read");
        assert!(back.same_content(&validated));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::domain::error::SigmetError::Io(_)));
    }

    #[test]
    fn test_content_digest_tracks_content() {
        let validated = validate_for_persist(&full_record()).expect("valid");
        let first = content_digest(&validated).expect("digest");
        assert_eq!(first.len(), 64);
        assert_eq!(first, content_digest(&validated).expect("digest"));

        let mut changed = full_record();
        changed.set_change(Some(SigmetChange::Intsf));
        let other = content_digest(&validate_for_persist(&changed).expect("valid")).expect("digest");
        assert_ne!(first, other);
    }
}
