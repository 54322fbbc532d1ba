//! The SIGMET record and its validated form.

use std::fmt;
use std::ops::Deref;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use uuid::Uuid;

use super::geometry::{GeometryError, HazardArea};
use super::parts::{ObsOrForecast, SigmetLevel, SigmetMovement};
use super::vocabulary::{Phenomenon, SigmetChange, SigmetStatus, Vocabulary};

/// Sequence value of a record the store has not numbered yet.
pub const UNASSIGNED_SEQUENCE: i32 = -1;

/// Default validity of a weather (WS) SIGMET, in hours.
pub const WS_VALIDITY_HOURS: i64 = 4;

/// Default validity of a volcanic ash / tropical cyclone (WV) SIGMET, in hours.
pub const WV_VALIDITY_HOURS: i64 = 6;

/// ICAO advisory class, which fixes the default validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryClass {
    /// Weather phenomena other than volcanic ash and tropical cyclones.
    Ws,
    /// Volcanic ash and tropical cyclones.
    Wv,
}

impl AdvisoryClass {
    pub fn default_validity(&self) -> Duration {
        match self {
            AdvisoryClass::Ws => Duration::hours(WS_VALIDITY_HOURS),
            AdvisoryClass::Wv => Duration::hours(WV_VALIDITY_HOURS),
        }
    }
}

/// A SIGMET advisory for one Flight Information Region.
///
/// Records are drafts: every field except the identity can be changed freely
/// and nothing is checked until the record goes through
/// [`crate::lifecycle::validate_for_persist`]. Two records are equal when they
/// carry the same `uuid`; use [`SigmetRecord::same_content`] to compare fields.
#[derive(Debug, Clone)]
pub struct SigmetRecord {
    uuid: String,
    firname: Option<String>,
    location_indicator_icao: Option<String>,
    location_indicator_mwo: Option<String>,
    sequence: i32,
    status: Option<SigmetStatus>,
    cancels: Option<i32>,
    phenomenon: Option<Phenomenon>,
    obs_or_forecast: Option<ObsOrForecast>,
    level: Option<SigmetLevel>,
    movement: Option<SigmetMovement>,
    change: Option<SigmetChange>,
    forecast_position: Option<String>,
    issuedate: Option<DateTime<Utc>>,
    validdate: Option<DateTime<Utc>>,
    validdate_end: Option<DateTime<Utc>>,
    geojson: Option<HazardArea>,
}

impl SigmetRecord {
    /// Create a draft for a FIR. Status starts at `PRODUCTION`, sequence unassigned.
    pub fn new(
        firname: impl Into<String>,
        location_indicator_icao: impl Into<String>,
        location_indicator_mwo: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self {
        Self {
            firname: Some(firname.into()),
            location_indicator_icao: Some(location_indicator_icao.into()),
            location_indicator_mwo: Some(location_indicator_mwo.into()),
            status: Some(SigmetStatus::Production),
            ..Self::blank(uuid.into())
        }
    }

    /// Same as [`SigmetRecord::new`] with a freshly generated identifier.
    pub fn draft(
        firname: impl Into<String>,
        location_indicator_icao: impl Into<String>,
        location_indicator_mwo: impl Into<String>,
    ) -> Self {
        Self::new(
            firname,
            location_indicator_icao,
            location_indicator_mwo,
            Uuid::new_v4().to_string(),
        )
    }

    /// Start a new draft from `source`, for a cancellation or an amendment.
    ///
    /// Content and FIR identity are copied; the copy gets its own identifier,
    /// an unassigned sequence, and no status or cancellation link.
    pub fn copy_of(source: &SigmetRecord) -> Self {
        Self {
            firname: source.firname.clone(),
            location_indicator_icao: source.location_indicator_icao.clone(),
            location_indicator_mwo: source.location_indicator_mwo.clone(),
            phenomenon: source.phenomenon.clone(),
            change: source.change,
            forecast_position: source.forecast_position.clone(),
            geojson: source.geojson.clone(),
            level: source.level,
            movement: source.movement,
            obs_or_forecast: source.obs_or_forecast,
            validdate: source.validdate,
            validdate_end: source.validdate_end,
            issuedate: source.issuedate,
            ..Self::blank(Uuid::new_v4().to_string())
        }
    }

    /// A record with nothing but an identifier; used by the decoder.
    pub(crate) fn blank(uuid: String) -> Self {
        Self {
            uuid,
            firname: None,
            location_indicator_icao: None,
            location_indicator_mwo: None,
            sequence: UNASSIGNED_SEQUENCE,
            status: None,
            cancels: None,
            phenomenon: None,
            obs_or_forecast: None,
            level: None,
            movement: None,
            change: None,
            forecast_position: None,
            issuedate: None,
            validdate: None,
            validdate_end: None,
            geojson: None,
        }
    }

    pub(crate) fn set_identity(
        &mut self,
        firname: Option<String>,
        location_indicator_icao: Option<String>,
        location_indicator_mwo: Option<String>,
    ) {
        self.firname = firname;
        self.location_indicator_icao = location_indicator_icao;
        self.location_indicator_mwo = location_indicator_mwo;
    }

    // -- accessors ----------------------------------------------------------

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn firname(&self) -> Option<&str> {
        self.firname.as_deref()
    }

    pub fn location_indicator_icao(&self) -> Option<&str> {
        self.location_indicator_icao.as_deref()
    }

    pub fn location_indicator_mwo(&self) -> Option<&str> {
        self.location_indicator_mwo.as_deref()
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence != UNASSIGNED_SEQUENCE
    }

    pub fn status(&self) -> Option<SigmetStatus> {
        self.status
    }

    pub fn cancels(&self) -> Option<i32> {
        self.cancels
    }

    pub fn phenomenon(&self) -> Option<&Phenomenon> {
        self.phenomenon.as_ref()
    }

    pub fn obs_or_forecast(&self) -> Option<&ObsOrForecast> {
        self.obs_or_forecast.as_ref()
    }

    pub fn level(&self) -> Option<&SigmetLevel> {
        self.level.as_ref()
    }

    pub fn movement(&self) -> Option<&SigmetMovement> {
        self.movement.as_ref()
    }

    pub fn change(&self) -> Option<SigmetChange> {
        self.change
    }

    pub fn forecast_position(&self) -> Option<&str> {
        self.forecast_position.as_deref()
    }

    pub fn issuedate(&self) -> Option<DateTime<Utc>> {
        self.issuedate
    }

    pub fn validdate(&self) -> Option<DateTime<Utc>> {
        self.validdate
    }

    pub fn validdate_end(&self) -> Option<DateTime<Utc>> {
        self.validdate_end
    }

    pub fn geojson(&self) -> Option<&HazardArea> {
        self.geojson.as_ref()
    }

    // -- mutators -----------------------------------------------------------

    pub fn set_sequence(&mut self, sequence: i32) {
        self.sequence = sequence;
    }

    pub fn set_status(&mut self, status: Option<SigmetStatus>) {
        self.status = status;
    }

    pub fn set_cancels(&mut self, cancels: Option<i32>) {
        self.cancels = cancels;
    }

    pub fn set_phenomenon(&mut self, phenomenon: Option<Phenomenon>) {
        self.phenomenon = phenomenon;
    }

    pub fn set_obs_or_forecast(&mut self, obs_or_forecast: Option<ObsOrForecast>) {
        self.obs_or_forecast = obs_or_forecast.map(ObsOrForecast::whole_seconds);
    }

    pub fn set_level(&mut self, level: Option<SigmetLevel>) {
        self.level = level;
    }

    pub fn set_movement(&mut self, movement: Option<SigmetMovement>) {
        self.movement = movement;
    }

    pub fn set_change(&mut self, change: Option<SigmetChange>) {
        self.change = change;
    }

    pub fn set_forecast_position(&mut self, forecast_position: Option<String>) {
        self.forecast_position = forecast_position;
    }

    /// Timestamps are stored in UTC at whole-second precision; convert with
    /// `with_timezone(&Utc)` first.
    pub fn set_issuedate(&mut self, issuedate: Option<DateTime<Utc>>) {
        self.issuedate = issuedate.map(|at| at.trunc_subsecs(0));
    }

    pub fn set_validdate(&mut self, validdate: Option<DateTime<Utc>>) {
        self.validdate = validdate.map(|at| at.trunc_subsecs(0));
    }

    pub fn set_validdate_end(&mut self, validdate_end: Option<DateTime<Utc>>) {
        self.validdate_end = validdate_end.map(|at| at.trunc_subsecs(0));
    }

    pub fn set_geojson(&mut self, geojson: Option<HazardArea>) {
        self.geojson = geojson;
    }

    /// Parse a GeoJSON document and use it as the hazard area.
    ///
    /// On error the current hazard area is left untouched.
    pub fn set_geo_from_str(&mut self, json: &str) -> Result<(), GeometryError> {
        self.geojson = Some(HazardArea::from_json_str(json)?);
        Ok(())
    }

    // -- diagnostics --------------------------------------------------------

    /// Multi-line summary for logs. Missing fields print as `null`.
    pub fn describe(&self) -> String {
        fn or_null<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "null".to_string(), |v| v.to_string())
        }

        format!(
            "Sigmet: {} {} {} [{}]\nseq: {} issued at {} valid from {}\nchange: {} geo: {}\n",
            or_null(self.firname()),
            or_null(self.location_indicator_icao()),
            or_null(self.location_indicator_mwo()),
            self.uuid,
            self.sequence,
            or_null(self.issuedate.map(|d| d.to_rfc3339())),
            or_null(self.validdate.map(|d| d.to_rfc3339())),
            or_null(self.change.map(|c| c.code().to_string())),
            or_null(self.geojson.as_ref()),
        )
    }

    /// Field-by-field comparison, including identity.
    pub fn same_content(&self, other: &SigmetRecord) -> bool {
        self.uuid == other.uuid
            && self.firname == other.firname
            && self.location_indicator_icao == other.location_indicator_icao
            && self.location_indicator_mwo == other.location_indicator_mwo
            && self.sequence == other.sequence
            && self.status == other.status
            && self.cancels == other.cancels
            && self.phenomenon == other.phenomenon
            && self.obs_or_forecast == other.obs_or_forecast
            && self.level == other.level
            && self.movement == other.movement
            && self.change == other.change
            && self.forecast_position == other.forecast_position
            && self.issuedate == other.issuedate
            && self.validdate == other.validdate
            && self.validdate_end == other.validdate_end
            && self.geojson == other.geojson
    }

    /// Same hazard content as `other`, ignoring identity, numbering and status.
    pub fn same_hazard(&self, other: &SigmetRecord) -> bool {
        self.phenomenon == other.phenomenon
            && self.obs_or_forecast == other.obs_or_forecast
            && self.level == other.level
            && self.movement == other.movement
            && self.change == other.change
            && self.forecast_position == other.forecast_position
            && self.geojson == other.geojson
    }
}

impl PartialEq for SigmetRecord {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for SigmetRecord {}

impl std::hash::Hash for SigmetRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl fmt::Display for SigmetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A record that passed persist validation.
///
/// Only [`crate::lifecycle`] constructs this type. It has no mutators; the
/// phenomenon and hazard area are guaranteed present and the status is set.
/// To change anything, go back to a draft with [`ValidatedSigmet::into_draft`]
/// and validate again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSigmet(SigmetRecord);

impl ValidatedSigmet {
    pub(crate) fn new_unchecked(record: SigmetRecord) -> Self {
        Self(record)
    }

    pub fn record(&self) -> &SigmetRecord {
        &self.0
    }

    /// Give up the validated guarantee to edit the record.
    pub fn into_draft(self) -> SigmetRecord {
        self.0
    }

    pub fn lifecycle_status(&self) -> SigmetStatus {
        self.0.status.unwrap_or(SigmetStatus::Production)
    }

    pub fn hazard_area(&self) -> &HazardArea {
        self.0
            .geojson
            .as_ref()
            .expect("validated sigmet always carries a hazard area")
    }

    pub fn hazard(&self) -> &Phenomenon {
        self.0
            .phenomenon
            .as_ref()
            .expect("validated sigmet always carries a phenomenon")
    }
}

impl Deref for ValidatedSigmet {
    type Target = SigmetRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ValidatedSigmet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
