//! Synthetic SIGMET records for tests and demos.

use std::sync::atomic::{AtomicI32, Ordering};

use chrono::Utc;

use crate::domain::parts::{ObsOrForecast, SigmetLevel, SigmetLevelPart, SigmetMovement};
use crate::domain::sigmet::SigmetRecord;
use crate::domain::vocabulary::{Phenomenon, SigmetChange, SigmetLevelUnit};

/// A FeatureCollection with one unclosed eight-point polygon over the
/// Netherlands and some free-form properties.
pub const TEST_GEOJSON: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[4.44963571205923,52.75852934878266],[1.4462013467168233,52.00458561642831],[5.342222631879865,50.69927379063084],[7.754619712476178,50.59854892065259],[8.731640530117685,52.3196364467871],[8.695454573908739,53.50720041878871],[6.847813968390116,54.08633053026368],[3.086939481359807,53.90252679590722]]]},"properties":{"prop0":"value0","prop1":{"this":"that"}}}]}"#;

static NEXT_SEQUENCE: AtomicI32 = AtomicI32::new(0);

/// A complete Amsterdam FIR record with a random phenomenon, observed,
/// stationary at FL100 with no change, valid from now, and a fresh
/// sequence number.
pub fn random_sigmet() -> SigmetRecord {
    let mut record = SigmetRecord::draft("AMSTERDAM FIR", "EHAA", "EHDB");
    record.set_phenomenon(Some(Phenomenon::random(&mut rand::thread_rng())));
    record.set_validdate(Some(Utc::now()));
    record.set_sequence(NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed));
    record.set_obs_or_forecast(Some(ObsOrForecast::observed()));
    record.set_level(Some(SigmetLevel::At(SigmetLevelPart::new(
        SigmetLevelUnit::Fl,
        100.0,
    ))));
    record.set_change(Some(SigmetChange::Nc));
    record.set_movement(Some(SigmetMovement::Stationary));
    record
        .set_geo_from_str(TEST_GEOJSON)
        .expect("TEST_GEOJSON is a valid hazard area");
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::validate_for_persist;

    #[test]
    fn test_random_sigmet_is_publishable() {
        let record = random_sigmet();
        assert!(record.phenomenon().map_or(false, Phenomenon::is_known));
        assert_eq!(record.firname(), Some("AMSTERDAM FIR"));
        assert!(validate_for_persist(&record).is_ok());
    }

    #[test]
    fn test_random_sigmet_has_validity_start() {
        let record = random_sigmet();
        let start = record.validdate().expect("validdate");
        assert!(start <= Utc::now());
        assert_eq!(start.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_random_sigmets_are_distinct() {
        let a = random_sigmet();
        let b = random_sigmet();
        assert_ne!(a, b);
        assert!(b.sequence() > a.sequence());
    }

    #[test]
    fn test_test_geojson_keeps_properties() {
        let record = random_sigmet();
        let area = record.geojson().expect("area");
        assert_eq!(area.outer_rings()[0].len(), 8);
        assert_eq!(
            area.as_value()["features"][0]["properties"]["prop1"]["this"],
            "that"
        );
    }
}
