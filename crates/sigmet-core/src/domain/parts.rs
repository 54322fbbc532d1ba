//! Structured sub-values of a SIGMET: observation/forecast flag, vertical
//! extent and movement.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};

use super::vocabulary::{SigmetDirection, SigmetLevelUnit, Vocabulary};

/// Whether the hazard was observed or is forecast, with an optional time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObsOrForecast {
    Observed { at: Option<DateTime<Utc>> },
    Forecast { at: Option<DateTime<Utc>> },
}

impl ObsOrForecast {
    pub fn observed() -> Self {
        ObsOrForecast::Observed { at: None }
    }

    pub fn observed_at(at: DateTime<Utc>) -> Self {
        ObsOrForecast::Observed {
            at: Some(at.trunc_subsecs(0)),
        }
    }

    pub fn forecast() -> Self {
        ObsOrForecast::Forecast { at: None }
    }

    pub fn forecast_at(at: DateTime<Utc>) -> Self {
        ObsOrForecast::Forecast {
            at: Some(at.trunc_subsecs(0)),
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self, ObsOrForecast::Observed { .. })
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            ObsOrForecast::Observed { at } | ObsOrForecast::Forecast { at } => *at,
        }
    }

    /// Drop sub-second precision from the attached time.
    pub(crate) fn whole_seconds(self) -> Self {
        match self {
            ObsOrForecast::Observed { at } => ObsOrForecast::Observed {
                at: at.map(|t| t.trunc_subsecs(0)),
            },
            ObsOrForecast::Forecast { at } => ObsOrForecast::Forecast {
                at: at.map(|t| t.trunc_subsecs(0)),
            },
        }
    }
}

impl Default for ObsOrForecast {
    fn default() -> Self {
        Self::observed()
    }
}

/// One bound of a vertical extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmetLevelPart {
    pub value: f64,
    pub unit: SigmetLevelUnit,
}

impl SigmetLevelPart {
    pub fn new(unit: SigmetLevelUnit, value: f64) -> Self {
        Self { value, unit }
    }
}

impl fmt::Display for SigmetLevelPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.unit.code(), self.value)
    }
}

/// Vertical extent of the hazard: a single level or a layer between two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SigmetLevel {
    At(SigmetLevelPart),
    Between(SigmetLevelPart, SigmetLevelPart),
}

impl SigmetLevel {
    pub fn lower(&self) -> &SigmetLevelPart {
        match self {
            SigmetLevel::At(part) | SigmetLevel::Between(part, _) => part,
        }
    }

    pub fn upper(&self) -> Option<&SigmetLevelPart> {
        match self {
            SigmetLevel::At(_) => None,
            SigmetLevel::Between(_, upper) => Some(upper),
        }
    }
}

/// Movement of the hazard area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigmetMovement {
    #[default]
    Stationary,
    /// Direction of travel and speed in knots.
    Moving { direction: SigmetDirection, speed: u32 },
}

impl SigmetMovement {
    pub fn moving(direction: SigmetDirection, speed: u32) -> Self {
        SigmetMovement::Moving { direction, speed }
    }

    pub fn is_stationary(&self) -> bool {
        matches!(self, SigmetMovement::Stationary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_obs_or_forecast_defaults_to_observed_without_time() {
        let value = ObsOrForecast::default();
        assert!(value.is_observed());
        assert!(value.time().is_none());
    }

    #[test]
    fn test_forecast_keeps_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let value = ObsOrForecast::forecast_at(at);
        assert!(!value.is_observed());
        assert_eq!(value.time(), Some(at));
    }

    #[test]
    fn test_level_bounds() {
        let single = SigmetLevel::At(SigmetLevelPart::new(SigmetLevelUnit::Fl, 100.0));
        assert_eq!(single.lower().value, 100.0);
        assert!(single.upper().is_none());

        let layer = SigmetLevel::Between(
            SigmetLevelPart::new(SigmetLevelUnit::Sfc, 0.0),
            SigmetLevelPart::new(SigmetLevelUnit::Fl, 250.0),
        );
        assert_eq!(layer.lower().unit, SigmetLevelUnit::Sfc);
        assert_eq!(layer.upper().map(|p| p.unit), Some(SigmetLevelUnit::Fl));
    }

    #[test]
    fn test_movement_default_is_stationary() {
        assert!(SigmetMovement::default().is_stationary());
        assert!(!SigmetMovement::moving(SigmetDirection::Ne, 20).is_stationary());
    }
}
