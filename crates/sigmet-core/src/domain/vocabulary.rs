//! Closed ICAO Annex 3 vocabularies used by SIGMET records.
//!
//! Every vocabulary is a Rust enum carrying its wire code and a
//! human-readable description. Lookups by code are total: an unrecognized
//! code yields [`Lookup::NotFound`] instead of an error, and callers decide
//! what to do with it.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Result of looking a code up in a closed vocabulary.
#[must_use = "an unrecognized code must be handled explicitly"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The code names a member of the vocabulary.
    Found(T),
    /// The code is not part of the vocabulary; the original text is kept.
    NotFound(String),
}

impl<T> Lookup<T> {
    /// Returns the member, discarding the unrecognized code.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// A closed table of coded values.
pub trait Vocabulary: Sized + Clone + 'static {
    /// Name of the vocabulary, used in error messages.
    const NAME: &'static str;

    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// Canonical short code (the wire value).
    fn code(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Find the member whose code equals `code`.
    fn lookup(code: &str) -> Lookup<Self> {
        Self::ALL
            .iter()
            .find(|member| member.code() == code)
            .cloned()
            .map(Lookup::Found)
            .unwrap_or_else(|| Lookup::NotFound(code.to_string()))
    }
}

/// Deserialize a closed-vocabulary member from its code, rejecting unknown codes.
fn deserialize_closed<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Vocabulary,
{
    let code = String::deserialize(deserializer)?;
    match T::lookup(&code) {
        Lookup::Found(value) => Ok(value),
        Lookup::NotFound(code) => Err(de::Error::custom(format!(
            "unknown {} code: {:?}",
            T::NAME,
            code
        ))),
    }
}

// ---------------------------------------------------------------------------
// Phenomenon
// ---------------------------------------------------------------------------

/// Hazard type reported by a SIGMET.
///
/// `Unknown` is never produced by [`Vocabulary::lookup`]; it only appears when
/// a stored record carries a code outside the table, so the code survives a
/// decode/encode cycle instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phenomenon {
    ObscTs,
    ObscTsgr,
    EmbdTs,
    EmbdTsgr,
    FrqTs,
    FrqTsgr,
    SqlTs,
    SqlTsgr,
    SevTurb,
    SevIce,
    SevIceFrza,
    SevMtw,
    HvyDs,
    HvySs,
    RdoactCld,
    Unknown(String),
}

impl Phenomenon {
    /// Identifier form used by older stored files (`EMBD_TS`).
    pub fn identifier(&self) -> &str {
        match self {
            Phenomenon::ObscTs => "OBSC_TS",
            Phenomenon::ObscTsgr => "OBSC_TSGR",
            Phenomenon::EmbdTs => "EMBD_TS",
            Phenomenon::EmbdTsgr => "EMBD_TSGR",
            Phenomenon::FrqTs => "FRQ_TS",
            Phenomenon::FrqTsgr => "FRQ_TSGR",
            Phenomenon::SqlTs => "SQL_TS",
            Phenomenon::SqlTsgr => "SQL_TSGR",
            Phenomenon::SevTurb => "SEV_TURB",
            Phenomenon::SevIce => "SEV_ICE",
            Phenomenon::SevIceFrza => "SEV_ICE_FRZA",
            Phenomenon::SevMtw => "SEV_MTW",
            Phenomenon::HvyDs => "HVY_DS",
            Phenomenon::HvySs => "HVY_SS",
            Phenomenon::RdoactCld => "RDOACT_CLD",
            Phenomenon::Unknown(code) => code,
        }
    }

    /// Resolve a code, keeping unrecognized codes as [`Phenomenon::Unknown`].
    ///
    /// Accepts both the short code (`EMBD TS`) and the identifier form
    /// (`EMBD_TS`).
    pub fn from_code_lossless(code: &str) -> Self {
        match Self::lookup(code) {
            Lookup::Found(phenomenon) => phenomenon,
            Lookup::NotFound(code) => Phenomenon::Unknown(code),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Phenomenon::Unknown(_))
    }

    /// Pick a phenomenon uniformly from the known table.
    #[cfg(any(test, feature = "test-support"))]
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        use rand::seq::SliceRandom;

        Self::ALL
            .choose(rng)
            .cloned()
            .unwrap_or(Phenomenon::ObscTs)
    }
}

impl Vocabulary for Phenomenon {
    const NAME: &'static str = "phenomenon";

    const ALL: &'static [Self] = &[
        Phenomenon::ObscTs,
        Phenomenon::ObscTsgr,
        Phenomenon::EmbdTs,
        Phenomenon::EmbdTsgr,
        Phenomenon::FrqTs,
        Phenomenon::FrqTsgr,
        Phenomenon::SqlTs,
        Phenomenon::SqlTsgr,
        Phenomenon::SevTurb,
        Phenomenon::SevIce,
        Phenomenon::SevIceFrza,
        Phenomenon::SevMtw,
        Phenomenon::HvyDs,
        Phenomenon::HvySs,
        Phenomenon::RdoactCld,
    ];

    fn code(&self) -> &str {
        match self {
            Phenomenon::ObscTs => "OBSC TS",
            Phenomenon::ObscTsgr => "OBSC TSGR",
            Phenomenon::EmbdTs => "EMBD TS",
            Phenomenon::EmbdTsgr => "EMBD TSGR",
            Phenomenon::FrqTs => "FRQ TS",
            Phenomenon::FrqTsgr => "FRQ TSGR",
            Phenomenon::SqlTs => "SQL TS",
            Phenomenon::SqlTsgr => "SQL TSGR",
            Phenomenon::SevTurb => "SEV TURB",
            Phenomenon::SevIce => "SEV ICE",
            Phenomenon::SevIceFrza => "SEV ICE (FRZA)",
            Phenomenon::SevMtw => "SEV MTW",
            Phenomenon::HvyDs => "HVY DS",
            Phenomenon::HvySs => "HVY SS",
            Phenomenon::RdoactCld => "RDOACT CLD",
            Phenomenon::Unknown(code) => code,
        }
    }

    fn description(&self) -> &str {
        match self {
            Phenomenon::ObscTs => "Obscured Thunderstorms",
            Phenomenon::ObscTsgr => "Obscured Thunderstorms with hail",
            Phenomenon::EmbdTs => "Embedded Thunderstorms",
            Phenomenon::EmbdTsgr => "Embedded Thunderstorms with hail",
            Phenomenon::FrqTs => "Frequent Thunderstorms",
            Phenomenon::FrqTsgr => "Frequent Thunderstorms with hail",
            Phenomenon::SqlTs => "Squall line",
            Phenomenon::SqlTsgr => "Squall line with hail",
            Phenomenon::SevTurb => "Severe Turbulence",
            Phenomenon::SevIce => "Severe Icing",
            Phenomenon::SevIceFrza => "Severe Icing with Freezing Rain",
            Phenomenon::SevMtw => "Severe Mountain Wave",
            Phenomenon::HvyDs => "Heavy Duststorm",
            Phenomenon::HvySs => "Heavy Sandstorm",
            Phenomenon::RdoactCld => "Radioactive Cloud",
            Phenomenon::Unknown(_) => "Unknown phenomenon",
        }
    }

    fn lookup(code: &str) -> Lookup<Self> {
        Self::ALL
            .iter()
            .find(|p| p.code() == code || p.identifier() == code)
            .cloned()
            .map(Lookup::Found)
            .unwrap_or_else(|| Lookup::NotFound(code.to_string()))
    }
}

impl fmt::Display for Phenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Phenomenon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Phenomenon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Phenomenon::from_code_lossless(&code))
    }
}

// ---------------------------------------------------------------------------
// Level unit
// ---------------------------------------------------------------------------

/// Unit of a vertical level bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigmetLevelUnit {
    Ft,
    Fl,
    Sfc,
    M,
    Top,
    TopAbv,
}

impl Vocabulary for SigmetLevelUnit {
    const NAME: &'static str = "level unit";

    const ALL: &'static [Self] = &[
        SigmetLevelUnit::Ft,
        SigmetLevelUnit::Fl,
        SigmetLevelUnit::Sfc,
        SigmetLevelUnit::M,
        SigmetLevelUnit::Top,
        SigmetLevelUnit::TopAbv,
    ];

    fn code(&self) -> &str {
        match self {
            SigmetLevelUnit::Ft => "FT",
            SigmetLevelUnit::Fl => "FL",
            SigmetLevelUnit::Sfc => "SFC",
            SigmetLevelUnit::M => "M",
            SigmetLevelUnit::Top => "TOP",
            SigmetLevelUnit::TopAbv => "TOP_ABV",
        }
    }

    fn description(&self) -> &str {
        match self {
            SigmetLevelUnit::Ft => "Feet",
            SigmetLevelUnit::Fl => "Flight level",
            SigmetLevelUnit::Sfc => "Surface",
            SigmetLevelUnit::M => "Metres",
            SigmetLevelUnit::Top => "Top",
            SigmetLevelUnit::TopAbv => "Top above",
        }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Compass direction of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigmetDirection {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
}

impl Vocabulary for SigmetDirection {
    const NAME: &'static str = "direction";

    const ALL: &'static [Self] = &[
        SigmetDirection::N,
        SigmetDirection::Nne,
        SigmetDirection::Ne,
        SigmetDirection::Ene,
        SigmetDirection::E,
        SigmetDirection::Ese,
        SigmetDirection::Se,
        SigmetDirection::Sse,
        SigmetDirection::S,
        SigmetDirection::Ssw,
        SigmetDirection::Sw,
        SigmetDirection::Wsw,
        SigmetDirection::W,
        SigmetDirection::Wnw,
    ];

    fn code(&self) -> &str {
        match self {
            SigmetDirection::N => "N",
            SigmetDirection::Nne => "NNE",
            SigmetDirection::Ne => "NE",
            SigmetDirection::Ene => "ENE",
            SigmetDirection::E => "E",
            SigmetDirection::Ese => "ESE",
            SigmetDirection::Se => "SE",
            SigmetDirection::Sse => "SSE",
            SigmetDirection::S => "S",
            SigmetDirection::Ssw => "SSW",
            SigmetDirection::Sw => "SW",
            SigmetDirection::Wsw => "WSW",
            SigmetDirection::W => "W",
            SigmetDirection::Wnw => "WNW",
        }
    }

    fn description(&self) -> &str {
        match self {
            SigmetDirection::N => "North",
            SigmetDirection::Nne => "North-northeast",
            SigmetDirection::Ne => "Northeast",
            SigmetDirection::Ene => "East-northeast",
            SigmetDirection::E => "East",
            SigmetDirection::Ese => "East-southeast",
            SigmetDirection::Se => "Southeast",
            SigmetDirection::Sse => "South-southeast",
            SigmetDirection::S => "South",
            SigmetDirection::Ssw => "South-southwest",
            SigmetDirection::Sw => "Southwest",
            SigmetDirection::Wsw => "West-southwest",
            SigmetDirection::W => "West",
            SigmetDirection::Wnw => "West-northwest",
        }
    }
}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// Expected evolution of the hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigmetChange {
    Intsf,
    Wkn,
    Nc,
}

impl Vocabulary for SigmetChange {
    const NAME: &'static str = "change";

    const ALL: &'static [Self] = &[SigmetChange::Intsf, SigmetChange::Wkn, SigmetChange::Nc];

    fn code(&self) -> &str {
        match self {
            SigmetChange::Intsf => "INTSF",
            SigmetChange::Wkn => "WKN",
            SigmetChange::Nc => "NC",
        }
    }

    fn description(&self) -> &str {
        match self {
            SigmetChange::Intsf => "Intensifying",
            SigmetChange::Wkn => "Weakening",
            SigmetChange::Nc => "No change",
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a SIGMET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigmetStatus {
    Production,
    Cancelled,
    Published,
    Test,
}

impl SigmetStatus {
    /// Published and cancelled advisories are no longer editable.
    pub fn is_final(&self) -> bool {
        matches!(self, SigmetStatus::Published | SigmetStatus::Cancelled)
    }
}

impl Vocabulary for SigmetStatus {
    const NAME: &'static str = "status";

    const ALL: &'static [Self] = &[
        SigmetStatus::Production,
        SigmetStatus::Cancelled,
        SigmetStatus::Published,
        SigmetStatus::Test,
    ];

    fn code(&self) -> &str {
        match self {
            SigmetStatus::Production => "PRODUCTION",
            SigmetStatus::Cancelled => "CANCELLED",
            SigmetStatus::Published => "PUBLISHED",
            SigmetStatus::Test => "TEST",
        }
    }

    fn description(&self) -> &str {
        match self {
            SigmetStatus::Production => "Production",
            SigmetStatus::Cancelled => "Cancelled",
            SigmetStatus::Published => "Published",
            SigmetStatus::Test => "Test",
        }
    }
}

macro_rules! closed_vocabulary_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.code())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    deserialize_closed(deserializer)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.code())
                }
            }
        )*
    };
}

closed_vocabulary_serde!(SigmetLevelUnit, SigmetDirection, SigmetChange, SigmetStatus);
