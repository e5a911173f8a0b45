//! Typed arguments for the connection's operations.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::{
    endpoint::Operation,
    error::{AccuweatherError, Result},
    model::Location,
};

/// Which location a per-location request is about: a bare key or a
/// previously resolved [`Location`].
#[derive(Debug, Clone, Copy)]
pub enum LocationTarget<'a> {
    Key(u64),
    Location(&'a Location),
}

impl LocationTarget<'_> {
    pub fn key(&self) -> Result<u64> {
        match self {
            LocationTarget::Key(key) => Ok(*key),
            LocationTarget::Location(location) => location.numeric_key(),
        }
    }
}

impl From<u64> for LocationTarget<'_> {
    fn from(key: u64) -> Self {
        LocationTarget::Key(key)
    }
}

impl<'a> From<&'a Location> for LocationTarget<'a> {
    fn from(location: &'a Location) -> Self {
        LocationTarget::Location(location)
    }
}

macro_rules! horizon {
    ($(#[$meta:meta])* $ty:ident { $($variant:ident => $token:literal $(| $alias:literal)*, $op:ident;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($variant,)+
        }

        impl $ty {
            pub const fn all() -> &'static [$ty] {
                &[$($ty::$variant,)+]
            }

            pub fn token(&self) -> &'static str {
                match self {
                    $($ty::$variant => $token,)+
                }
            }

            pub fn operation(&self) -> Operation {
                match self {
                    $($ty::$variant => Operation::$op,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = AccuweatherError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($token $(| $alias)* => Ok($ty::$variant),)+
                    _ => Err(AccuweatherError::UnsupportedHorizon(s.to_string())),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        }
    };
}

horizon! {
    /// Current conditions: now, or the past 6 or 24 hours.
    ObservationHorizon {
        Now => "now", CurrentConditions;
        Past6Hours => "6h", CurrentConditions6h;
        Past24Hours => "24h", CurrentConditions24h;
    }
}

horizon! {
    /// Forecast lead time.
    ForecastHorizon {
        Hours1 => "1h", Forecast1h;
        Hours12 => "12h", Forecast12h;
        Hours24 => "24h", Forecast24h;
        Hours72 => "72h", Forecast72h;
        Hours120 => "120h", Forecast120h;
        Hours240 => "240h", Forecast240h;
        Days1 => "1d", Forecast1d;
        Days5 => "5d", Forecast5d;
        Days10 => "10d", Forecast10d;
        Days15 => "15d", Forecast15d;
        Days25 => "25d", Forecast25d;
        Days45 => "45d", Forecast45d;
    }
}

horizon! {
    /// How far ahead weather alerts are requested.
    AlertHorizon {
        Days1 => "1d" | "1", Alarms1d;
        Days5 => "5d" | "5", Alarms5d;
        Days10 => "10d" | "10", Alarms10d;
        Days15 => "15d" | "15", Alarms15d;
        Days25 => "25d" | "25", Alarms25d;
    }
}

horizon! {
    AirQualityPeriod {
        Current => "current", AirQualityCurrent;
        Yesterday => "yesterday", AirQualityYesterday;
    }
}

impl ForecastHorizon {
    pub fn is_hourly(&self) -> bool {
        self.token().ends_with('h')
    }
}

impl TryFrom<u32> for AlertHorizon {
    type Error = AccuweatherError;

    fn try_from(days: u32) -> Result<Self> {
        days.to_string().parse()
    }
}

/// Kind of climatology data requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClimoKind {
    Actuals,
    Records,
    Normals,
}

impl ClimoKind {
    pub(crate) fn operation(&self, period: &ClimoPeriod) -> Operation {
        let by_date = matches!(period, ClimoPeriod::Date(_));
        match (self, by_date) {
            (ClimoKind::Actuals, true) => Operation::ClimoActualsDate,
            (ClimoKind::Actuals, false) => Operation::ClimoActualsRange,
            (ClimoKind::Records, true) => Operation::ClimoRecordsDate,
            (ClimoKind::Records, false) => Operation::ClimoRecordsRange,
            (ClimoKind::Normals, true) => Operation::ClimoNormalsDate,
            (ClimoKind::Normals, false) => Operation::ClimoNormalsRange,
        }
    }
}

/// A single day or an inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimoPeriod {
    Date(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
}

impl ClimoPeriod {
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AccuweatherError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(ClimoPeriod::Range { start, end })
    }
}
