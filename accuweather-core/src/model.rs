//! Domain objects built from decoded AccuWeather payloads.
//!
//! Wire shapes are private serde structs deserialised straight from a borrowed
//! [`serde_json::Value`]; a field the provider omitted surfaces as
//! [`AccuweatherError::MalformedResponse`] and aborts the whole object.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{AccuweatherError, Result};

pub mod air_quality;
pub mod forecast;
pub mod location;
pub mod observation;

pub use air_quality::{AirQuality, AirQualityFactor};
pub use forecast::{
    DailyForecast, DailyForecasts, DegreeDaySummary, Forecast, Headline, Hemiurnal, HourlyForecast,
    HourlyForecasts,
};
pub use location::{AdministrativeArea, Country, Location, LocationSet, Region, TimeZone};
pub use observation::{CurrentObs, Observation};

/// Entries keyed by a timestamp string, kept in the order the feed delivered them.
///
/// Duplicate keys are kept; [`Timeline::get`] returns the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Timeline<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Timeline<V> {
    pub(crate) fn push(&mut self, key: String, value: V) {
        self.entries.push((key, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&str, &V)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn last(&self) -> Option<(&str, &V)> {
        self.entries.last().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> TimelineIter<'_, V> {
        TimelineIter {
            inner: self.entries.iter(),
        }
    }
}

/// Borrowing iterator over `(key, value)` pairs in arrival order.
#[derive(Debug, Clone)]
pub struct TimelineIter<'a, V> {
    inner: std::slice::Iter<'a, (String, V)>,
}

impl<'a, V> Iterator for TimelineIter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for TimelineIter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> ExactSizeIterator for TimelineIter<'_, V> {}

impl<'a, V> IntoIterator for &'a Timeline<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = TimelineIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Serialize> Serialize for Timeline<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Resolve a single-location lookup (geoposition, IP, postcode, key).
///
/// The provider answers with either one object or a one-element array.
pub fn map_location(query: &str, payload: &Value) -> Result<Location> {
    let no_results = || AccuweatherError::NoResults {
        query: query.to_string(),
    };

    match payload {
        Value::Array(items) => Location::from_payload(items.first().ok_or_else(no_results)?),
        Value::Object(fields) if fields.is_empty() => Err(no_results()),
        Value::Object(_) => Location::from_payload(payload),
        Value::Null => Err(no_results()),
        other => Err(AccuweatherError::MalformedResponse(format!(
            "expected a location object or array, got {other}"
        ))),
    }
}

/// Collect free-text search results, preserving provider order.
pub fn map_location_set(
    query: &str,
    country: Option<&str>,
    payload: &Value,
) -> Result<LocationSet> {
    let items = elements(payload)?;
    if items.is_empty() {
        return Err(AccuweatherError::NoResults {
            query: query.to_string(),
        });
    }

    let results = items
        .iter()
        .map(Location::from_payload)
        .collect::<Result<Vec<_>>>()?;
    Ok(LocationSet::new(results, query, country.map(str::to_string)))
}

/// Map a forecast payload according to the horizon token it was requested with
/// (`"12h"` yields hourly forecasts, `"5d"` daily ones).
pub fn map_forecast(token: &str, payload: &Value) -> Result<Forecast> {
    if token.ends_with('h') {
        HourlyForecasts::from_payload(payload).map(Forecast::Hourly)
    } else if token.ends_with('d') {
        DailyForecasts::from_payload(payload).map(Forecast::Daily)
    } else {
        Err(AccuweatherError::UnsupportedHorizon(token.to_string()))
    }
}

pub fn map_current_conditions(payload: &Value) -> Result<CurrentObs> {
    CurrentObs::from_payload(payload)
}

pub fn map_air_quality(payload: &Value) -> Result<AirQuality> {
    AirQuality::from_payload(payload)
}

pub(crate) fn decode<'a, T: Deserialize<'a>>(payload: &'a Value) -> Result<T> {
    Ok(T::deserialize(payload)?)
}

pub(crate) fn elements(payload: &Value) -> Result<&[Value]> {
    payload.as_array().map(Vec::as_slice).ok_or_else(|| {
        AccuweatherError::MalformedResponse(format!("expected an array, got {}", kind_of(payload)))
    })
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| AccuweatherError::MalformedResponse(format!("{field} '{value}': {e}")))
}

/// An unknown unit tag inside a response is a payload defect, not bad caller input.
pub(crate) fn unit_in_payload(err: AccuweatherError) -> AccuweatherError {
    match err {
        AccuweatherError::InvalidUnit { quantity, unit } => {
            let msg = format!("unknown {quantity} unit '{unit}' in payload");
            AccuweatherError::MalformedResponse(msg)
        }
        other => other,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `{"Value": .., "Unit": ..}` as used by every measured quantity.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireMeasure {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireRange {
    pub minimum: WireMeasure,
    pub maximum: WireMeasure,
}
