use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Timeline, WireMeasure, decode, elements, parse_timestamp, unit_in_payload};
use crate::{error::Result, units::Temperature};

/// A single current-conditions snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub date_time: DateTime<FixedOffset>,
    pub epoch_time: i64,
    pub synopsis: String,
    pub weather_icon: u32,
    pub is_day_time: bool,
    pub temperature: Temperature,
    pub link: String,
    pub mobile_link: String,
    #[serde(skip)]
    pub raw: Value,
}

impl Observation {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Self::map_payload(payload).map_err(unit_in_payload)
    }

    fn map_payload(payload: &Value) -> Result<Self> {
        let wire: WireObservation = decode(payload)?;
        let metric = wire.temperature.metric;

        Ok(Self {
            date_time: parse_timestamp(
                "LocalObservationDateTime",
                &wire.local_observation_date_time,
            )?,
            epoch_time: wire.epoch_time,
            synopsis: wire.weather_text,
            weather_icon: wire.weather_icon,
            is_day_time: wire.is_day_time,
            temperature: Temperature::from_tag(metric.value, &metric.unit)?,
            link: wire.link,
            mobile_link: wire.mobile_link,
            raw: payload.clone(),
        })
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {}",
            self.date_time.format("%Y-%m-%d %H:%M"),
            self.synopsis,
            self.temperature
        )
    }
}

/// Current conditions keyed by local observation time, in feed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentObs {
    pub observations: Timeline<Observation>,
    #[serde(skip)]
    pub raw: Value,
}

impl CurrentObs {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let mut observations = Timeline::default();
        for entry in elements(payload)? {
            let observation = Observation::from_payload(entry)?;
            let key = entry["LocalObservationDateTime"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            observations.push(key, observation);
        }

        Ok(Self {
            observations,
            raw: payload.clone(),
        })
    }
}

impl fmt::Display for CurrentObs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.observations.first() {
            Some((first, _)) => write!(f, "Current observations from {first}"),
            None => f.write_str("Current observations (empty)"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireTemperature {
    metric: WireMeasure,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireObservation {
    local_observation_date_time: String,
    epoch_time: i64,
    weather_text: String,
    weather_icon: u32,
    is_day_time: bool,
    temperature: WireTemperature,
    link: String,
    mobile_link: String,
}
