use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Timeline, WireMeasure, WireRange, decode, elements, parse_timestamp, unit_in_payload};
use crate::{
    error::{AccuweatherError, Result},
    units::{Ceiling, Precipitation, Snow, Temperature, Wind},
};

/// Result of a forecast request; the horizon decides which variant comes back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "granularity", rename_all = "lowercase")]
pub enum Forecast {
    Hourly(HourlyForecasts),
    Daily(DailyForecasts),
}

/// Day or night half of a daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hemiurnal {
    pub id: Uuid,
    pub synopsis: String,
    pub phrase: String,
    pub snow: Snow,
    pub rain: Precipitation,
    pub ice: Precipitation,
    pub total_liquid: Precipitation,
    pub wind: Wind,
    pub wind_gust: Option<Wind>,
    pub cloud_cover: u8,
    pub hours_of_precipitation: f64,
    pub hours_of_rain: f64,
    pub rain_probability: u8,
    pub snow_probability: u8,
    pub ice_probability: u8,
    pub thunderstorm_probability: u8,
    pub precipitation_probability: u8,
}

impl Hemiurnal {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Self::map_payload(payload).map_err(unit_in_payload)
    }

    fn map_payload(payload: &Value) -> Result<Self> {
        let wire: WireHemiurnal = decode(payload)?;
        let wind = wire.wind.into_wind("Wind", None)?;
        let wind_gust = wire
            .wind_gust
            .map(|gust| gust.into_wind("WindGust", Some(wind.heading())))
            .transpose()?;

        Ok(Self {
            id: Uuid::new_v4(),
            synopsis: wire.long_phrase,
            phrase: wire.short_phrase,
            snow: Snow::from_tag(wire.snow.value, &wire.snow.unit)?,
            rain: precipitation(&wire.rain)?,
            ice: precipitation(&wire.ice)?,
            total_liquid: precipitation(&wire.total_liquid)?,
            wind,
            wind_gust,
            cloud_cover: wire.cloud_cover,
            hours_of_precipitation: wire.hours_of_precipitation,
            hours_of_rain: wire.hours_of_rain,
            rain_probability: wire.rain_probability,
            snow_probability: wire.snow_probability,
            ice_probability: wire.ice_probability,
            thunderstorm_probability: wire.thunderstorm_probability,
            precipitation_probability: wire.precipitation_probability,
        })
    }
}

impl fmt::Display for Hemiurnal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (precipitation {}%, wind {})",
            self.synopsis, self.precipitation_probability, self.wind
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DegreeDaySummary {
    pub heating: Temperature,
    pub cooling: Temperature,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: DateTime<FixedOffset>,
    pub epoch_date: i64,
    pub temp_min: Temperature,
    pub temp_max: Temperature,
    pub realfeel_temp_min: Temperature,
    pub realfeel_temp_max: Temperature,
    pub realfeel_shade_temp_min: Temperature,
    pub realfeel_shade_temp_max: Temperature,
    pub hours_of_sun: f64,
    pub degree_day_summary: Option<DegreeDaySummary>,
    pub day: Hemiurnal,
    pub night: Hemiurnal,
    #[serde(skip)]
    pub raw: Value,
}

impl DailyForecast {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Self::map_payload(payload).map_err(unit_in_payload)
    }

    fn map_payload(payload: &Value) -> Result<Self> {
        let wire: WireDailyForecast = decode(payload)?;
        let (temp_min, temp_max) = temperature_range(&wire.temperature)?;
        let (realfeel_temp_min, realfeel_temp_max) =
            temperature_range(&wire.real_feel_temperature)?;
        let (realfeel_shade_temp_min, realfeel_shade_temp_max) =
            temperature_range(&wire.real_feel_temperature_shade)?;

        let degree_day_summary = wire
            .degree_day_summary
            .map(|dd| -> Result<DegreeDaySummary> {
                Ok(DegreeDaySummary {
                    heating: Temperature::from_tag(dd.heating.value, &dd.heating.unit)?,
                    cooling: Temperature::from_tag(dd.cooling.value, &dd.cooling.unit)?,
                })
            })
            .transpose()?;

        Ok(Self {
            date: parse_timestamp("Date", &wire.date)?,
            epoch_date: wire.epoch_date,
            temp_min,
            temp_max,
            realfeel_temp_min,
            realfeel_temp_max,
            realfeel_shade_temp_min,
            realfeel_shade_temp_max,
            hours_of_sun: wire.hours_of_sun,
            degree_day_summary,
            day: Hemiurnal::from_payload(&wire.day)?,
            night: Hemiurnal::from_payload(&wire.night)?,
            raw: payload.clone(),
        })
    }

    /// ISO week of the forecast day, taken from the epoch date in UTC.
    pub fn week_of_year(&self) -> Option<u32> {
        DateTime::<Utc>::from_timestamp(self.epoch_date, 0).map(|dt| dt.iso_week().week())
    }
}

impl fmt::Display for DailyForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.0}..{:.0} °C, day: {}, night: {}",
            self.date.format("%Y-%m-%d"),
            self.temp_min.celsius(),
            self.temp_max.celsius(),
            self.day.synopsis,
            self.night.synopsis
        )
    }
}

/// Provider summary spanning a multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub effective_date: DateTime<FixedOffset>,
    pub effective_epoch_date: i64,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub end_epoch_date: Option<i64>,
    pub severity: i32,
    pub text: String,
    pub category: Option<String>,
    pub link: String,
    pub mobile_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecasts {
    pub headline: Headline,
    /// Keyed by `YYYY-MM-DD`.
    pub forecasts: Timeline<DailyForecast>,
    #[serde(skip)]
    pub raw: Value,
}

impl DailyForecasts {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let wire: WireDailyForecasts = decode(payload)?;
        let headline = Headline {
            effective_date: parse_timestamp("EffectiveDate", &wire.headline.effective_date)?,
            effective_epoch_date: wire.headline.effective_epoch_date,
            end_date: wire
                .headline
                .end_date
                .as_deref()
                .map(|d| parse_timestamp("EndDate", d))
                .transpose()?,
            end_epoch_date: wire.headline.end_epoch_date,
            severity: wire.headline.severity,
            text: wire.headline.text,
            category: wire.headline.category,
            link: wire.headline.link,
            mobile_link: wire.headline.mobile_link,
        };

        let mut forecasts = Timeline::default();
        for entry in &wire.daily_forecasts {
            let forecast = DailyForecast::from_payload(entry)?;
            forecasts.push(forecast.date.format("%Y-%m-%d").to_string(), forecast);
        }

        Ok(Self {
            headline,
            forecasts,
            raw: payload.clone(),
        })
    }
}

impl fmt::Display for DailyForecasts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.forecasts.first(), self.forecasts.last()) {
            (Some((first, _)), Some((last, _))) => {
                write!(f, "Daily forecasts from {first} to {last}")
            }
            _ => f.write_str("Daily forecasts (empty)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub date_time: DateTime<FixedOffset>,
    pub epoch_date_time: i64,
    pub weather_icon: u32,
    pub icon_phrase: String,
    pub is_daylight: bool,
    pub temperature: Temperature,
    pub realfeel_temperature: Temperature,
    pub wet_bulb_temperature: Temperature,
    pub dew_point: Temperature,
    pub wind: Wind,
    pub wind_gust: Option<Wind>,
    pub relative_humidity: u8,
    pub cloud_cover: u8,
    pub ceiling: Ceiling,
    pub uv_index: u8,
    pub uv_index_text: String,
    pub rain: Precipitation,
    pub ice: Precipitation,
    pub snow: Snow,
    pub total_liquid: Precipitation,
    pub precipitation_probability: u8,
    pub rain_probability: u8,
    pub snow_probability: u8,
    pub ice_probability: u8,
    pub link: String,
    pub mobile_link: String,
    #[serde(skip)]
    pub raw: Value,
}

impl HourlyForecast {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Self::map_payload(payload).map_err(unit_in_payload)
    }

    fn map_payload(payload: &Value) -> Result<Self> {
        let wire: WireHourlyForecast = decode(payload)?;
        let wind = wire.wind.into_wind("Wind", None)?;
        let wind_gust = wire
            .wind_gust
            .map(|gust| gust.into_wind("WindGust", Some(wind.heading())))
            .transpose()?;

        Ok(Self {
            date_time: parse_timestamp("DateTime", &wire.date_time)?,
            epoch_date_time: wire.epoch_date_time,
            weather_icon: wire.weather_icon,
            icon_phrase: wire.icon_phrase,
            is_daylight: wire.is_daylight,
            temperature: temperature(&wire.temperature)?,
            realfeel_temperature: temperature(&wire.real_feel_temperature)?,
            wet_bulb_temperature: temperature(&wire.wet_bulb_temperature)?,
            dew_point: temperature(&wire.dew_point)?,
            wind,
            wind_gust,
            relative_humidity: wire.relative_humidity,
            cloud_cover: wire.cloud_cover,
            ceiling: Ceiling::from_tag(wire.ceiling.value, &wire.ceiling.unit)?,
            uv_index: wire.uv_index,
            uv_index_text: wire.uv_index_text,
            rain: precipitation(&wire.rain)?,
            ice: precipitation(&wire.ice)?,
            snow: Snow::from_tag(wire.snow.value, &wire.snow.unit)?,
            total_liquid: precipitation(&wire.total_liquid)?,
            precipitation_probability: wire.precipitation_probability,
            rain_probability: wire.rain_probability,
            snow_probability: wire.snow_probability,
            ice_probability: wire.ice_probability,
            link: wire.link,
            mobile_link: wire.mobile_link,
            raw: payload.clone(),
        })
    }
}

impl fmt::Display for HourlyForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {}, wind {}, precipitation {}%",
            self.date_time.format("%Y-%m-%d %H:%M"),
            self.icon_phrase,
            self.temperature,
            self.wind,
            self.precipitation_probability
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecasts {
    /// Keyed by the provider's `DateTime` string.
    pub forecasts: Timeline<HourlyForecast>,
    #[serde(skip)]
    pub raw: Value,
}

impl HourlyForecasts {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let mut forecasts = Timeline::default();
        for entry in elements(payload)? {
            let forecast = HourlyForecast::from_payload(entry)?;
            let key = entry["DateTime"].as_str().unwrap_or_default().to_string();
            forecasts.push(key, forecast);
        }

        Ok(Self {
            forecasts,
            raw: payload.clone(),
        })
    }
}

impl fmt::Display for HourlyForecasts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.forecasts.first() {
            Some((first, _)) => write!(
                f,
                "Hourly forecasts from {first} ({} hours)",
                self.forecasts.len()
            ),
            None => f.write_str("Hourly forecasts (empty)"),
        }
    }
}

fn temperature(measure: &WireMeasure) -> Result<Temperature> {
    Temperature::from_tag(measure.value, &measure.unit)
}

fn precipitation(measure: &WireMeasure) -> Result<Precipitation> {
    Precipitation::from_tag(measure.value, &measure.unit)
}

fn temperature_range(range: &WireRange) -> Result<(Temperature, Temperature)> {
    Ok((temperature(&range.minimum)?, temperature(&range.maximum)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDirection {
    degrees: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireWind {
    speed: WireMeasure,
    direction: Option<WireDirection>,
}

impl WireWind {
    /// A reading without a direction takes `fallback_heading` (the companion
    /// wind's heading); with neither the payload is malformed.
    fn into_wind(self, field: &str, fallback_heading: Option<f64>) -> Result<Wind> {
        let heading = self
            .direction
            .map(|d| d.degrees)
            .or(fallback_heading)
            .ok_or_else(|| {
                AccuweatherError::MalformedResponse(format!("missing field `Direction` in {field}"))
            })?;

        Wind::from_tag(self.speed.value, &self.speed.unit, heading)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireHemiurnal {
    long_phrase: String,
    short_phrase: String,
    snow: WireMeasure,
    rain: WireMeasure,
    ice: WireMeasure,
    total_liquid: WireMeasure,
    wind: WireWind,
    wind_gust: Option<WireWind>,
    cloud_cover: u8,
    hours_of_precipitation: f64,
    hours_of_rain: f64,
    rain_probability: u8,
    snow_probability: u8,
    ice_probability: u8,
    thunderstorm_probability: u8,
    precipitation_probability: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDegreeDaySummary {
    heating: WireMeasure,
    cooling: WireMeasure,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDailyForecast {
    date: String,
    epoch_date: i64,
    temperature: WireRange,
    real_feel_temperature: WireRange,
    real_feel_temperature_shade: WireRange,
    hours_of_sun: f64,
    degree_day_summary: Option<WireDegreeDaySummary>,
    day: Value,
    night: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireHeadline {
    effective_date: String,
    effective_epoch_date: i64,
    end_date: Option<String>,
    end_epoch_date: Option<i64>,
    severity: i32,
    text: String,
    category: Option<String>,
    link: String,
    mobile_link: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDailyForecasts {
    headline: WireHeadline,
    daily_forecasts: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireHourlyForecast {
    date_time: String,
    epoch_date_time: i64,
    weather_icon: u32,
    icon_phrase: String,
    is_daylight: bool,
    temperature: WireMeasure,
    real_feel_temperature: WireMeasure,
    wet_bulb_temperature: WireMeasure,
    dew_point: WireMeasure,
    wind: WireWind,
    wind_gust: Option<WireWind>,
    relative_humidity: u8,
    cloud_cover: u8,
    ceiling: WireMeasure,
    #[serde(rename = "UVIndex")]
    uv_index: u8,
    #[serde(rename = "UVIndexText")]
    uv_index_text: String,
    rain: WireMeasure,
    ice: WireMeasure,
    snow: WireMeasure,
    total_liquid: WireMeasure,
    precipitation_probability: u8,
    rain_probability: u8,
    snow_probability: u8,
    ice_probability: u8,
    link: String,
    mobile_link: String,
}
