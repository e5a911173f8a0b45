//! Human-readable output.

use accuweather_core::{AirQuality, CurrentObs, Forecast, Location, LocationSet};
use serde::Serialize;

/// Print `value` as pretty JSON, or through `human` otherwise.
pub fn emit<T: Serialize>(json: bool, value: &T, human: fn(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

pub fn location(loc: &Location) {
    println!("{loc}");
    println!("  Key:       {}", loc.key);
    println!("  Position:  {:.4}, {:.4}", loc.latitude, loc.longitude);
    println!("  Country:   {}", loc.country);
    println!("  Area:      {}", loc.administrative_area);
    println!(
        "  Time zone: {} (GMT{:+})",
        loc.time_zone.name, loc.time_zone.gmt_offset
    );
}

pub fn location_set(set: &LocationSet) {
    println!("{set}");
    for (i, loc) in set.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}, {}",
            i + 1,
            loc.key,
            loc.english_name,
            loc.country.english_name
        );
    }
}

pub fn observations(obs: &CurrentObs) {
    println!("{obs}");
    for observation in obs.observations.values() {
        println!("  {observation}");
    }
}

pub fn forecast(forecast: &Forecast) {
    match forecast {
        Forecast::Hourly(hourly) => {
            println!("{hourly}");
            for entry in hourly.forecasts.values() {
                println!("  {entry}");
            }
        }
        Forecast::Daily(daily) => {
            println!("{daily}");
            println!("  {}", daily.headline.text);
            for entry in daily.forecasts.values() {
                println!("  {entry}");
            }
        }
    }
}

pub fn air_quality(aq: &AirQuality) {
    if aq.is_empty() {
        println!("No air quality readings.");
        return;
    }
    for factor in aq.iter() {
        println!(
            "  {:<12} {:>8.1}  {} ({})",
            factor.name, factor.value, factor.category, factor.band
        );
    }
}
