//! Endpoint registry: maps logical operation names to URL templates.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AccuweatherError, Result};

/// Which AccuWeather host the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVariant {
    #[default]
    Development,
    Production,
}

impl ApiVariant {
    pub fn host_prefix(&self) -> &'static str {
        match self {
            ApiVariant::Development => "apidev",
            ApiVariant::Production => "api",
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}.accuweather.com/", self.host_prefix())
    }
}

macro_rules! operations {
    ($($variant:ident => $name:literal, $template:literal;)+) => {
        /// Every endpoint the client knows how to reach.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            pub const fn all() -> &'static [Operation] {
                &[$(Operation::$variant,)+]
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)+
                }
            }

            /// Path template relative to the API host.
            pub fn template(&self) -> &'static str {
                match self {
                    $(Operation::$variant => $template,)+
                }
            }

            pub fn from_name(name: &str) -> Result<Self> {
                match name {
                    $($name => Ok(Operation::$variant),)+
                    _ => Err(AccuweatherError::UnknownOperation(name.to_string())),
                }
            }
        }
    };
}

operations! {
    LocGeoposition => "loc_geoposition", "locations/v{version}/cities/geoposition/search.json";
    LocIpAddress => "loc_ip_address", "locations/v{version}/cities/ipaddress.json";
    LocSearch => "loc_search", "locations/v{version}/search.json";
    LocSearchCountry => "loc_search_country", "locations/v{version}/{country_code}/search.json";
    LocPostcode => "loc_postcode", "locations/v{version}/postalcodes/{country_code}/search.json";
    LocKey => "loc_lkey", "locations/v{version}/{location_key}.json";
    CurrentConditions => "currentconditions", "currentconditions/v{version}/{location_key}.json";
    CurrentConditions6h => "currentconditions_6", "currentconditions/v{version}/{location_key}/historical.json";
    CurrentConditions24h => "currentconditions_24", "currentconditions/v{version}/{location_key}/historical/24.json";
    Forecast1h => "forecast_1h", "forecasts/v{version}/hourly/1hour/{location_key}.json";
    Forecast12h => "forecast_12h", "forecasts/v{version}/hourly/12hour/{location_key}.json";
    Forecast24h => "forecast_24h", "forecasts/v{version}/hourly/24hour/{location_key}.json";
    Forecast72h => "forecast_72h", "forecasts/v{version}/hourly/72hour/{location_key}.json";
    Forecast120h => "forecast_120h", "forecasts/v{version}/hourly/120hour/{location_key}.json";
    Forecast240h => "forecast_240h", "forecasts/v{version}/hourly/240hour/{location_key}.json";
    Forecast1d => "forecast_1d", "forecasts/v{version}/daily/1day/{location_key}.json";
    Forecast5d => "forecast_5d", "forecasts/v{version}/daily/5day/{location_key}.json";
    Forecast10d => "forecast_10d", "forecasts/v{version}/daily/10day/{location_key}.json";
    Forecast15d => "forecast_15d", "forecasts/v{version}/daily/15day/{location_key}.json";
    Forecast25d => "forecast_25d", "forecasts/v{version}/daily/25day/{location_key}.json";
    Forecast45d => "forecast_45d", "forecasts/v{version}/daily/45day/{location_key}.json";
    AirQualityCurrent => "airquality_current", "airquality/v{version}/observations/{location_key}.json";
    AirQualityYesterday => "airquality_yesterday", "airquality/v{version}/observations/1day/{location_key}.json";
    ClimoActualsDate => "climo_actuals_date", "climo/v{version}/actuals/{date}/{location_key}.json";
    ClimoActualsRange => "climo_actuals_range", "climo/v{version}/actuals/{location_key}.json";
    ClimoRecordsDate => "climo_records_date", "climo/v{version}/records/{date}/{location_key}.json";
    ClimoRecordsRange => "climo_records_range", "climo/v{version}/records/{location_key}.json";
    ClimoNormalsDate => "climo_normals_date", "climo/v{version}/normals/{date}/{location_key}.json";
    ClimoNormalsRange => "climo_normals_range", "climo/v{version}/normals/{location_key}.json";
    ClimoMonthSummary => "climo_month_summary", "climo/v{version}/summary/{year}/{month}/{location_key}.json";
    Alarms1d => "alarms_1d", "alarms/v{version}/1day/{location_key}";
    Alarms5d => "alarms_5d", "alarms/v{version}/5day/{location_key}";
    Alarms10d => "alarms_10d", "alarms/v{version}/10day/{location_key}";
    Alarms15d => "alarms_15d", "alarms/v{version}/15day/{location_key}";
    Alarms25d => "alarms_25d", "alarms/v{version}/25day/{location_key}";
}

impl Operation {
    /// Full URL for this operation with `params` substituted into the template.
    pub fn url(&self, params: &EndpointParams) -> Result<String> {
        let mut url = params.variant.base_url();
        let mut rest = self.template();

        // Templates are static, so every '{' has a matching '}'.
        while let (Some(open), Some(close)) = (rest.find('{'), rest.find('}')) {
            url.push_str(&rest[..open]);
            url.push_str(&self.placeholder(&rest[open + 1..close], params)?);
            rest = &rest[close + 1..];
        }
        url.push_str(rest);

        Ok(url)
    }

    fn placeholder(&self, key: &str, params: &EndpointParams) -> Result<String> {
        let missing = |parameter: &'static str| AccuweatherError::MissingEndpointParameter {
            operation: self.name(),
            parameter,
        };

        match key {
            "version" => Ok(params.version.to_string()),
            "location_key" => params
                .location_key
                .clone()
                .ok_or_else(|| missing("location_key")),
            "country_code" => params
                .country_code
                .clone()
                .ok_or_else(|| missing("country_code")),
            "date" => params
                .date
                .map(|d| d.format("%Y/%m/%d").to_string())
                .ok_or_else(|| missing("date")),
            "year" => params
                .year
                .map(|y| y.to_string())
                .ok_or_else(|| missing("year")),
            "month" => params
                .month
                .map(|m| m.to_string())
                .ok_or_else(|| missing("month")),
            _ => Err(AccuweatherError::UnknownOperation(format!("{}:{{{key}}}", self.name()))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = AccuweatherError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::from_name(s)
    }
}

/// Values substituted into endpoint templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointParams {
    pub variant: ApiVariant,
    pub version: u32,
    pub location_key: Option<String>,
    pub country_code: Option<String>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl Default for EndpointParams {
    fn default() -> Self {
        Self {
            variant: ApiVariant::default(),
            version: 1,
            location_key: None,
            country_code: None,
            date: None,
            year: None,
            month: None,
        }
    }
}

impl EndpointParams {
    pub fn new(variant: ApiVariant, version: u32) -> Self {
        Self {
            variant,
            version,
            ..Self::default()
        }
    }

    pub fn location_key(mut self, key: impl ToString) -> Self {
        self.location_key = Some(key.to_string());
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn year_month(mut self, year: i32, month: u32) -> Self {
        self.year = Some(year);
        self.month = Some(month);
        self
    }
}

/// Resolve an operation by its wire name and render its URL.
pub fn froot(name: &str, params: &EndpointParams) -> Result<String> {
    Operation::from_name(name)?.url(params)
}
