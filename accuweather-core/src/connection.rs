use std::{fmt, net::IpAddr, sync::Arc, time::Duration};

use chrono::Month;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    endpoint::{ApiVariant, EndpointParams, Operation},
    error::{AccuweatherError, Result},
    model::{self, AirQuality, CurrentObs, Forecast, Location, LocationSet},
    request::{
        AirQualityPeriod, AlertHorizon, ClimoKind, ClimoPeriod, ForecastHorizon, LocationTarget,
        ObservationHorizon,
    },
    transport::{ReqwestTransport, Transport, TransportResponse, truncate_body},
};

pub const API_KEY_LENGTH: usize = 32;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a [`Connection`] needs, assembled by the caller.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub api_key: Option<String>,
    pub variant: ApiVariant,
    pub version: u32,
    pub language: String,
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            variant: ApiVariant::default(),
            version: 1,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("variant", &self.variant)
            .field("version", &self.version)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the AccuWeather REST API.
///
/// Every operation validates its arguments, resolves the endpoint, performs one
/// GET through the [`Transport`] and maps the JSON answer into domain objects.
/// There is no session state and no retrying.
pub struct Connection {
    api_key: Option<String>,
    variant: ApiVariant,
    version: u32,
    language: String,
    transport: Arc<dyn Transport>,
}

impl Connection {
    /// Connect using the default reqwest transport.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ConnectionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let api_key = config.api_key.ok_or(AccuweatherError::NoApiKeyProvided)?;
        let length = api_key.chars().count();
        if length != API_KEY_LENGTH {
            return Err(AccuweatherError::MalformedApiKey { length });
        }
        validate_language(&config.language)?;

        Ok(Self {
            api_key: Some(api_key),
            variant: config.variant,
            version: config.version,
            language: config.language,
            transport,
        })
    }

    /// Forget the API key. Every later request fails with
    /// [`AccuweatherError::NoApiKeyProvided`].
    pub fn wipe_api_key(&mut self) {
        self.api_key = None;
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        validate_language(language)?;
        self.language = language.to_string();
        Ok(())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn base_url(&self) -> String {
        self.variant.base_url()
    }

    // Location resolvers

    #[instrument(skip(self), level = "debug")]
    pub async fn loc_geoposition(&self, lat: f64, lon: f64) -> Result<Location> {
        if !(lat.abs() <= 90.0 && lon.abs() <= 180.0) {
            return Err(AccuweatherError::Range { lat, lon });
        }

        let q = format!("{lat:.4},{lon:.4}");
        let (params, query) = (self.params(), vec![("q", q.clone())]);
        let payload = self.fetch(Operation::LocGeoposition, params, query).await?;
        model::map_location(&q, &payload)
    }

    /// Free-text search, optionally limited to one country.
    #[instrument(skip(self), level = "debug")]
    pub async fn loc_string(
        &self,
        search: &str,
        country_code: Option<&str>,
    ) -> Result<LocationSet> {
        let (operation, params) = match country_code {
            Some(code) => {
                validate_country_code(code)?;
                (Operation::LocSearchCountry, self.params().country_code(code))
            }
            None => (Operation::LocSearch, self.params()),
        };

        let query = vec![("q", search.to_string())];
        let payload = self.fetch(operation, params, query).await?;
        model::map_location_set(search, country_code, &payload)
    }

    /// Postcode lookup. The provider only supports a handful of countries (US, CA, ...).
    #[instrument(skip(self), level = "debug")]
    pub async fn loc_postcode(&self, country_code: &str, postcode: &str) -> Result<Location> {
        validate_country_code(country_code)?;

        let params = self.params().country_code(country_code);
        let query = vec![("q", postcode.to_string())];
        let payload = self.fetch(Operation::LocPostcode, params, query).await?;
        model::map_location(postcode, &payload)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn loc_ip(&self, ip: IpAddr) -> Result<Location> {
        let q = ip.to_string();
        let (params, query) = (self.params(), vec![("q", q.clone())]);
        let payload = self.fetch(Operation::LocIpAddress, params, query).await?;
        model::map_location(&q, &payload)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn loc_lkey(&self, lkey: u64) -> Result<Location> {
        let params = self.params().location_key(lkey);
        let payload = self.fetch(Operation::LocKey, params, Vec::new()).await?;
        model::map_location(&lkey.to_string(), &payload)
    }

    // Current conditions

    #[instrument(skip(self), level = "debug")]
    pub async fn current_conditions(
        &self,
        target: LocationTarget<'_>,
        horizon: ObservationHorizon,
        details: bool,
    ) -> Result<CurrentObs> {
        let params = self.params().location_key(target.key()?);
        let query = vec![("details", flag(details))];

        let payload = self.fetch(horizon.operation(), params, query).await?;
        model::map_current_conditions(&payload)
    }

    // Forecasts

    /// Fetch and map a forecast. The typed mapper reads the detailed payload
    /// (real-feel, wind, ceiling, ...), so a request with `details == false`
    /// usually fails with [`AccuweatherError::MalformedResponse`].
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast(
        &self,
        horizon: ForecastHorizon,
        lkey: u64,
        details: bool,
        metric: bool,
    ) -> Result<Forecast> {
        let params = self.params().location_key(lkey);
        let query = vec![("details", flag(details)), ("metric", flag(metric))];

        let payload = self.fetch(horizon.operation(), params, query).await?;
        model::map_forecast(horizon.token(), &payload)
    }

    // Air quality

    #[instrument(skip(self), level = "debug")]
    pub async fn air_quality(&self, lkey: u64, period: AirQualityPeriod) -> Result<AirQuality> {
        let params = self.params().location_key(lkey);
        let payload = self.fetch(period.operation(), params, Vec::new()).await?;
        model::map_air_quality(&payload)
    }

    // Climatology

    pub async fn climo_actuals(&self, lkey: u64, period: ClimoPeriod) -> Result<Value> {
        self.climo(ClimoKind::Actuals, lkey, period).await
    }

    pub async fn climo_records(&self, lkey: u64, period: ClimoPeriod) -> Result<Value> {
        self.climo(ClimoKind::Records, lkey, period).await
    }

    pub async fn climo_normals(&self, lkey: u64, period: ClimoPeriod) -> Result<Value> {
        self.climo(ClimoKind::Normals, lkey, period).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn climo(&self, kind: ClimoKind, lkey: u64, period: ClimoPeriod) -> Result<Value> {
        let params = self.params().location_key(lkey);
        let (params, query) = match period {
            ClimoPeriod::Date(date) => (params.date(date), Vec::new()),
            ClimoPeriod::Range { start, end } => {
                if start > end {
                    return Err(AccuweatherError::InvalidDateRange {
                        start: start.to_string(),
                        end: end.to_string(),
                    });
                }
                let query = vec![
                    ("start", start.format("%Y-%m-%d").to_string()),
                    ("end", end.format("%Y-%m-%d").to_string()),
                ];
                (params, query)
            }
        };

        self.fetch(kind.operation(&period), params, query).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn climo_month_summary(&self, lkey: u64, year: i32, month: Month) -> Result<Value> {
        let params = self
            .params()
            .location_key(lkey)
            .year_month(year, month.number_from_month());
        self.fetch(Operation::ClimoMonthSummary, params, Vec::new()).await
    }

    // Alerts

    #[instrument(skip(self), level = "debug")]
    pub async fn alerts(&self, lkey: u64, horizon: AlertHorizon) -> Result<Value> {
        let params = self.params().location_key(lkey);
        self.fetch(horizon.operation(), params, Vec::new()).await
    }

    fn params(&self) -> EndpointParams {
        EndpointParams::new(self.variant, self.version)
    }

    /// RESOLVE -> TRANSPORT -> DECODE. Callers validate their own arguments first.
    async fn fetch(
        &self,
        operation: Operation,
        params: EndpointParams,
        extra: Vec<(&'static str, String)>,
    ) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AccuweatherError::NoApiKeyProvided)?;
        let url = operation.url(&params)?;

        let mut query = vec![
            ("apikey", api_key.to_string()),
            ("language", self.language.clone()),
        ];
        query.extend(extra);

        debug!(%operation, %url, "requesting");
        let response = self.transport.get(&url, &query).await?;
        decode_response(operation, response)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("variant", &self.variant)
            .field("version", &self.version)
            .field("language", &self.language)
            .field("transport", &self.transport)
            .finish()
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccuWeather connector to {}", self.base_url())
    }
}

fn decode_response(operation: Operation, response: TransportResponse) -> Result<Value> {
    match response.status {
        403 => {
            warn!(%operation, "request was not authorised");
            Err(AccuweatherError::Unauthorised)
        }
        status if !response.is_success() => {
            warn!(%operation, status, body = %truncate_body(&response.body), "request failed");
            Err(AccuweatherError::Api { status })
        }
        _ => Ok(serde_json::from_str(&response.body)?),
    }
}

fn validate_country_code(code: &str) -> Result<()> {
    if code.chars().count() != 2 {
        return Err(AccuweatherError::InvalidCountryCode(code.to_string()));
    }
    Ok(())
}

fn validate_language(language: &str) -> Result<()> {
    if language.chars().count() != 2 {
        return Err(AccuweatherError::InvalidLanguage(language.to_string()));
    }
    Ok(())
}

fn flag(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
