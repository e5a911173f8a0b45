//! Error type shared by every layer of the client.

use thiserror::Error;

pub type Result<T, E = AccuweatherError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum AccuweatherError {
    #[error("No API key provided. Pass one explicitly or set ACCUWEATHER_APIKEY.")]
    NoApiKeyProvided,

    #[error(
        "Malformed API key: your API key must be a 32-character string (got {length} characters)"
    )]
    MalformedApiKey { length: usize },

    #[error("Language selection must be a two-letter ISO 639-1 code, got '{0}'")]
    InvalidLanguage(String),

    #[error("Coordinates out of range: latitude {lat}, longitude {lon}")]
    Range { lat: f64, lon: f64 },

    #[error(
        "The country code '{0}' could not be resolved. Country codes are two letters, e.g. 'US' or 'GB'."
    )]
    InvalidCountryCode(String),

    #[error("Malformed location key '{0}': the location key must be an integer")]
    MalformedLocationKey(String),

    #[error("Your query for '{query}' yielded no results")]
    NoResults { query: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid unit '{unit}' for {quantity}")]
    InvalidUnit {
        quantity: &'static str,
        unit: String,
    },

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidTimestamp(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Unsupported horizon '{0}'")]
    UnsupportedHorizon(String),

    #[error(
        "The {0} method is not implemented in this client. There's a chance this is because it does not exist."
    )]
    UnknownOperation(String),

    #[error("Endpoint {operation} requires the '{parameter}' parameter")]
    MissingEndpointParameter {
        operation: &'static str,
        parameter: &'static str,
    },

    #[error("The server returned a 403/Forbidden response")]
    Unauthorised,

    #[error("Could not connect to the AccuWeather servers: {0}")]
    ApiConnection(String),

    #[error("The AccuWeather API returned an error: HTTP {status}")]
    Api { status: u16 },
}

impl AccuweatherError {
    /// HTTP status carried by the error, if it came from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorised => Some(403),
            Self::Api { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error rejects caller input, raised before any request left
    /// the process. Defects found in a response, unknown unit tags included,
    /// surface as [`Self::MalformedResponse`] instead.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::Unauthorised
                | Self::ApiConnection(_)
                | Self::Api { .. }
                | Self::MalformedResponse(_)
                | Self::NoResults { .. }
        )
    }
}

impl From<serde_json::Error> for AccuweatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for AccuweatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::ApiConnection(err.to_string())
    }
}
