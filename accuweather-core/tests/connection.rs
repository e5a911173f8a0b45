use std::sync::{Arc, Mutex};

use accuweather_core::{
    AccuweatherError, AirQualityPeriod, Connection, ConnectionConfig, Forecast, ForecastHorizon,
    ObservationHorizon, Result, Transport, TransportResponse,
};
use async_trait::async_trait;

const KEY: &str = "0123456789abcdef0123456789abcdef";

/// Serves canned fixtures by URL suffix; anything unknown is a 404.
#[derive(Debug, Default)]
struct FixtureTransport {
    routes: Vec<(&'static str, &'static str)>,
    seen: Mutex<Vec<String>>,
}

impl FixtureTransport {
    fn route(mut self, suffix: &'static str, body: &'static str) -> Self {
        self.routes.push((suffix, body));
        self
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<TransportResponse> {
        self.seen.lock().unwrap().push(url.to_string());
        let found = self.routes.iter().find(|(suffix, _)| url.ends_with(suffix));
        Ok(match found {
            Some((_, body)) => TransportResponse::new(200, *body),
            None => TransportResponse::new(404, "{}"),
        })
    }
}

fn fixtures() -> Arc<FixtureTransport> {
    let transport = FixtureTransport::default()
        .route(
            "/cities/geoposition/search.json",
            include_str!("fixtures/geoposition.json"),
        )
        .route(
            "/locations/v1/US/search.json",
            include_str!("fixtures/search_ladoga.json"),
        )
        .route(
            "/currentconditions/v1/327019.json",
            include_str!("fixtures/currentconditions.json"),
        )
        .route(
            "/hourly/1hour/327019.json",
            include_str!("fixtures/forecast_1h.json"),
        )
        .route(
            "/daily/5day/327019.json",
            include_str!("fixtures/forecast_daily.json"),
        )
        .route(
            "/observations/327019.json",
            include_str!("fixtures/airquality.json"),
        );
    Arc::new(transport)
}

fn connect(transport: Arc<FixtureTransport>) -> Connection {
    Connection::with_transport(ConnectionConfig::new(KEY), transport).unwrap()
}

#[tokio::test]
async fn locate_then_fetch_current_conditions() {
    let conn = connect(fixtures());

    let heathrow = conn.loc_geoposition(51.4700, -0.4543).await.unwrap();
    assert_eq!(heathrow.key, "327019");
    assert_eq!(heathrow.country.id, "GB");
    assert_eq!(heathrow.administrative_area.level, 2);
    assert!(heathrow.time_zone.is_daylight_saving);
    let change = heathrow.time_zone.next_offset_change.unwrap();
    assert_eq!(change.to_rfc3339(), "2015-10-25T01:00:00+00:00");

    let obs = conn
        .current_conditions((&heathrow).into(), ObservationHorizon::Now, true)
        .await
        .unwrap();
    let (at, now) = obs.observations.first().unwrap();
    assert_eq!(at, "2015-08-13T15:45:00+01:00");
    assert_eq!(now.synopsis, "Partly sunny");
    assert!((now.temperature.fahrenheit() - 66.92).abs() < 1e-9);
}

#[tokio::test]
async fn country_search_keeps_result_order() {
    let conn = connect(fixtures());

    let set = conn.loc_string("Ladoga", Some("US")).await.unwrap();
    assert_eq!(set.len(), 2);
    let keys: Vec<&str> = set.iter().map(|l| l.key.as_str()).collect();
    assert_eq!(keys, ["2152342", "2152343"]);
    assert_eq!(set[0].administrative_area.id, "IN");
    assert!(set[1].time_zone.next_offset_change.is_none());
    assert_eq!(
        set.to_string(),
        "Location result set for the query 'Ladoga' (2 results)"
    );
}

#[tokio::test]
async fn hourly_forecast_maps_units() {
    let conn = connect(fixtures());

    let horizon = ForecastHorizon::Hours1;
    let forecast = conn.forecast(horizon, 327019, true, true).await;
    let Forecast::Hourly(hourly) = forecast.unwrap() else {
        panic!("expected hourly forecast");
    };

    let hour = hourly.forecasts.get("2015-08-13T16:00:00+01:00").unwrap();
    assert_eq!(hour.realfeel_temperature.celsius(), 16.5);
    assert_eq!(hour.total_liquid.mm(), 0.3);
    assert_eq!(hour.ceiling.metres(), 670.0);
    assert_eq!(hour.wind_gust.unwrap().heading(), 248.0);
    assert_eq!(hour.uv_index_text, "Low");
}

#[tokio::test]
async fn daily_forecast_has_headline_and_days() {
    let conn = connect(fixtures());

    let horizon = ForecastHorizon::Days5;
    let forecast = conn.forecast(horizon, 327019, true, true).await;
    let Forecast::Daily(daily) = forecast.unwrap() else {
        panic!("expected daily forecast");
    };

    assert_eq!(daily.headline.category.as_deref(), Some("rain"));
    assert!(daily.headline.end_date.is_some());
    assert_eq!(
        daily.forecasts.keys().collect::<Vec<_>>(),
        ["2015-08-13", "2015-08-14", "2015-08-15"]
    );

    let friday = daily.forecasts.get("2015-08-14").unwrap();
    assert_eq!(friday.temp_max.celsius(), 19.8);
    assert_eq!(friday.day.synopsis, "A couple of showers");
    assert_eq!(friday.night.wind_gust.unwrap().heading(), 225.0);
    assert_ne!(friday.day.id, friday.night.id);

    let json = serde_json::to_value(Forecast::Daily(daily.clone())).unwrap();
    assert_eq!(json["granularity"], "daily");
    assert!(json["forecasts"].get("2015-08-15").is_some());
}

#[tokio::test]
async fn air_quality_lookup_is_case_insensitive() {
    let conn = connect(fixtures());

    let aq = conn
        .air_quality(327019, AirQualityPeriod::Current)
        .await
        .unwrap();
    assert_eq!(aq.len(), 3);
    assert_eq!(aq.get("pm2.5").unwrap().category, "Moderate");
    assert_eq!(aq.get("GRASS").unwrap().band, 1);
}

#[tokio::test]
async fn unknown_route_surfaces_status() {
    let conn = connect(fixtures());

    let err = conn
        .air_quality(327019, AirQualityPeriod::Yesterday)
        .await
        .unwrap_err();
    assert!(matches!(err, AccuweatherError::Api { status: 404 }));
}
