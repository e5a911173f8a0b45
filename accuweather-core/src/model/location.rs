use std::{fmt, ops::Index};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::decode;
use crate::error::{AccuweatherError, Result};

const OFFSET_CHANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: String,
    pub localized_name: String,
    pub english_name: String,
}

impl Region {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let wire: WireNamed = decode(payload)?;
        Ok(Self::from_fields(wire.id, wire.localized_name, wire.english_name))
    }

    pub fn from_fields(
        id: impl Into<String>,
        localized_name: impl Into<String>,
        english_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            localized_name: localized_name.into(),
            english_name: english_name.into(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.english_name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Country {
    pub id: String,
    pub localized_name: String,
    pub english_name: String,
}

impl Country {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let wire: WireNamed = decode(payload)?;
        Ok(Self::from_fields(wire.id, wire.localized_name, wire.english_name))
    }

    pub fn from_fields(
        id: impl Into<String>,
        localized_name: impl Into<String>,
        english_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            localized_name: localized_name.into(),
            english_name: english_name.into(),
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.english_name, self.id)
    }
}

/// Primary administrative area (state, county, province, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdministrativeArea {
    pub id: String,
    pub localized_name: String,
    pub english_name: String,
    pub level: u32,
    pub localized_type: String,
    pub english_type: String,
}

impl AdministrativeArea {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let wire: WireAdministrativeArea = decode(payload)?;
        Ok(Self {
            id: wire.id,
            localized_name: wire.localized_name,
            english_name: wire.english_name,
            level: wire.level,
            localized_type: wire.localized_type,
            english_type: wire.english_type,
        })
    }

    pub fn from_fields(
        id: impl Into<String>,
        localized_name: impl Into<String>,
        english_name: impl Into<String>,
        level: u32,
        localized_type: impl Into<String>,
        english_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            localized_name: localized_name.into(),
            english_name: english_name.into(),
            level,
            localized_type: localized_type.into(),
            english_type: english_type.into(),
        }
    }
}

impl fmt::Display for AdministrativeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.english_type, self.english_name, self.id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeZone {
    pub code: String,
    pub name: String,
    /// Hours from GMT; fractional for zones such as India (+5.5).
    pub gmt_offset: f64,
    pub is_daylight_saving: bool,
    pub next_offset_change: Option<DateTime<Utc>>,
}

impl TimeZone {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let wire: WireTimeZone = decode(payload)?;
        Self::from_fields(
            wire.code,
            wire.name,
            wire.gmt_offset,
            wire.is_daylight_saving,
            wire.next_offset_change.as_deref(),
        )
        .map_err(|e| match e {
            AccuweatherError::InvalidTimestamp(ts) => {
                let msg = format!("NextOffsetChange '{ts}' is not YYYY-MM-DDTHH:MM:SSZ");
                AccuweatherError::MalformedResponse(msg)
            }
            other => other,
        })
    }

    /// `next_offset_change` must look like `2015-10-25T01:00:00Z`.
    pub fn from_fields(
        code: impl Into<String>,
        name: impl Into<String>,
        gmt_offset: f64,
        is_daylight_saving: bool,
        next_offset_change: Option<&str>,
    ) -> Result<Self> {
        let next_offset_change = next_offset_change
            .map(|ts| {
                NaiveDateTime::parse_from_str(ts, OFFSET_CHANGE_FORMAT)
                    .map(|naive| naive.and_utc())
                    .map_err(|_| AccuweatherError::InvalidTimestamp(ts.to_string()))
            })
            .transpose()?;

        Ok(Self {
            code: code.into(),
            name: name.into(),
            gmt_offset,
            is_daylight_saving,
            next_offset_change,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Provider location key. Usually numeric, but postcode results carry
    /// suffixed keys such as `20721_PC`.
    pub key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub localized_name: String,
    pub english_name: String,
    pub region: Region,
    pub country: Country,
    pub administrative_area: AdministrativeArea,
    pub time_zone: TimeZone,
}

impl Location {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let wire: WireLocation = decode(payload)?;
        let field = |name: &str| {
            payload
                .get(name)
                .ok_or_else(|| {
                    AccuweatherError::MalformedResponse(format!("missing field `{name}`"))
                })
        };

        Ok(Self {
            key: wire.key.into_string(),
            latitude: wire.geo_position.latitude,
            longitude: wire.geo_position.longitude,
            localized_name: wire.localized_name,
            english_name: wire.english_name,
            region: Region::from_payload(field("Region")?)?,
            country: Country::from_payload(field("Country")?)?,
            administrative_area: AdministrativeArea::from_payload(field("AdministrativeArea")?)?,
            time_zone: TimeZone::from_payload(field("TimeZone")?)?,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        key: impl Into<String>,
        latitude: f64,
        longitude: f64,
        localized_name: impl Into<String>,
        english_name: impl Into<String>,
        region: Region,
        country: Country,
        administrative_area: AdministrativeArea,
        time_zone: TimeZone,
    ) -> Result<Self> {
        if !(latitude.abs() <= 90.0 && longitude.abs() <= 180.0) {
            return Err(AccuweatherError::Range {
                lat: latitude,
                lon: longitude,
            });
        }

        Ok(Self {
            key: key.into(),
            latitude,
            longitude,
            localized_name: localized_name.into(),
            english_name: english_name.into(),
            region,
            country,
            administrative_area,
            time_zone,
        })
    }

    /// The key as an integer, as required by the forecast and conditions endpoints.
    pub fn numeric_key(&self) -> Result<u64> {
        self.key
            .parse()
            .map_err(|_| AccuweatherError::MalformedLocationKey(self.key.clone()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) [key {}]",
            self.english_name, self.administrative_area.english_name, self.country.id, self.key
        )
    }
}

/// Ordered results of a free-text location search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSet {
    results: Vec<Location>,
    search_expression: String,
    country: Option<String>,
}

impl LocationSet {
    pub fn new(
        results: Vec<Location>,
        search_expression: impl Into<String>,
        country: Option<String>,
    ) -> Self {
        Self {
            results,
            search_expression: search_expression.into(),
            country,
        }
    }

    pub fn search_expression(&self) -> &str {
        &self.search_expression
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.results.get(index)
    }

    pub fn push(&mut self, location: Location) {
        self.results.push(location);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.results.iter()
    }
}

impl Index<usize> for LocationSet {
    type Output = Location;

    fn index(&self, index: usize) -> &Location {
        &self.results[index]
    }
}

impl<'a> IntoIterator for &'a LocationSet {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for LocationSet {
    type Item = Location;
    type IntoIter = std::vec::IntoIter<Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl fmt::Display for LocationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location result set for the query '{}' ({} results)",
            self.search_expression,
            self.len()
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireKey {
    Text(String),
    Number(u64),
}

impl WireKey {
    fn into_string(self) -> String {
        match self {
            WireKey::Text(s) => s,
            WireKey::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireGeoPosition {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireLocation {
    key: WireKey,
    localized_name: String,
    english_name: String,
    geo_position: WireGeoPosition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireNamed {
    #[serde(rename = "ID")]
    id: String,
    localized_name: String,
    english_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAdministrativeArea {
    #[serde(rename = "ID")]
    id: String,
    localized_name: String,
    english_name: String,
    level: u32,
    localized_type: String,
    english_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireTimeZone {
    code: String,
    name: String,
    gmt_offset: f64,
    is_daylight_saving: bool,
    next_offset_change: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn london_heathrow() -> Value {
        json!({
            "Version": 1,
            "Key": "327019",
            "Type": "City",
            "Rank": 55,
            "LocalizedName": "Heathrow",
            "EnglishName": "Heathrow",
            "Region": {"ID": "EUR", "LocalizedName": "Europe", "EnglishName": "Europe"},
            "Country": {"ID": "GB", "LocalizedName": "United Kingdom", "EnglishName": "United Kingdom"},
            "AdministrativeArea": {
                "ID": "HIL", "LocalizedName": "Hillingdon", "EnglishName": "Hillingdon",
                "Level": 2, "LocalizedType": "London Borough", "EnglishType": "London Borough",
                "CountryID": "GB"
            },
            "TimeZone": {
                "Code": "BST", "Name": "Europe/London", "GmtOffset": 1.0,
                "IsDaylightSaving": true, "NextOffsetChange": "2015-10-25T01:00:00Z"
            },
            "GeoPosition": {"Latitude": 51.479, "Longitude": -0.449, "Elevation": {}}
        })
    }

    #[test]
    fn location_from_payload() {
        let loc = Location::from_payload(&london_heathrow()).expect("payload should map");

        assert_eq!(loc.key, "327019");
        assert_eq!(loc.numeric_key().unwrap(), 327019);
        assert_eq!(loc.region.id, "EUR");
        assert_eq!(loc.country.english_name, "United Kingdom");
        assert_eq!(loc.administrative_area.level, 2);
        assert_eq!(loc.time_zone.code, "BST");
        assert!(loc.time_zone.is_daylight_saving);

        let change = loc.time_zone.next_offset_change.expect("offset change");
        assert_eq!(
            (change.year(), change.month(), change.day(), change.hour()),
            (2015, 10, 25, 1)
        );
    }

    #[test]
    fn missing_nested_field_aborts_location() {
        let mut payload = london_heathrow();
        payload["TimeZone"].as_object_mut().unwrap().remove("Code");

        let err = Location::from_payload(&payload).unwrap_err();
        match err {
            AccuweatherError::MalformedResponse(msg) => assert!(msg.contains("Code")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_top_level_section_aborts_location() {
        let mut payload = london_heathrow();
        payload.as_object_mut().unwrap().remove("Region");

        assert!(matches!(
            Location::from_payload(&payload),
            Err(AccuweatherError::MalformedResponse(_))
        ));
    }

    #[test]
    fn integer_keys_are_accepted() {
        let mut payload = london_heathrow();
        payload["Key"] = json!(330732);

        assert_eq!(Location::from_payload(&payload).unwrap().key, "330732");
    }

    #[test]
    fn postcode_keys_are_not_numeric() {
        let mut payload = london_heathrow();
        payload["Key"] = json!("20721_PC");

        let loc = Location::from_payload(&payload).unwrap();
        match loc.numeric_key() {
            Err(AccuweatherError::MalformedLocationKey(key)) => assert_eq!(key, "20721_PC"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mapping_twice_yields_equal_objects() {
        let payload = london_heathrow();
        let a = Location::from_payload(&payload).unwrap();
        let b = Location::from_payload(&payload).unwrap();

        assert_eq!(a, b);
        assert_eq!(payload, london_heathrow());
    }

    #[test]
    fn time_zone_from_fields_validates_format() {
        let tz = TimeZone::from_fields("GMT", "Europe/London", 0.0, false, None).unwrap();
        assert!(tz.next_offset_change.is_none());

        let bad = Some("2015-10-25 01:00");
        let err = TimeZone::from_fields("GMT", "Europe/London", 0.0, false, bad).unwrap_err();
        assert!(matches!(err, AccuweatherError::InvalidTimestamp(_)));
    }

    #[test]
    fn location_from_fields_checks_coordinates() {
        let region = Region::from_fields("EUR", "Europe", "Europe");
        let country = Country::from_fields("GB", "United Kingdom", "United Kingdom");
        let area = AdministrativeArea::from_fields("HIL", "Hillingdon", "Hillingdon", 2, "B", "B");
        let tz = TimeZone::from_fields("GMT", "Europe/London", 0.0, false, None).unwrap();
        let at = |lat, lon| {
            let (r, c, a, t) = (region.clone(), country.clone(), area.clone(), tz.clone());
            Location::from_fields("1", lat, lon, "X", "X", r, c, a, t)
        };

        assert!(matches!(at(91.0, 0.0), Err(AccuweatherError::Range { .. })));

        let loc = at(51.5, -0.5).unwrap();
        assert_eq!(loc.latitude, 51.5);
    }

    #[test]
    fn location_set_access() {
        let loc = Location::from_payload(&london_heathrow()).unwrap();
        let mut set = LocationSet::new(vec![loc.clone()], "Heathrow", Some("GB".into()));
        set.push(loc);

        assert_eq!(set.len(), 2);
        assert_eq!(set[1].key, "327019");
        assert_eq!(set.country(), Some("GB"));
        assert_eq!(
            set.to_string(),
            "Location result set for the query 'Heathrow' (2 results)"
        );
    }
}
