use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, elements};
use crate::error::Result;

/// One pollutant reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AirQualityFactor {
    pub name: String,
    pub value: f64,
    pub category: String,
    #[serde(rename = "CategoryValue")]
    pub band: i64,
}

impl AirQualityFactor {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        decode(payload)
    }
}

/// Pollutant readings keyed by lower-cased factor name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AirQuality {
    pub factors: BTreeMap<String, AirQualityFactor>,
}

impl AirQuality {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let mut factors = BTreeMap::new();
        for entry in elements(payload)? {
            let factor = AirQualityFactor::from_payload(entry)?;
            factors.insert(factor.name.to_lowercase(), factor);
        }
        Ok(Self { factors })
    }

    /// Case-insensitive lookup, e.g. `get("Ozone")` or `get("pm2.5")`.
    pub fn get(&self, name: &str) -> Option<&AirQualityFactor> {
        self.factors.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AirQualityFactor> {
        self.factors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccuweatherError;
    use serde_json::json;

    #[test]
    fn factors_keyed_by_lowercase_name() {
        let payload = json!([
            {"Name": "Ozone", "Value": 41.2, "Category": "Good", "CategoryValue": 1},
            {"Name": "PM2.5", "Value": 12.0, "Category": "Moderate", "CategoryValue": 2}
        ]);

        let aq = AirQuality::from_payload(&payload).unwrap();
        assert_eq!(aq.len(), 2);
        assert_eq!(aq.get("OZONE").unwrap().band, 1);
        assert_eq!(aq.factors["pm2.5"].category, "Moderate");
    }

    #[test]
    fn factor_without_category_aborts() {
        let payload = json!([{"Name": "Ozone", "Value": 41.2, "CategoryValue": 1}]);
        assert!(matches!(
            AirQuality::from_payload(&payload),
            Err(AccuweatherError::MalformedResponse(_))
        ));
    }
}
