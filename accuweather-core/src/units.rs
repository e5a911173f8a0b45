//! Unit-aware value objects wrapping the raw numbers in provider payloads.
//!
//! Each type stores the value in the unit the provider reported and converts on
//! read; nothing is ever normalised in place.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::{AccuweatherError, Result};

const MM_PER_INCH: f64 = 25.4;
const CM_PER_INCH: f64 = 2.54;
const METRES_PER_FOOT: f64 = 0.3048;
const KM_PER_MILE: f64 = 1.60934;

macro_rules! unit_tags {
    ($ty:ident, $quantity:literal { $($variant:ident => $tag:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $ty {
            $(#[serde(rename = $tag)] $variant,)+
        }

        impl $ty {
            pub fn tag(&self) -> &'static str {
                match self {
                    $($ty::$variant => $tag,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = AccuweatherError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($tag => Ok($ty::$variant),)+
                    _ => Err(AccuweatherError::InvalidUnit {
                        quantity: $quantity,
                        unit: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

unit_tags!(TemperatureUnit, "temperature" { Celsius => "C", Fahrenheit => "F" });
unit_tags!(PrecipitationUnit, "precipitation" { Millimetres => "mm", Inches => "in" });
unit_tags!(SnowUnit, "snow" { Centimetres => "cm", Inches => "in" });
unit_tags!(CeilingUnit, "ceiling" { Kilometres => "km", Metres => "m", Feet => "ft" });
unit_tags!(SpeedUnit, "wind speed" { KilometresPerHour => "km/h", MilesPerHour => "mi/h" });

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Temperature {
    value: f64,
    unit: TemperatureUnit,
}

impl Temperature {
    pub fn new(value: f64, unit: TemperatureUnit) -> Self {
        Self { value, unit }
    }

    pub fn from_tag(value: f64, unit: &str) -> Result<Self> {
        Ok(Self::new(value, unit.parse()?))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn celsius(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Celsius => self.value,
            TemperatureUnit::Fahrenheit => (self.value - 32.0) * 5.0 / 9.0,
        }
    }

    pub fn fahrenheit(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Celsius => self.value * 1.8 + 32.0,
            TemperatureUnit::Fahrenheit => self.value,
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} °C / {:.1} °F", self.celsius(), self.fahrenheit())
    }
}

/// Liquid precipitation (rain, ice, total liquid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Precipitation {
    value: f64,
    unit: PrecipitationUnit,
}

impl Precipitation {
    pub fn new(value: f64, unit: PrecipitationUnit) -> Self {
        Self { value, unit }
    }

    pub fn from_tag(value: f64, unit: &str) -> Result<Self> {
        Ok(Self::new(value, unit.parse()?))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> PrecipitationUnit {
        self.unit
    }

    pub fn mm(&self) -> f64 {
        match self.unit {
            PrecipitationUnit::Millimetres => self.value,
            PrecipitationUnit::Inches => self.value * MM_PER_INCH,
        }
    }

    pub fn inches(&self) -> f64 {
        match self.unit {
            PrecipitationUnit::Millimetres => self.value / MM_PER_INCH,
            PrecipitationUnit::Inches => self.value,
        }
    }
}

impl fmt::Display for Precipitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} mm / {:.2} in", self.mm(), self.inches())
    }
}

/// Snowfall depth. All conversions go through 1 in = 2.54 cm = 25.4 mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snow {
    value: f64,
    unit: SnowUnit,
}

impl Snow {
    pub fn new(value: f64, unit: SnowUnit) -> Self {
        Self { value, unit }
    }

    pub fn from_tag(value: f64, unit: &str) -> Result<Self> {
        Ok(Self::new(value, unit.parse()?))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> SnowUnit {
        self.unit
    }

    pub fn cm(&self) -> f64 {
        match self.unit {
            SnowUnit::Centimetres => self.value,
            SnowUnit::Inches => self.value * CM_PER_INCH,
        }
    }

    pub fn mm(&self) -> f64 {
        self.cm() * 10.0
    }

    pub fn inches(&self) -> f64 {
        match self.unit {
            SnowUnit::Centimetres => self.value / CM_PER_INCH,
            SnowUnit::Inches => self.value,
        }
    }
}

impl fmt::Display for Snow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} mm / {:.1} in", self.mm(), self.inches())
    }
}

/// Cloud ceiling height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ceiling {
    value: f64,
    unit: CeilingUnit,
}

impl Ceiling {
    pub fn new(value: f64, unit: CeilingUnit) -> Self {
        Self { value, unit }
    }

    pub fn from_tag(value: f64, unit: &str) -> Result<Self> {
        Ok(Self::new(value, unit.parse()?))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> CeilingUnit {
        self.unit
    }

    pub fn metres(&self) -> f64 {
        match self.unit {
            CeilingUnit::Kilometres => self.value * 1000.0,
            CeilingUnit::Metres => self.value,
            CeilingUnit::Feet => self.value * METRES_PER_FOOT,
        }
    }

    pub fn km(&self) -> f64 {
        match self.unit {
            CeilingUnit::Kilometres => self.value,
            _ => self.metres() / 1000.0,
        }
    }

    pub fn feet(&self) -> f64 {
        match self.unit {
            CeilingUnit::Feet => self.value,
            _ => self.metres() / METRES_PER_FOOT,
        }
    }

    /// Approximate flight level, rounded to the nearest ten.
    pub fn flight_level(&self) -> i64 {
        ((self.feet() / 1000.0).round() * 10.0) as i64
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} m (approximately FL{:03})",
            self.metres(),
            self.flight_level()
        )
    }
}

/// Wind speed with the heading it blows from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wind {
    speed: f64,
    unit: SpeedUnit,
    heading: f64,
}

impl Wind {
    pub fn new(speed: f64, unit: SpeedUnit, heading: f64) -> Self {
        Self {
            speed,
            unit,
            heading,
        }
    }

    pub fn from_tag(speed: f64, unit: &str, heading: f64) -> Result<Self> {
        Ok(Self::new(speed, unit.parse()?, heading))
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn unit(&self) -> SpeedUnit {
        self.unit
    }

    /// Heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn kmh(&self) -> f64 {
        match self.unit {
            SpeedUnit::KilometresPerHour => self.speed,
            SpeedUnit::MilesPerHour => self.speed * KM_PER_MILE,
        }
    }

    pub fn mph(&self) -> f64 {
        match self.unit {
            SpeedUnit::KilometresPerHour => self.speed / KM_PER_MILE,
            SpeedUnit::MilesPerHour => self.speed,
        }
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}° {:.1} km/h / {:.1} mph",
            self.heading,
            self.kmh(),
            self.mph()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn temperature_fahrenheit() {
        let t = Temperature::new(220.0, TemperatureUnit::Celsius);
        let t_f = Temperature::from_tag(230.0, "F").unwrap();
        let t_neg = Temperature::from_tag(-123.0, "C").unwrap();

        assert!((t.fahrenheit() - 428.0).abs() < EPS);
        assert_eq!(t_f.fahrenheit(), 230.0);
        assert!((t_neg.fahrenheit() - -189.4).abs() < 1e-6);
    }

    #[test]
    fn temperature_celsius() {
        let t = Temperature::new(220.0, TemperatureUnit::Celsius);
        let t_f = Temperature::from_tag(230.0, "F").unwrap();

        assert_eq!(t.celsius(), 220.0);
        assert!((t_f.celsius() - 110.0).abs() < EPS);
    }

    #[test]
    fn temperature_reads_back_stored_value_exactly() {
        for v in [-40.0, 0.0, 0.1, 21.7, 1e6] {
            let t = Temperature::new(v, TemperatureUnit::Celsius);
            assert_eq!(t.celsius(), v);
            let tolerance = 1e-9 * v.abs().max(1.0);
            assert!((t.fahrenheit() - (v * 1.8 + 32.0)).abs() < tolerance);
        }
    }

    #[test]
    fn unknown_unit_tag_is_rejected() {
        let err = Temperature::from_tag(1.0, "K").unwrap_err();
        assert!(matches!(
            err,
            AccuweatherError::InvalidUnit { quantity: "temperature", ref unit } if unit == "K"
        ));
        assert!(Snow::from_tag(1.0, "mm").is_err());
        assert!(Wind::from_tag(1.0, "kn", 0.0).is_err());
    }

    #[test]
    fn precipitation_conversions() {
        let p = Precipitation::from_tag(25.4, "mm").unwrap();
        assert!((p.inches() - 1.0).abs() < EPS);

        let p = Precipitation::from_tag(2.0, "in").unwrap();
        assert!((p.mm() - 50.8).abs() < EPS);
        assert_eq!(p.inches(), 2.0);
    }

    #[test]
    fn snow_conversions_share_one_law() {
        let s = Snow::from_tag(2.54, "cm").unwrap();
        assert!((s.inches() - 1.0).abs() < EPS);
        assert!((s.mm() - 25.4).abs() < EPS);

        let s = Snow::from_tag(1.0, "in").unwrap();
        assert!((s.mm() - 25.4).abs() < EPS);
        assert!((s.cm() - 2.54).abs() < EPS);
    }

    #[test]
    fn ceiling_conversions() {
        let c = Ceiling::from_tag(1.0, "km").unwrap();
        assert_eq!(c.metres(), 1000.0);
        assert!((c.feet() - 3280.8399).abs() < 1e-3);

        let c = Ceiling::from_tag(1000.0, "ft").unwrap();
        assert!((c.metres() - 304.8).abs() < EPS);
        assert!((c.km() - 0.3048).abs() < EPS);
        assert_eq!(c.flight_level(), 10);

        let c = Ceiling::from_tag(3048.0, "m").unwrap();
        assert!((c.feet() - 10000.0).abs() < 1e-6);
    }

    #[test]
    fn wind_conversions() {
        let w = Wind::from_tag(10.0, "mi/h", 270.0).unwrap();
        assert!((w.kmh() - 16.0934).abs() < EPS);
        assert_eq!(w.mph(), 10.0);
        assert_eq!(w.heading(), 270.0);

        let w = Wind::new(16.0934, SpeedUnit::KilometresPerHour, 90.0);
        assert!((w.mph() - 10.0).abs() < EPS);
    }

    #[test]
    fn display_shows_both_units() {
        let t = Temperature::new(12.0, TemperatureUnit::Celsius);
        assert_eq!(t.to_string(), "12.0 °C / 53.6 °F");
    }
}
