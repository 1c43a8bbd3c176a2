//! Physical constants and unit-bearing quantities
//!
//! Every physical input is given as a [Quantity], a value attached to a [Unit],
//! and is normalized to SI with [to_canonical] before it reaches any lensing formula.

use std::{f64::consts::PI, fmt, str::FromStr};

use strum_macros::{Display, EnumIter, EnumString};

/// Gravitational constant [m^3 kg^-1 s^-2]
pub const G: f64 = 6.67430e-11;
/// Speed of light in vacuum [m/s]
pub const C: f64 = 299_792_458.0;
/// Nominal solar mass [kg]
pub const SOLAR_MASS: f64 = 1.988409870698051e30;
/// Nominal Jupiter mass [kg]
pub const JUPITER_MASS: f64 = 1.8981245973360505e27;
/// Nominal Earth mass [kg]
pub const EARTH_MASS: f64 = 5.972167867791379e24;
/// Astronomical unit [m]
pub const ASTRONOMICAL_UNIT: f64 = 1.495978707e11;
/// Parsec [m]
pub const PARSEC: f64 = 648_000.0 / PI * ASTRONOMICAL_UNIT;
/// Julian light year [m]
pub const LIGHT_YEAR: f64 = 9.4607304725808e15;
/// Day [s]
pub const DAY: f64 = 86_400.0;
/// Julian year [s]
pub const YEAR: f64 = 365.25 * DAY;

#[derive(thiserror::Error, Debug)]
pub enum UnitsError {
    #[error(r#"unit "{0}" is not recognized"#)]
    UnknownUnit(String),
    #[error("expected a quantity of {expected}, found {found} ({unit})")]
    Dimension {
        expected: Dimension,
        found: Dimension,
        unit: Unit,
    },
    #[error(r#""{0}" doesn't match the "<value> <unit>" pattern"#)]
    Pattern(String),
    #[error("invalid quantity regex")]
    Regex(#[from] regex::Error),
    #[error("failed to parse the quantity value")]
    Value(#[from] std::num::ParseFloatError),
}
type Result<T> = std::result::Result<T, UnitsError>;

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Dimension {
    #[strum(to_string = "mass")]
    Mass,
    #[strum(to_string = "length")]
    Length,
    #[strum(to_string = "angle")]
    Angle,
    #[strum(to_string = "velocity")]
    Velocity,
    #[strum(to_string = "time")]
    Time,
}

/// Units understood by [Quantity]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum Unit {
    #[strum(to_string = "kg")]
    Kilogram,
    #[strum(to_string = "g")]
    Gram,
    #[strum(to_string = "solMass", serialize = "Msun")]
    SolarMass,
    #[strum(to_string = "jupiterMass", serialize = "Mjup")]
    JupiterMass,
    #[strum(to_string = "earthMass", serialize = "Mearth")]
    EarthMass,
    #[strum(to_string = "m")]
    Meter,
    #[strum(to_string = "km")]
    Kilometer,
    #[strum(to_string = "AU", serialize = "au")]
    AstronomicalUnit,
    #[strum(to_string = "pc")]
    Parsec,
    #[strum(to_string = "kpc")]
    Kiloparsec,
    #[strum(to_string = "Mpc")]
    Megaparsec,
    #[strum(to_string = "lyr", serialize = "ly")]
    LightYear,
    #[strum(to_string = "rad")]
    Radian,
    #[strum(to_string = "deg")]
    Degree,
    #[strum(to_string = "arcmin")]
    Arcminute,
    #[strum(to_string = "arcsec")]
    Arcsecond,
    #[strum(to_string = "mas")]
    Milliarcsecond,
    #[strum(to_string = "uas")]
    Microarcsecond,
    #[strum(to_string = "m/s")]
    MeterPerSecond,
    #[strum(to_string = "km/s")]
    KilometerPerSecond,
    #[strum(to_string = "s")]
    Second,
    #[strum(to_string = "h")]
    Hour,
    #[strum(to_string = "d", serialize = "day")]
    Day,
    #[strum(to_string = "yr")]
    Year,
}
impl Unit {
    pub fn dimension(&self) -> Dimension {
        use Unit::*;
        match self {
            Kilogram | Gram | SolarMass | JupiterMass | EarthMass => Dimension::Mass,
            Meter | Kilometer | AstronomicalUnit | Parsec | Kiloparsec | Megaparsec
            | LightYear => Dimension::Length,
            Radian | Degree | Arcminute | Arcsecond | Milliarcsecond | Microarcsecond => {
                Dimension::Angle
            }
            MeterPerSecond | KilometerPerSecond => Dimension::Velocity,
            Second | Hour | Day | Year => Dimension::Time,
        }
    }
    /// Value of one unit in SI
    pub fn si_factor(&self) -> f64 {
        use Unit::*;
        let arcsec = PI / 180. / 3600.;
        match self {
            Kilogram => 1.,
            Gram => 1e-3,
            SolarMass => SOLAR_MASS,
            JupiterMass => JUPITER_MASS,
            EarthMass => EARTH_MASS,
            Meter => 1.,
            Kilometer => 1e3,
            AstronomicalUnit => ASTRONOMICAL_UNIT,
            Parsec => PARSEC,
            Kiloparsec => 1e3 * PARSEC,
            Megaparsec => 1e6 * PARSEC,
            LightYear => LIGHT_YEAR,
            Radian => 1.,
            Degree => PI / 180.,
            Arcminute => PI / 180. / 60.,
            Arcsecond => arcsec,
            Milliarcsecond => 1e-3 * arcsec,
            Microarcsecond => 1e-6 * arcsec,
            MeterPerSecond => 1.,
            KilometerPerSecond => 1e3,
            Second => 1.,
            Hour => 3600.,
            Day => DAY,
            Year => YEAR,
        }
    }
}

/// A value attached to a unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}
impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
    /// Returns the value in SI units
    pub fn to_si(&self) -> f64 {
        self.value * self.unit.si_factor()
    }
    /// Converts the quantity to another unit of the same dimension
    pub fn to(&self, unit: Unit) -> Result<Self> {
        let value = to_canonical(*self, unit.dimension())?;
        Ok(Self::new(from_canonical(value, unit), unit))
    }
}
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
impl FromStr for Quantity {
    type Err = UnitsError;

    /// Parses "<value> <unit>", e.g. "4e3 pc" or "0.1mas"
    fn from_str(s: &str) -> Result<Self> {
        let re = regex::Regex::new(
            r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*([A-Za-z/]+)\s*$",
        )?;
        let caps = re
            .captures(s)
            .ok_or_else(|| UnitsError::Pattern(s.to_string()))?;
        let value: f64 = caps[1].parse()?;
        let unit = Unit::from_str(&caps[2]).map_err(|_| UnitsError::UnknownUnit(caps[2].into()))?;
        Ok(Self::new(value, unit))
    }
}

/// Normalizes a quantity of the given dimension to SI
pub fn to_canonical(quantity: Quantity, dimension: Dimension) -> Result<f64> {
    let found = quantity.unit.dimension();
    if found != dimension {
        return Err(UnitsError::Dimension {
            expected: dimension,
            found,
            unit: quantity.unit,
        });
    }
    Ok(quantity.to_si())
}

/// Converts a SI value into the given unit
pub fn from_canonical(value: f64, unit: Unit) -> f64 {
    value / unit.si_factor()
}
