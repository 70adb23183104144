//! Demand points.

use super::{finite, validate_location};
use crate::error::ModelError;
use crate::geo::GeoPoint;

/// A demand point. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CityRecord", into = "CityRecord"))]
pub struct City {
    id: String,
    location: GeoPoint,
    demand: f64,
}

impl City {
    /// Creates a city after validating its coordinates and demand.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] for non-finite or out-of-range coordinates
    /// and for non-positive demand.
    pub fn new(
        id: impl Into<String>,
        lat: f64,
        long: f64,
        demand: f64,
    ) -> Result<Self, ModelError> {
        let location = validate_location(lat, long)?;
        let demand = finite("demand", demand)?;
        if demand <= 0.0 {
            return Err(ModelError::NonPositiveDemand(demand));
        }
        Ok(Self {
            id: id.into(),
            location,
            demand,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Demand in usage units per hour.
    pub fn demand(&self) -> f64 {
        self.demand
    }
}

/// An unvalidated city row as produced by an external loader.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CityRecord {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub usage_per_hour: f64,
}

impl TryFrom<CityRecord> for City {
    type Error = ModelError;

    fn try_from(record: CityRecord) -> Result<Self, Self::Error> {
        City::new(record.id, record.lat, record.long, record.usage_per_hour)
    }
}

impl From<City> for CityRecord {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            lat: city.location.lat,
            long: city.location.long,
            usage_per_hour: city.demand,
        }
    }
}
