//! Domain model: demand points, facilities and assignments.
//!
//! [`City`] and [`Server`] are validated once at construction and are the
//! only record types the optimizer accepts. Loose rows from an external
//! loader ([`CityRecord`], [`ServerRecord`]) convert into them via
//! `TryFrom`.

mod assignment;
mod city;
mod server;

pub use assignment::{server_loads, CityAssignment};
pub use city::{City, CityRecord};
pub use server::{Server, ServerRecord, ServerStatus};

use crate::error::ModelError;
use crate::geo::GeoPoint;

/// Validates a coordinate pair.
fn validate_location(lat: f64, long: f64) -> Result<GeoPoint, ModelError> {
    finite("lat", lat)?;
    finite("long", long)?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ModelError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&long) {
        return Err(ModelError::LongitudeOutOfRange(long));
    }
    Ok(GeoPoint::new(lat, long))
}

fn finite(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFinite { field, value })
    }
}
