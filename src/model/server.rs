//! Capacity-constrained facilities.

use std::fmt;
use std::str::FromStr;

use super::{finite, validate_location};
use crate::error::ModelError;
use crate::geo::GeoPoint;

/// Operational status of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerStatus {
    Running,
    Down,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerStatus::Running => f.write_str("Running"),
            ServerStatus::Down => f.write_str("Down"),
        }
    }
}

impl FromStr for ServerStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("running") => Ok(ServerStatus::Running),
            s if s.eq_ignore_ascii_case("down") => Ok(ServerStatus::Down),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// A facility that serves city demand.
///
/// Location, capacity and threshold are fixed. Status and stress change
/// during a run, but only through the facility policy or an ant's
/// emergency activation, so their setters are crate-private.
///
/// Stress ("CPU health") is conceptually on a 0–100 scale. Nothing clips
/// it; projected stress in the objective routinely exceeds 100.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ServerRecord", into = "ServerRecord"))]
pub struct Server {
    id: String,
    location: GeoPoint,
    capacity: f64,
    stress: f64,
    threshold: f64,
    status: ServerStatus,
}

impl Server {
    /// Creates a server after validating its fields.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] for bad coordinates, non-positive capacity,
    /// or non-finite stress/threshold.
    pub fn new(
        id: impl Into<String>,
        location: GeoPoint,
        capacity: f64,
        stress: f64,
        threshold: f64,
        status: ServerStatus,
    ) -> Result<Self, ModelError> {
        let location = validate_location(location.lat, location.long)?;
        let capacity = finite("capacity", capacity)?;
        if capacity <= 0.0 {
            return Err(ModelError::NonPositiveCapacity(capacity));
        }
        Ok(Self {
            id: id.into(),
            location,
            capacity,
            stress: finite("stress", stress)?,
            threshold: finite("threshold", threshold)?,
            status,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Current stress level.
    pub fn stress(&self) -> f64 {
        self.stress
    }

    /// Stress level above which load is penalized.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == ServerStatus::Running
    }

    /// Brings the server up with the given initial stress.
    pub(crate) fn activate(&mut self, stress: f64) {
        self.status = ServerStatus::Running;
        self.stress = stress;
    }

    /// Takes the server down and resets its stress.
    pub(crate) fn shut_down(&mut self) {
        self.status = ServerStatus::Down;
        self.stress = 0.0;
    }
}

/// An unvalidated server row as produced by an external loader.
///
/// `status` is the loader's free-form string (`"Running"` / `"Down"`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerRecord {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub capacity: f64,
    pub cpu_health: f64,
    pub threshold: f64,
    pub status: String,
}

impl Default for ServerRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            lat: 0.0,
            long: 0.0,
            capacity: 15_000.0,
            cpu_health: 0.0,
            threshold: 80.0,
            status: ServerStatus::Running.to_string(),
        }
    }
}

impl TryFrom<ServerRecord> for Server {
    type Error = ModelError;

    fn try_from(record: ServerRecord) -> Result<Self, Self::Error> {
        let status = record.status.parse()?;
        Server::new(
            record.id,
            GeoPoint::new(record.lat, record.long),
            record.capacity,
            record.cpu_health,
            record.threshold,
            status,
        )
    }
}

impl From<Server> for ServerRecord {
    fn from(server: Server) -> Self {
        Self {
            id: server.id,
            lat: server.location.lat,
            long: server.location.long,
            capacity: server.capacity,
            cpu_health: server.stress,
            threshold: server.threshold,
            status: server.status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: ServerStatus) -> Server {
        Server::new("edge-1", GeoPoint::new(1.3521, 103.8198), 1000.0, 40.0, 80.0, status).unwrap()
    }

    #[test]
    fn test_valid_server() {
        let s = server(ServerStatus::Running);
        assert_eq!(s.id(), "edge-1");
        assert!(s.is_running());
        assert_eq!(s.capacity(), 1000.0);
        assert_eq!(s.stress(), 40.0);
        assert_eq!(s.threshold(), 80.0);
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        let err = Server::new("x", GeoPoint::new(0.0, 0.0), 0.0, 0.0, 80.0, ServerStatus::Down);
        assert_eq!(err, Err(ModelError::NonPositiveCapacity(0.0)));
    }

    #[test]
    fn test_rejects_non_finite_stress() {
        let err = Server::new(
            "x",
            GeoPoint::new(0.0, 0.0),
            10.0,
            f64::INFINITY,
            80.0,
            ServerStatus::Down,
        );
        assert!(matches!(err, Err(ModelError::NonFinite { field: "stress", .. })));
    }

    #[test]
    fn test_activate_and_shut_down() {
        let mut s = server(ServerStatus::Down);
        s.activate(30.0);
        assert!(s.is_running());
        assert_eq!(s.stress(), 30.0);
        s.shut_down();
        assert_eq!(s.status(), ServerStatus::Down);
        assert_eq!(s.stress(), 0.0);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Running".parse::<ServerStatus>(), Ok(ServerStatus::Running));
        assert_eq!(" down ".parse::<ServerStatus>(), Ok(ServerStatus::Down));
        assert_eq!(
            "Idle".parse::<ServerStatus>(),
            Err(ModelError::UnknownStatus("Idle".into()))
        );
    }

    #[test]
    fn test_record_conversion() {
        let record = ServerRecord {
            id: "cdn-7".into(),
            lat: 52.52,
            long: 13.405,
            status: "Down".into(),
            ..ServerRecord::default()
        };
        let s = Server::try_from(record.clone()).unwrap();
        assert_eq!(s.status(), ServerStatus::Down);
        assert_eq!(s.capacity(), 15_000.0);
        assert_eq!(ServerRecord::from(s), record);
    }
}
