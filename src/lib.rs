//! Ant Colony Optimization for CDN server assignment.
//!
//! Assigns demand points ("cities") to capacity-constrained facilities
//! ("servers") under several competing objectives:
//!
//! - **Distance**: great-circle distance from each city to its server
//! - **Stress**: penalty when a server's projected stress exceeds its threshold
//! - **Load balance**: squared deviation of running-server loads
//! - **Activation cost**: a small charge per running server
//!
//! Servers are brought up and shut down while the search runs: ants
//! bring the nearest server up when nothing is running, and every new global
//! best passes through a [`FacilityPolicy`](aco::FacilityPolicy).
//!
//! # Architecture
//!
//! - [`geo`]: Haversine distance
//! - [`model`]: Validated [`City`](model::City) / [`Server`](model::Server)
//!   records and assignment views
//! - [`aco`]: Pheromone field, ants, fitness, facility policy, optimizer loop
//! - [`error`]: Error types
//!
//! Data loading and rendering are left to the caller; the optimizer takes
//! plain records and returns a plain [`AcoResult`](aco::AcoResult).
//!
//! # Example
//!
//! ```
//! use u_cdn_aco::aco::{AcoConfig, AcoRunner};
//! use u_cdn_aco::geo::GeoPoint;
//! use u_cdn_aco::model::{City, Server, ServerStatus};
//!
//! let cities = vec![
//!     City::new("Berlin", 52.52, 13.405, 400.0).unwrap(),
//!     City::new("Paris", 48.8566, 2.3522, 600.0).unwrap(),
//! ];
//! let mut servers = vec![
//!     Server::new("fra-1", GeoPoint::new(50.11, 8.68), 5000.0, 20.0, 80.0, ServerStatus::Running)
//!         .unwrap(),
//!     Server::new("ams-1", GeoPoint::new(52.37, 4.90), 5000.0, 20.0, 80.0, ServerStatus::Down)
//!         .unwrap(),
//! ];
//!
//! let config = AcoConfig::default().with_iterations(10).with_seed(42);
//! let result = AcoRunner::run(&cities, &mut servers, &config).unwrap();
//! assert_eq!(result.best_assignment.len(), 2);
//! ```

pub mod aco;
pub mod error;
pub mod geo;
pub mod model;

pub use error::{AcoError, ModelError};
