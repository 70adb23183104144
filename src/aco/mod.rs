//! Ant Colony Optimization for capacity-constrained server assignment.
//!
//! Each iteration a colony of ants assigns every city to a running server,
//! guided by a bounded pheromone field and by distance and projected stress.
//! The global best assignment drives a bring-up / shut-down policy on the
//! shared server list, so later ants may see a different set of running
//! servers than earlier ones.
//!
//! # Key Types
//!
//! - [`AcoConfig`]: Algorithm parameters and objective weights
//! - [`AcoRunner`]: Executes the optimizer loop
//! - [`AcoResult`]: Best assignment, cost traces and final-iteration ants
//! - [`PheromoneField`]: Bounded (city, server) desirability matrix
//! - [`FacilityPolicy`]: Server bring-up / shut-down thresholds
//!
//! # References
//!
//! - Dorigo & Stützle (2004), *Ant Colony Optimization*, MIT Press
//! - Dorigo & Gambardella (1997), "Ant Colony System"
//! - Stützle & Hoos (2000), "MAX-MIN Ant System"

mod ant;
mod config;
mod facility;
pub mod fitness;
mod pheromone;
mod runner;

pub use ant::{Ant, Candidate};
pub use config::{AcoConfig, ConstructionMode};
pub use facility::{CatchmentRule, FacilityPolicy, Transitions};
pub use fitness::{FitnessWeights, ServerLoad, Utilization};
pub use pheromone::PheromoneField;
pub use runner::{AcoResult, AcoRunner, IterationStats};
