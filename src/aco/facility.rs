//! Facility bring-up / shut-down policy.
//!
//! Applied by the optimizer loop whenever a new global best assignment is
//! found, and once more after the last iteration. The policy is a single
//! pass over servers in index order:
//!
//! - a `Down` server whose catchment demand exceeds
//!   `activation_fraction × capacity` is brought up with
//!   `activation_stress`;
//! - a `Running` server whose aggregate load is below
//!   `deactivation_fraction × capacity` is shut down (stress reset to 0).
//!
//! Both comparisons are strict. A server brought up in a pass is not
//! reconsidered for shut-down in the same pass.

use tracing::debug;

use crate::model::{server_loads, City, CityAssignment, Server};

/// Which cities count towards a `Down` server's catchment demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatchmentRule {
    /// Only cities that are currently unassigned.
    ///
    /// The optimizer always passes complete assignments, so under this rule
    /// a `Down` server is never brought up by the policy. Only emergency
    /// activation during construction brings servers up.
    #[default]
    Unassigned,

    /// Every city within the radius, assigned or not.
    ///
    /// Alternate reading of the catchment rule. Changes optimizer outcomes;
    /// opt-in only.
    AllWithinRadius,
}

/// Thresholds of the bring-up / shut-down policy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FacilityPolicy {
    /// Catchment demand must exceed this fraction of capacity to bring a
    /// server up.
    pub activation_fraction: f64,
    /// Load must fall below this fraction of capacity to shut a server down.
    pub deactivation_fraction: f64,
    /// Catchment radius in kilometers.
    pub radius_km: f64,
    /// Stress assigned on policy-driven bring-up.
    pub activation_stress: f64,
    pub catchment: CatchmentRule,
}

impl Default for FacilityPolicy {
    fn default() -> Self {
        Self {
            activation_fraction: 0.3,
            deactivation_fraction: 0.1,
            radius_km: 1000.0,
            activation_stress: 10.0,
            catchment: CatchmentRule::Unassigned,
        }
    }
}

/// Servers whose status changed in one policy pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
    pub activated: Vec<usize>,
    pub deactivated: Vec<usize>,
}

impl Transitions {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

impl FacilityPolicy {
    pub fn with_catchment(mut self, rule: CatchmentRule) -> Self {
        self.catchment = rule;
        self
    }

    /// Validates the thresholds.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.activation_fraction >= 0.0 && self.activation_fraction.is_finite()) {
            return Err(format!(
                "activation_fraction must be finite and non-negative, got {}",
                self.activation_fraction
            ));
        }
        if !(self.deactivation_fraction >= 0.0 && self.deactivation_fraction.is_finite()) {
            return Err(format!(
                "deactivation_fraction must be finite and non-negative, got {}",
                self.deactivation_fraction
            ));
        }
        if self.radius_km.is_nan() || self.radius_km < 0.0 {
            return Err(format!("radius_km must be non-negative, got {}", self.radius_km));
        }
        if !self.activation_stress.is_finite() {
            return Err(format!(
                "activation_stress must be finite, got {}",
                self.activation_stress
            ));
        }
        Ok(())
    }

    /// Applies the policy to `servers` in place.
    pub fn apply<A>(&self, assignment: &A, cities: &[City], servers: &mut [Server]) -> Transitions
    where
        A: CityAssignment + ?Sized,
    {
        let loads = server_loads(assignment, cities, servers);
        let mut transitions = Transitions::default();

        for (idx, server) in servers.iter_mut().enumerate() {
            if server.is_running() {
                if loads[idx] < server.capacity() * self.deactivation_fraction {
                    server.shut_down();
                    debug!(server = server.id(), load = loads[idx], "server shut down");
                    transitions.deactivated.push(idx);
                }
            } else {
                let demand = self.catchment_demand(server, assignment, cities);
                if demand > server.capacity() * self.activation_fraction {
                    server.activate(self.activation_stress);
                    debug!(server = server.id(), demand, "server brought up");
                    transitions.activated.push(idx);
                }
            }
        }

        transitions
    }

    /// Demand of the cities within `radius_km` of `server` that count under
    /// the catchment rule.
    pub fn catchment_demand<A>(&self, server: &Server, assignment: &A, cities: &[City]) -> f64
    where
        A: CityAssignment + ?Sized,
    {
        cities
            .iter()
            .enumerate()
            .filter(|&(idx, _)| match self.catchment {
                CatchmentRule::Unassigned => assignment.server_of(idx).is_none(),
                CatchmentRule::AllWithinRadius => true,
            })
            .filter(|(_, city)| city.location().distance_km(&server.location()) <= self.radius_km)
            .map(|(_, city)| city.demand())
            .sum()
    }
}
