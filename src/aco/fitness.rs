//! Multi-objective assignment cost.
//!
//! The scalar cost of a complete assignment is
//!
//! ```text
//! Σ_cities [d > 0] (α·d + β·max(0, stress + load_so_far/capacity·100 − threshold))
//!   + γ · Σ_running (load_i − mean_running_load)²
//!   + activation_cost · |running|
//! ```
//!
//! `load_so_far` accumulates in assignment order, so the stress penalty of
//! a city depends on which cities were placed on the same server before it.
//! Lower is better.

use crate::model::{server_loads, City, CityAssignment, Server};

/// Objective weights.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessWeights {
    /// Distance weight.
    pub alpha: f64,
    /// Stress-penalty weight.
    pub beta: f64,
    /// Load-imbalance weight.
    pub gamma: f64,
    /// Cost per running server.
    pub activation_cost: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.5,
            activation_cost: 0.01,
        }
    }
}

/// Computes the cost of a complete assignment against the current server
/// states.
///
/// A city whose distance to its server is exactly zero contributes neither
/// distance nor stress penalty, but its demand still counts towards the
/// server's load.
pub fn fitness(
    assignment: &[usize],
    cities: &[City],
    servers: &[Server],
    weights: &FitnessWeights,
) -> f64 {
    let mut loads = vec![0.0; servers.len()];
    let mut cost = 0.0;

    for (city, &server_idx) in cities.iter().zip(assignment) {
        let server = &servers[server_idx];
        let distance = city.location().distance_km(&server.location());

        loads[server_idx] += city.demand();
        let projected = server.stress() + loads[server_idx] / server.capacity() * 100.0;
        let penalty = (projected - server.threshold()).max(0.0);

        if distance != 0.0 {
            cost += weights.alpha * distance + weights.beta * penalty;
        }
    }

    cost += weights.gamma * load_imbalance(&loads, servers);
    cost += weights.activation_cost * running_count(servers) as f64;
    cost
}

/// Sum of squared deviations of running-server loads from their mean.
///
/// Not divided by the number of servers. Zero when nothing is running.
pub fn load_imbalance(loads: &[f64], servers: &[Server]) -> f64 {
    let running: Vec<f64> = servers
        .iter()
        .zip(loads)
        .filter(|(s, _)| s.is_running())
        .map(|(_, &load)| load)
        .collect();
    if running.is_empty() {
        return 0.0;
    }
    let mean = running.iter().sum::<f64>() / running.len() as f64;
    running.iter().map(|l| (l - mean).powi(2)).sum()
}

pub fn running_count(servers: &[Server]) -> usize {
    servers.iter().filter(|s| s.is_running()).count()
}

/// Server utilization for an assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Utilization {
    /// Mean load/capacity over running servers, 0 when none run.
    pub mean_utilization: f64,
    /// Number of running servers.
    pub active_servers: usize,
}

/// Mean utilization and running count. Unassigned cities are skipped.
pub fn utilization<A>(assignment: &A, cities: &[City], servers: &[Server]) -> Utilization
where
    A: CityAssignment + ?Sized,
{
    let loads = server_loads(assignment, cities, servers);
    let ratios: Vec<f64> = servers
        .iter()
        .zip(&loads)
        .filter(|(s, _)| s.is_running())
        .map(|(s, load)| load / s.capacity())
        .collect();

    let mean_utilization = if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    };

    Utilization {
        mean_utilization,
        active_servers: ratios.len(),
    }
}

/// Load carried by one server under an assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerLoad {
    pub server_id: String,
    /// Aggregate demand of the cities assigned to the server.
    pub load: f64,
    /// `load / capacity · 100`, capped at 100.
    pub load_percent: f64,
}

/// Per-server load report, in server order.
///
/// Every server appears, running or not. `load_percent` is the value a
/// caller would use to refresh a server's stress after deployment.
pub fn final_server_loads<A>(
    assignment: &A,
    cities: &[City],
    servers: &[Server],
) -> Vec<ServerLoad>
where
    A: CityAssignment + ?Sized,
{
    server_loads(assignment, cities, servers)
        .into_iter()
        .zip(servers)
        .map(|(load, server)| ServerLoad {
            server_id: server.id().to_string(),
            load,
            load_percent: (load / server.capacity() * 100.0).min(100.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint, EARTH_RADIUS_KM};
    use crate::model::ServerStatus;

    fn server(
        long: f64,
        capacity: f64,
        stress: f64,
        threshold: f64,
        status: ServerStatus,
    ) -> Server {
        Server::new("s", GeoPoint::new(0.0, long), capacity, stress, threshold, status).unwrap()
    }

    fn weights(alpha: f64, beta: f64, gamma: f64) -> FitnessWeights {
        FitnessWeights {
            alpha,
            beta,
            gamma,
            activation_cost: 0.01,
        }
    }

    #[test]
    fn test_imbalance_sum_of_squares() {
        let servers: Vec<Server> = (0..3)
            .map(|i| server(i as f64, 100.0, 0.0, 80.0, ServerStatus::Running))
            .collect();
        assert!((load_imbalance(&[10.0, 20.0, 30.0], &servers) - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_imbalance_ignores_down_servers() {
        let servers = vec![
            server(0.0, 100.0, 0.0, 80.0, ServerStatus::Running),
            server(1.0, 100.0, 0.0, 80.0, ServerStatus::Down),
            server(2.0, 100.0, 0.0, 80.0, ServerStatus::Running),
        ];
        // Running loads 10 and 30, mean 20.
        assert!((load_imbalance(&[10.0, 500.0, 30.0], &servers) - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_fitness_colocated_cities_only_imbalance_and_activation() {
        let servers: Vec<Server> = (0..3)
            .map(|i| server(i as f64, 100.0, 0.0, 80.0, ServerStatus::Running))
            .collect();
        let cities = vec![
            City::new("a", 0.0, 0.0, 10.0).unwrap(),
            City::new("b", 0.0, 1.0, 20.0).unwrap(),
            City::new("c", 0.0, 2.0, 30.0).unwrap(),
        ];
        let cost = fitness(&[0, 1, 2], &cities, &servers, &weights(1.0, 1.0, 1.0));
        assert!((cost - (200.0 + 0.03)).abs() < 1e-9, "got {cost}");
    }

    #[test]
    fn test_fitness_zero_distance_skips_penalty() {
        // Heavily overloaded but co-located: no penalty contribution.
        let servers = vec![server(0.0, 10.0, 90.0, 50.0, ServerStatus::Running)];
        let cities = vec![City::new("a", 0.0, 0.0, 100.0).unwrap()];
        let cost = fitness(&[0], &cities, &servers, &weights(1.0, 1.0, 1.0));
        assert!((cost - 0.01).abs() < 1e-12, "got {cost}");
    }

    #[test]
    fn test_fitness_penalty_is_order_dependent() {
        // Capacity 100, stress 0, threshold 50. Cities placed at 1° east.
        let servers = vec![server(0.0, 100.0, 0.0, 50.0, ServerStatus::Running)];
        let cities = vec![
            City::new("a", 0.0, 1.0, 40.0).unwrap(),
            City::new("b", 0.0, 1.0, 40.0).unwrap(),
        ];
        let d = EARTH_RADIUS_KM * 1f64.to_radians();
        // First city sees 40% (no penalty), second sees 80% (penalty 30).
        let expected = 2.0 * d + 30.0 + 0.01;
        let cost = fitness(&[0, 0], &cities, &servers, &weights(1.0, 1.0, 0.0));
        assert!((cost - expected).abs() < 1e-9, "got {cost}, expected {expected}");
    }

    #[test]
    fn test_fitness_no_running_servers() {
        let servers = vec![server(0.0, 100.0, 0.0, 80.0, ServerStatus::Down)];
        let cities = vec![City::new("a", 0.0, 0.0, 10.0).unwrap()];
        assert_eq!(fitness(&[0], &cities, &servers, &weights(1.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_utilization() {
        let servers = vec![
            server(0.0, 100.0, 0.0, 80.0, ServerStatus::Running),
            server(1.0, 200.0, 0.0, 80.0, ServerStatus::Running),
            server(2.0, 100.0, 0.0, 80.0, ServerStatus::Down),
        ];
        let cities = vec![
            City::new("a", 0.0, 0.0, 50.0).unwrap(),
            City::new("b", 0.0, 1.0, 50.0).unwrap(),
        ];
        let u = utilization(&[0usize, 1][..], &cities, &servers);
        assert_eq!(u.active_servers, 2);
        assert!((u.mean_utilization - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_utilization_nothing_running() {
        let servers = vec![server(0.0, 100.0, 0.0, 80.0, ServerStatus::Down)];
        let cities = vec![City::new("a", 0.0, 0.0, 50.0).unwrap()];
        let u = utilization(&[Some(0usize)][..], &cities, &servers);
        assert_eq!(u.active_servers, 0);
        assert_eq!(u.mean_utilization, 0.0);
    }

    #[test]
    fn test_final_server_loads_caps_percent() {
        let servers = vec![
            server(0.0, 100.0, 0.0, 80.0, ServerStatus::Running),
            server(1.0, 200.0, 0.0, 80.0, ServerStatus::Running),
            server(2.0, 100.0, 0.0, 80.0, ServerStatus::Down),
        ];
        let cities = vec![
            City::new("a", 0.0, 0.0, 90.0).unwrap(),
            City::new("b", 0.0, 0.5, 60.0).unwrap(),
            City::new("c", 0.0, 1.0, 50.0).unwrap(),
        ];
        let report = final_server_loads(&[0usize, 0, 1][..], &cities, &servers);

        assert_eq!(report.len(), 3);
        assert_eq!(report[0].load, 150.0);
        assert_eq!(report[0].load_percent, 100.0);
        assert_eq!(report[1].load, 50.0);
        assert!((report[1].load_percent - 25.0).abs() < 1e-12);
        assert_eq!(report[2].load, 0.0);
        assert_eq!(report[2].load_percent, 0.0);
    }
}
