//! Solution construction.
//!
//! An [`Ant`] places cities one at a time in ascending index order. For
//! each city it scores every running server by
//!
//! ```text
//! τ(c, s)^α · 1/(d(c, s) + ε) · 1/(1 + β·max(0, stress_s + load%_s − threshold_s))
//! ```
//!
//! where `load%_s` is the server's projected load (this ant's accumulated
//! load plus the city's demand) as a percentage of capacity. With
//! probability `q0` the best-scoring server is taken; otherwise one is
//! drawn from the normalized scores (ACS pseudo-random proportional rule).
//!
//! If no server is running, the `Down` server nearest to the city is brought
//! up on the spot. This mutates the shared server list.
//!
//! # References
//!
//! - Dorigo & Gambardella (1997), "Ant Colony System: A Cooperative
//!   Learning Approach to the Traveling Salesman Problem", *IEEE TEC* 1(1).

use rand::Rng;
use tracing::warn;

use super::config::AcoConfig;
use super::pheromone::PheromoneField;
use crate::error::{AcoError, Result};
use crate::model::{City, Server};

/// A complete assignment built by one ant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Server index per city.
    pub assignment: Vec<usize>,
    /// Demand this ant placed on each server.
    pub loads: Vec<f64>,
    /// Servers this ant brought up through emergency activation, in order.
    pub activated: Vec<usize>,
}

/// Construction parameters for one ant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ant {
    /// Pheromone exponent.
    pub alpha: f64,
    /// Stress-penalty weight.
    pub beta: f64,
    pub distance_epsilon: f64,
    pub emergency_activation_stress: f64,
}

impl Ant {
    pub fn from_config(config: &AcoConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta,
            distance_epsilon: config.distance_epsilon,
            emergency_activation_stress: config.emergency_activation_stress,
        }
    }

    /// Builds a complete assignment.
    ///
    /// `q0` is the probability of a greedy choice for each city.
    ///
    /// # Errors
    ///
    /// [`AcoError::NoServerAvailable`] if a city is reached with no running
    /// server and no `Down` server to bring up.
    pub fn construct<R: Rng>(
        &self,
        pheromone: &PheromoneField,
        cities: &[City],
        servers: &mut [Server],
        q0: f64,
        rng: &mut R,
    ) -> Result<Candidate> {
        let mut assignment = Vec::with_capacity(cities.len());
        let mut loads = vec![0.0; servers.len()];
        let mut activated = Vec::new();
        let mut candidates: Vec<(usize, f64)> = Vec::with_capacity(servers.len());

        for (city_idx, city) in cities.iter().enumerate() {
            candidates.clear();
            for (server_idx, server) in servers.iter().enumerate() {
                if !server.is_running() {
                    continue;
                }
                let score = self.attractiveness(
                    pheromone.get(city_idx, server_idx),
                    city,
                    server,
                    loads[server_idx],
                );
                candidates.push((server_idx, score));
            }

            if candidates.is_empty() {
                let server_idx = self.activate_nearest(city_idx, city, servers)?;
                activated.push(server_idx);
                candidates.push((server_idx, 1.0));
            }

            let chosen = if rng.random::<f64>() < q0 {
                greedy_pick(&candidates)
            } else {
                sample(&candidates, rng)
            };

            assignment.push(chosen);
            loads[chosen] += city.demand();
        }

        Ok(Candidate {
            assignment,
            loads,
            activated,
        })
    }

    /// Desirability of placing `city` on `server` given the server's load
    /// so far.
    pub fn attractiveness(
        &self,
        pheromone: f64,
        city: &City,
        server: &Server,
        current_load: f64,
    ) -> f64 {
        let distance = city.location().distance_km(&server.location());
        let projected_load = current_load + city.demand();
        let load_percent = projected_load / server.capacity() * 100.0;
        let projected_stress = server.stress() + load_percent;
        let penalty = (projected_stress - server.threshold()).max(0.0) * self.beta;

        pheromone.powf(self.alpha)
            * (1.0 / (distance + self.distance_epsilon))
            * (1.0 / (1.0 + penalty))
    }

    /// Brings up the `Down` server closest to `city`.
    fn activate_nearest(
        &self,
        city_idx: usize,
        city: &City,
        servers: &mut [Server],
    ) -> Result<usize> {
        let mut nearest: Option<(usize, f64)> = None;
        for (idx, server) in servers.iter().enumerate() {
            if server.is_running() {
                continue;
            }
            let d = city.location().distance_km(&server.location());
            if nearest.is_none_or(|(_, best)| d < best) {
                nearest = Some((idx, d));
            }
        }

        let (idx, distance) = nearest.ok_or(AcoError::NoServerAvailable { city: city_idx })?;
        let server = &mut servers[idx];
        server.activate(self.emergency_activation_stress);
        warn!(
            server = server.id(),
            city = city.id(),
            distance_km = distance,
            "no running server, emergency activation"
        );
        Ok(idx)
    }
}

/// Index of the highest score; the first one wins ties.
fn greedy_pick(candidates: &[(usize, f64)]) -> usize {
    let mut best = candidates[0];
    for &c in &candidates[1..] {
        if c.1 > best.1 {
            best = c;
        }
    }
    best.0
}

/// Roulette-wheel draw over normalized scores, uniform when all scores are 0.
fn sample<R: Rng>(candidates: &[(usize, f64)], rng: &mut R) -> usize {
    let total: f64 = candidates.iter().map(|&(_, s)| s).sum();
    let uniform = 1.0 / candidates.len() as f64;

    let roll = rng.random::<f64>();
    let mut cumulative = 0.0;
    for &(idx, score) in candidates {
        cumulative += if total == 0.0 { uniform } else { score / total };
        if roll < cumulative {
            return idx;
        }
    }
    // Rounding can leave the cumulative sum just under 1.
    candidates[candidates.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::model::ServerStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn server(long: f64, capacity: f64, status: ServerStatus) -> Server {
        Server::new("s", GeoPoint::new(0.0, long), capacity, 0.0, 80.0, status).unwrap()
    }

    fn ant() -> Ant {
        Ant::from_config(&AcoConfig::default())
    }

    #[test]
    fn test_single_running_server_takes_everything() {
        let cities = vec![
            City::new("a", 0.0, 0.5, 100.0).unwrap(),
            City::new("b", 0.0, 5.0, 500.0).unwrap(),
        ];
        let mut servers = vec![
            server(0.0, 1000.0, ServerStatus::Running),
            server(5.0, 1000.0, ServerStatus::Down),
        ];
        let pheromone = PheromoneField::new(2, 2, 1.0, 0.1, 10.0);
        let mut rng = StdRng::seed_from_u64(7);

        let c = ant().construct(&pheromone, &cities, &mut servers, 0.0, &mut rng).unwrap();
        assert_eq!(c.assignment, vec![0, 0]);
        assert_eq!(c.loads, vec![600.0, 0.0]);
        assert!(c.activated.is_empty());
        assert_eq!(servers[1].status(), ServerStatus::Down);
    }

    #[test]
    fn test_emergency_activation_picks_nearest_down_server() {
        let cities = vec![City::new("a", 0.0, 9.0, 100.0).unwrap()];
        let mut servers = vec![
            server(0.0, 1000.0, ServerStatus::Down),
            server(10.0, 1000.0, ServerStatus::Down),
        ];
        let pheromone = PheromoneField::new(1, 2, 1.0, 0.1, 10.0);
        let mut rng = StdRng::seed_from_u64(1);

        let c = ant().construct(&pheromone, &cities, &mut servers, 0.5, &mut rng).unwrap();
        assert_eq!(c.assignment, vec![1]);
        assert_eq!(c.activated, vec![1]);
        assert!(servers[1].is_running());
        assert_eq!(servers[1].stress(), 30.0);
        assert_eq!(servers[0].status(), ServerStatus::Down);
    }

    #[test]
    fn test_activation_happens_once() {
        // The first city brings a server up; the second sees it running.
        let cities = vec![
            City::new("a", 0.0, 1.0, 10.0).unwrap(),
            City::new("b", 0.0, 2.0, 10.0).unwrap(),
        ];
        let mut servers = vec![server(0.0, 1000.0, ServerStatus::Down)];
        let pheromone = PheromoneField::new(2, 1, 1.0, 0.1, 10.0);
        let mut rng = StdRng::seed_from_u64(3);

        let c = ant().construct(&pheromone, &cities, &mut servers, 0.0, &mut rng).unwrap();
        assert_eq!(c.assignment, vec![0, 0]);
        assert_eq!(c.activated, vec![0]);
    }

    #[test]
    fn test_no_server_is_fatal() {
        let cities = vec![City::new("a", 0.0, 0.0, 10.0).unwrap()];
        let mut servers: Vec<Server> = Vec::new();
        let pheromone = PheromoneField::new(1, 0, 1.0, 0.1, 10.0);
        let mut rng = StdRng::seed_from_u64(0);

        let err = ant().construct(&pheromone, &cities, &mut servers, 0.0, &mut rng);
        assert_eq!(err, Err(AcoError::NoServerAvailable { city: 0 }));
    }

    #[test]
    fn test_greedy_prefers_closest_server() {
        let cities = vec![City::new("a", 0.0, 1.0, 10.0).unwrap()];
        let mut servers = vec![
            server(20.0, 1000.0, ServerStatus::Running),
            server(1.5, 1000.0, ServerStatus::Running),
            server(-30.0, 1000.0, ServerStatus::Running),
        ];
        let pheromone = PheromoneField::new(1, 3, 1.0, 0.1, 10.0);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let c = ant().construct(&pheromone, &cities, &mut servers, 1.0, &mut rng).unwrap();
            assert_eq!(c.assignment, vec![1]);
        }
    }

    #[test]
    fn test_attractiveness_penalizes_stress() {
        let a = ant();
        let city = City::new("a", 0.0, 1.0, 500.0).unwrap();
        let relaxed = server(0.0, 10_000.0, ServerStatus::Running);
        let loaded = server(0.0, 1000.0, ServerStatus::Running);
        // 5% vs 50% of capacity; threshold 80 not crossed by either.
        let base = a.attractiveness(1.0, &city, &relaxed, 0.0);
        assert!((base - a.attractiveness(1.0, &city, &loaded, 0.0)).abs() < 1e-12);
        // 950/1000 = 95% → penalty 15.
        let ratio = a.attractiveness(1.0, &city, &loaded, 450.0) / base;
        assert!((ratio - 1.0 / 16.0).abs() < 1e-12, "got {ratio}");
    }

    #[test]
    fn test_greedy_pick_first_wins_ties() {
        assert_eq!(greedy_pick(&[(4, 0.5), (2, 0.9), (7, 0.9)]), 2);
    }

    #[test]
    fn test_sample_uniform_when_all_zero() {
        let candidates = [(0, 0.0), (1, 0.0), (2, 0.0), (3, 0.0)];
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[sample(&candidates, &mut rng)] += 1;
        }
        for (i, &n) in counts.iter().enumerate() {
            assert!(n > 800 && n < 1200, "candidate {i} drawn {n} times");
        }
    }

    #[test]
    fn test_sample_follows_weights() {
        let candidates = [(0, 1.0), (1, 3.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let hits = (0..4000).filter(|_| sample(&candidates, &mut rng) == 1).count();
        assert!(hits > 2800 && hits < 3200, "heavy candidate drawn {hits} times");
    }
}
