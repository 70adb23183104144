//! ACO optimizer loop.
//!
//! # Algorithm
//!
//! For each of `iterations` steps:
//!
//! 1. `q0_eff = q0 · iteration / iterations`
//! 2. Each of `num_ants` ants builds an assignment against the current
//!    server states and pheromone field
//! 3. Each assignment is scored; on every strict improvement of the global
//!    best the facility policy runs against the new best
//! 4. Best cost, mean ant cost and the global best's utilization are
//!    recorded
//! 5. The field evaporates
//! 6. Every ant is rescored against the server states left at the end of
//!    the iteration. The best `ceil(elite_fraction · num_ants)` of them (at
//!    least one) each deposit `1 / (1 + cost)` on every (city, server) pair
//!    they used
//! 7. The field is re-clamped
//!
//! After the last iteration the facility policy runs once more against the
//! global best. There is no early termination.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::ant::{Ant, Candidate};
use super::config::{AcoConfig, ConstructionMode};
use super::fitness::{final_server_loads, fitness, utilization, FitnessWeights, ServerLoad};
use super::pheromone::PheromoneField;
use crate::error::{AcoError, Result};
use crate::model::{City, Server};

/// Result of an ACO run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoResult {
    /// Best assignment found: server index per city.
    pub best_assignment: Vec<usize>,

    /// Cost of the best assignment at the time it was found.
    pub best_cost: f64,

    /// Best cost so far at the end of each iteration.
    pub best_cost_history: Vec<f64>,

    /// Mean cost of each iteration's ants.
    pub mean_cost_history: Vec<f64>,

    /// Mean running-server utilization of the global best, per iteration.
    pub utilization_history: Vec<f64>,

    /// Number of running servers, per iteration.
    pub active_servers_history: Vec<usize>,

    /// Assignments of the final iteration's ants, in construction order.
    pub final_iteration_assignments: Vec<Vec<usize>>,

    /// Per-server load of the best assignment after the final policy pass.
    pub final_server_loads: Vec<ServerLoad>,
}

/// Statistics recorded at the end of one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    pub best_cost: f64,
    pub mean_cost: f64,
    pub utilization: f64,
    pub active_servers: usize,
}

impl AcoResult {
    /// Number of iterations executed.
    pub fn iterations(&self) -> usize {
        self.best_cost_history.len()
    }

    /// Per-iteration statistics, zipped from the history vectors.
    ///
    /// Stops at the shortest history.
    pub fn history(&self) -> Vec<IterationStats> {
        self.best_cost_history
            .iter()
            .zip(&self.mean_cost_history)
            .zip(&self.utilization_history)
            .zip(&self.active_servers_history)
            .enumerate()
            .map(
                |(iteration, (((&best_cost, &mean_cost), &utilization), &active_servers))| {
                    IterationStats {
                        iteration,
                        best_cost,
                        mean_cost,
                        utilization,
                        active_servers,
                    }
                },
            )
            .collect()
    }
}

/// Global best so far. Starts with no assignment at infinite cost.
struct Best {
    assignment: Vec<usize>,
    cost: f64,
}

impl Best {
    fn new() -> Self {
        Self {
            assignment: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    /// Replaces the best if `cost` is strictly lower.
    fn offer(&mut self, candidate: &Candidate, cost: f64) -> bool {
        if cost < self.cost {
            self.assignment.clone_from(&candidate.assignment);
            self.cost = cost;
            true
        } else {
            false
        }
    }
}

/// Executes the ACO server-assignment optimizer.
///
/// # Usage
///
/// ```ignore
/// let config = AcoConfig::default().with_seed(42);
/// let result = AcoRunner::run(&cities, &mut servers, &config)?;
/// println!("best cost: {}", result.best_cost);
/// ```
pub struct AcoRunner;

impl AcoRunner {
    /// Runs the optimizer with an RNG seeded from `config.seed` (random if
    /// `None`).
    ///
    /// `servers` is updated in place; its final states reflect the last
    /// policy pass.
    pub fn run(cities: &[City], servers: &mut [Server], config: &AcoConfig) -> Result<AcoResult> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::run_with_rng(cities, servers, config, &mut rng)
    }

    /// Runs the optimizer with an explicit random source.
    ///
    /// Two runs with equally seeded generators, equal inputs and
    /// [`ConstructionMode::Sequential`] produce identical results.
    ///
    /// # Errors
    ///
    /// - [`AcoError::InvalidConfig`] if `config` fails validation.
    /// - [`AcoError::NoServerAvailable`] if a city cannot be placed.
    pub fn run_with_rng<R: Rng>(
        cities: &[City],
        servers: &mut [Server],
        config: &AcoConfig,
        rng: &mut R,
    ) -> Result<AcoResult> {
        config.validate().map_err(AcoError::InvalidConfig)?;

        info!(
            cities = cities.len(),
            servers = servers.len(),
            iterations = config.iterations,
            ants = config.num_ants,
            mode = ?config.mode,
            "starting ACO optimization"
        );

        let weights = config.fitness_weights();
        let ant = Ant::from_config(config);
        let mut pheromone = PheromoneField::new(
            cities.len(),
            servers.len(),
            config.initial_pheromone,
            config.min_pheromone,
            config.max_pheromone,
        );

        let mut best = Best::new();
        let mut best_cost_history = Vec::with_capacity(config.iterations);
        let mut mean_cost_history = Vec::with_capacity(config.iterations);
        let mut utilization_history = Vec::with_capacity(config.iterations);
        let mut active_servers_history = Vec::with_capacity(config.iterations);
        let mut final_iteration_assignments = Vec::new();

        for iteration in 0..config.iterations {
            let colony = Colony {
                ant: &ant,
                pheromone: &pheromone,
                cities,
                config,
                weights: &weights,
                q0: config.q0_at(iteration),
            };
            let ants = match config.mode {
                ConstructionMode::Sequential => colony.sequential(servers, &mut best, rng)?,
                ConstructionMode::Batched => colony.batched(servers, &mut best, rng)?,
            };

            let mean_cost = ants.iter().map(|(_, c)| c).sum::<f64>() / ants.len() as f64;
            let util = utilization(best.assignment.as_slice(), cities, servers);

            best_cost_history.push(best.cost);
            mean_cost_history.push(mean_cost);
            utilization_history.push(util.mean_utilization);
            active_servers_history.push(util.active_servers);

            debug!(
                iteration = iteration + 1,
                total = config.iterations,
                ant_cost = ants.last().map_or(f64::NAN, |(_, c)| *c),
                best_cost = best.cost,
                mean_cost,
                active_servers = util.active_servers,
                "iteration complete"
            );

            pheromone.evaporate(config.evaporation_rate);
            let ranked = rescore(&ants, cities, servers, &weights);
            deposit_elite(&mut pheromone, &ranked, config.elite_count());
            pheromone.enforce_bounds();

            final_iteration_assignments = ants.into_iter().map(|(c, _)| c.assignment).collect();
        }

        config.facility.apply(best.assignment.as_slice(), cities, servers);
        let final_server_loads = final_server_loads(best.assignment.as_slice(), cities, servers);

        info!(
            best_cost = best.cost,
            active_servers = servers.iter().filter(|s| s.is_running()).count(),
            "ACO optimization finished"
        );

        Ok(AcoResult {
            best_assignment: best.assignment,
            best_cost: best.cost,
            best_cost_history,
            mean_cost_history,
            utilization_history,
            active_servers_history,
            final_iteration_assignments,
            final_server_loads,
        })
    }
}

/// Read-only inputs shared by all ants of one iteration.
struct Colony<'a> {
    ant: &'a Ant,
    pheromone: &'a PheromoneField,
    cities: &'a [City],
    config: &'a AcoConfig,
    weights: &'a FitnessWeights,
    q0: f64,
}

impl Colony<'_> {
    /// Builds and scores ants one after another against the live server
    /// list.
    fn sequential<R: Rng>(
        &self,
        servers: &mut [Server],
        best: &mut Best,
        rng: &mut R,
    ) -> Result<Vec<(Candidate, f64)>> {
        let mut ants = Vec::with_capacity(self.config.num_ants);
        for _ in 0..self.config.num_ants {
            let candidate = self
                .ant
                .construct(self.pheromone, self.cities, servers, self.q0, rng)?;
            let cost = fitness(&candidate.assignment, self.cities, servers, self.weights);

            if best.offer(&candidate, cost) {
                self.config
                    .facility
                    .apply(candidate.assignment.as_slice(), self.cities, servers);
            }
            ants.push((candidate, cost));
        }
        Ok(ants)
    }

    /// Builds every ant against a snapshot of the servers, then replays
    /// emergency activations and the facility policy once.
    fn batched<R: Rng>(
        &self,
        servers: &mut [Server],
        best: &mut Best,
        rng: &mut R,
    ) -> Result<Vec<(Candidate, f64)>> {
        let seeds: Vec<u64> = (0..self.config.num_ants).map(|_| rng.random()).collect();
        let snapshot: &[Server] = servers;

        let build = |seed: &u64| -> Result<(Candidate, f64)> {
            let mut local = snapshot.to_vec();
            let mut ant_rng = StdRng::seed_from_u64(*seed);
            let candidate = self
                .ant
                .construct(self.pheromone, self.cities, &mut local, self.q0, &mut ant_rng)?;
            let cost = fitness(&candidate.assignment, self.cities, &local, self.weights);
            Ok((candidate, cost))
        };

        #[cfg(feature = "parallel")]
        let built: Vec<Result<(Candidate, f64)>> = seeds.par_iter().map(build).collect();
        #[cfg(not(feature = "parallel"))]
        let built: Vec<Result<(Candidate, f64)>> = seeds.iter().map(build).collect();

        let ants = built.into_iter().collect::<Result<Vec<_>>>()?;

        for (candidate, _) in &ants {
            for &idx in &candidate.activated {
                if !servers[idx].is_running() {
                    servers[idx].activate(self.config.emergency_activation_stress);
                }
            }
        }

        let mut improved = false;
        for (candidate, cost) in &ants {
            improved |= best.offer(candidate, *cost);
        }
        if improved {
            self.config
                .facility
                .apply(best.assignment.as_slice(), self.cities, servers);
        }

        Ok(ants)
    }
}

/// Pairs each ant with its cost against the current server states.
///
/// Policy passes and emergency activations during the iteration can change
/// a cost after the ant was first scored.
fn rescore<'a>(
    ants: &'a [(Candidate, f64)],
    cities: &[City],
    servers: &[Server],
    weights: &FitnessWeights,
) -> Vec<(&'a Candidate, f64)> {
    ants.iter()
        .map(|(candidate, _)| {
            let cost = fitness(&candidate.assignment, cities, servers, weights);
            (candidate, cost)
        })
        .collect()
}

/// Deposits pheromone for the `elite_count` lowest-cost ants.
///
/// Ties keep construction order.
fn deposit_elite(pheromone: &mut PheromoneField, ants: &[(&Candidate, f64)], elite_count: usize) {
    let mut order: Vec<usize> = (0..ants.len()).collect();
    order.sort_by(|&a, &b| {
        ants[a]
            .1
            .partial_cmp(&ants[b].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &i in order.iter().take(elite_count) {
        let (candidate, cost) = ants[i];
        let deposit = 1.0 / (1.0 + cost);
        for (city, &server) in candidate.assignment.iter().enumerate() {
            pheromone.reinforce(city, server, deposit);
        }
    }
}
