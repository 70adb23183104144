//! ACO configuration.
//!
//! [`AcoConfig`] holds every parameter of the optimizer loop. Defaults
//! reproduce the reference behaviour.

use super::facility::FacilityPolicy;
use super::fitness::FitnessWeights;

/// How ants within one iteration interact with the shared server list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstructionMode {
    /// Ants run strictly one after another. An improving ant triggers the
    /// facility policy immediately, and later ants in the same iteration
    /// see the changed server states. Bit-identical for a fixed seed.
    #[default]
    Sequential,

    /// Ants build against a snapshot of the servers taken at iteration
    /// start; emergency activations and the facility policy are applied
    /// once the whole iteration is done.
    ///
    /// This is a relaxation: it yields different results than
    /// [`Sequential`](ConstructionMode::Sequential) for the same seed.
    /// With the `parallel` feature, ants are built on the rayon pool.
    Batched,
}

/// Configuration for the ACO server-assignment optimizer.
///
/// # Examples
///
/// ```
/// use u_cdn_aco::aco::AcoConfig;
///
/// let config = AcoConfig::default()
///     .with_iterations(100)
///     .with_num_ants(20)
///     .with_q0(0.3)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoConfig {
    /// Pheromone exponent during construction and distance weight in the
    /// objective.
    pub alpha: f64,

    /// Stress-penalty weight, both in construction and in the objective.
    pub beta: f64,

    /// Load-imbalance weight in the objective.
    pub gamma: f64,

    /// Number of iterations. There is no early termination.
    pub iterations: usize,

    /// Ants per iteration.
    pub num_ants: usize,

    /// Fraction of pheromone removed at the end of each iteration, in `[0, 1]`.
    pub evaporation_rate: f64,

    /// Final exploitation probability. The effective value grows linearly
    /// from 0 at the first iteration towards `q0`.
    pub q0: f64,

    pub min_pheromone: f64,
    pub max_pheromone: f64,
    pub initial_pheromone: f64,

    /// Fraction of ants that deposit pheromone each iteration. At least one
    /// ant is always selected.
    pub elite_fraction: f64,

    /// Added to distances before inversion in the attractiveness term.
    pub distance_epsilon: f64,

    /// Stress assigned to a server brought up because no server was running.
    pub emergency_activation_stress: f64,

    /// Objective cost per running server.
    pub activation_cost_weight: f64,

    /// Bring-up / shut-down policy applied on every new global best.
    pub facility: FacilityPolicy,

    pub mode: ConstructionMode,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.5,
            iterations: 50,
            num_ants: 10,
            evaporation_rate: 0.1,
            q0: 0.1,
            min_pheromone: 0.1,
            max_pheromone: 10.0,
            initial_pheromone: 1.0,
            elite_fraction: 0.3,
            distance_epsilon: 1e-6,
            emergency_activation_stress: 30.0,
            activation_cost_weight: 0.01,
            facility: FacilityPolicy::default(),
            mode: ConstructionMode::default(),
            seed: None,
        }
    }
}

impl AcoConfig {
    /// Sets the objective weights `alpha` (distance / pheromone exponent),
    /// `beta` (stress) and `gamma` (imbalance).
    pub fn with_weights(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_num_ants(mut self, n: usize) -> Self {
        self.num_ants = n;
        self
    }

    pub fn with_evaporation_rate(mut self, rate: f64) -> Self {
        self.evaporation_rate = rate;
        self
    }

    pub fn with_q0(mut self, q0: f64) -> Self {
        self.q0 = q0;
        self
    }

    /// Sets the pheromone bounds and initial value.
    pub fn with_pheromone(mut self, min: f64, max: f64, initial: f64) -> Self {
        self.min_pheromone = min;
        self.max_pheromone = max;
        self.initial_pheromone = initial;
        self
    }

    pub fn with_elite_fraction(mut self, fraction: f64) -> Self {
        self.elite_fraction = fraction;
        self
    }

    pub fn with_facility_policy(mut self, policy: FacilityPolicy) -> Self {
        self.facility = policy;
        self
    }

    pub fn with_mode(mut self, mode: ConstructionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Objective weights used by the fitness evaluator.
    pub fn fitness_weights(&self) -> FitnessWeights {
        FitnessWeights {
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            activation_cost: self.activation_cost_weight,
        }
    }

    /// Number of elite ants per iteration: `ceil(elite_fraction * num_ants)`,
    /// never below 1 and never above `num_ants`.
    pub fn elite_count(&self) -> usize {
        let raw = (self.elite_fraction * self.num_ants as f64).ceil() as usize;
        raw.clamp(1, self.num_ants.max(1))
    }

    /// Effective exploitation probability at `iteration` (0-based).
    pub fn q0_at(&self, iteration: usize) -> f64 {
        self.q0 * (iteration as f64 / self.iterations as f64)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("activation_cost_weight", self.activation_cost_weight),
            ("emergency_activation_stress", self.emergency_activation_stress),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if self.iterations == 0 {
            return Err("iterations must be at least 1".into());
        }
        if self.num_ants == 0 {
            return Err("num_ants must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(format!(
                "evaporation_rate must be in [0, 1], got {}",
                self.evaporation_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.q0) {
            return Err(format!("q0 must be in [0, 1], got {}", self.q0));
        }
        if !self.min_pheromone.is_finite() || self.min_pheromone < 0.0 {
            return Err(format!(
                "min_pheromone must be finite and non-negative, got {}",
                self.min_pheromone
            ));
        }
        if !self.max_pheromone.is_finite() || self.max_pheromone < self.min_pheromone {
            return Err(format!(
                "max_pheromone must be finite and >= min_pheromone, got {}",
                self.max_pheromone
            ));
        }
        if !(self.min_pheromone..=self.max_pheromone).contains(&self.initial_pheromone) {
            return Err(format!(
                "initial_pheromone must lie in [{}, {}], got {}",
                self.min_pheromone, self.max_pheromone, self.initial_pheromone
            ));
        }
        if !(self.elite_fraction > 0.0 && self.elite_fraction <= 1.0) {
            return Err(format!(
                "elite_fraction must be in (0, 1], got {}",
                self.elite_fraction
            ));
        }
        if !(self.distance_epsilon > 0.0 && self.distance_epsilon.is_finite()) {
            return Err(format!(
                "distance_epsilon must be positive, got {}",
                self.distance_epsilon
            ));
        }
        self.facility.validate()
    }
}
