//! Bounded pheromone field over (city, server) pairs.
//!
//! Every entry stays within `[min, max]` after every operation, in the
//! MAX-MIN Ant System sense.
//!
//! # References
//!
//! - Stützle & Hoos (2000), "MAX-MIN Ant System", *Future Generation
//!   Computer Systems* 16(8), 889-914.

/// Dense row-major matrix of pheromone values, one row per city.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneField {
    values: Vec<f64>,
    rows: usize,
    cols: usize,
    min: f64,
    max: f64,
}

impl PheromoneField {
    /// Creates a `cities × servers` field filled with `initial`.
    ///
    /// `initial` is clamped into `[min, max]`.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn new(cities: usize, servers: usize, initial: f64, min: f64, max: f64) -> Self {
        assert!(min <= max, "pheromone bounds inverted: {min} > {max}");
        Self {
            values: vec![initial.clamp(min, max); cities * servers],
            rows: cities,
            cols: servers,
            min,
            max,
        }
    }

    /// Number of cities (rows).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of servers (columns).
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn get(&self, city: usize, server: usize) -> f64 {
        self.values[self.index(city, server)]
    }

    /// Adds `delta` to one entry, then clamps it.
    pub fn reinforce(&mut self, city: usize, server: usize, delta: f64) {
        let idx = self.index(city, server);
        self.values[idx] = (self.values[idx] + delta).clamp(self.min, self.max);
    }

    /// Multiplies every entry by `1 - rate`, then clamps.
    ///
    /// `rate = 1.0` drives the whole field to `min`.
    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        let (min, max) = (self.min, self.max);
        for v in &mut self.values {
            *v = (*v * keep).clamp(min, max);
        }
    }

    /// Clamps every entry into bounds.
    ///
    /// The optimizer calls this after every batch of deposits, on top of
    /// the per-entry clamp in [`reinforce`](Self::reinforce).
    pub fn enforce_bounds(&mut self) {
        let (min, max) = (self.min, self.max);
        for v in &mut self.values {
            *v = v.clamp(min, max);
        }
    }

    /// Divides each city's row by its sum, then clamps.
    ///
    /// A zero row sum is treated as 1. Not used by the optimizer loop.
    pub fn normalize(&mut self) {
        if self.cols == 0 {
            return;
        }
        for row in self.values.chunks_mut(self.cols) {
            let sum: f64 = row.iter().sum();
            let divisor = if sum == 0.0 { 1.0 } else { sum };
            for v in row.iter_mut() {
                *v /= divisor;
            }
        }
        self.enforce_bounds();
    }

    /// Row-major copy of all entries.
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.clone()
    }

    /// One city's row.
    pub fn row(&self, city: usize) -> &[f64] {
        let start = city * self.cols;
        &self.values[start..start + self.cols]
    }

    #[inline]
    fn index(&self, city: usize, server: usize) -> usize {
        debug_assert!(city < self.rows && server < self.cols);
        city * self.cols + server
    }
}
