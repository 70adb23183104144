//! Read-only views over city-to-server assignments.

use super::{City, Server};

/// A mapping from city index to the index of the server serving it.
///
/// Complete assignments (`[usize]`) answer `Some` for every city. Partial
/// assignments (`[Option<usize>]`) use `None` for cities not yet placed.
pub trait CityAssignment {
    /// Number of cities covered by the assignment.
    fn city_count(&self) -> usize;

    /// Server serving `city`, or `None` if the city is unassigned.
    fn server_of(&self, city: usize) -> Option<usize>;
}

impl CityAssignment for [usize] {
    fn city_count(&self) -> usize {
        self.len()
    }

    fn server_of(&self, city: usize) -> Option<usize> {
        self.get(city).copied()
    }
}

impl CityAssignment for [Option<usize>] {
    fn city_count(&self) -> usize {
        self.len()
    }

    fn server_of(&self, city: usize) -> Option<usize> {
        self.get(city).copied().flatten()
    }
}

/// Aggregate demand per server. Unassigned cities contribute nothing.
pub fn server_loads<A>(assignment: &A, cities: &[City], servers: &[Server]) -> Vec<f64>
where
    A: CityAssignment + ?Sized,
{
    let mut loads = vec![0.0; servers.len()];
    for (city_idx, city) in cities.iter().enumerate().take(assignment.city_count()) {
        if let Some(server_idx) = assignment.server_of(city_idx) {
            loads[server_idx] += city.demand();
        }
    }
    loads
}
