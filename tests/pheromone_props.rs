//! Property tests: the pheromone field never leaves its bounds.

use proptest::prelude::*;
use u_cdn_aco::aco::PheromoneField;

#[derive(Debug, Clone)]
enum Op {
    Reinforce { city: usize, server: usize, delta: f64 },
    Evaporate(f64),
    EnforceBounds,
    Normalize,
}

const CITIES: usize = 5;
const SERVERS: usize = 4;

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..CITIES, 0..SERVERS, -50.0f64..50.0)
            .prop_map(|(city, server, delta)| Op::Reinforce { city, server, delta }),
        2 => (0.0f64..=1.0).prop_map(Op::Evaporate),
        1 => Just(Op::EnforceBounds),
        1 => Just(Op::Normalize),
    ]
}

fn apply(field: &mut PheromoneField, op: &Op) {
    match *op {
        Op::Reinforce { city, server, delta } => field.reinforce(city, server, delta),
        Op::Evaporate(rate) => field.evaporate(rate),
        Op::EnforceBounds => field.enforce_bounds(),
        Op::Normalize => field.normalize(),
    }
}

proptest! {
    #[test]
    fn prop_entries_stay_in_bounds(
        min in 0.0f64..1.0,
        span in 0.0f64..20.0,
        initial in 0.0f64..30.0,
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let max = min + span;
        let mut field = PheromoneField::new(CITIES, SERVERS, initial, min, max);
        for op in &ops {
            apply(&mut field, op);
            for v in field.snapshot() {
                prop_assert!(v >= min && v <= max, "{v} outside [{min}, {max}] after {op:?}");
            }
        }
    }

    #[test]
    fn prop_full_evaporation_reaches_min(
        min in 0.0f64..1.0,
        span in 0.0f64..20.0,
        deposits in prop::collection::vec((0..CITIES, 0..SERVERS, 0.0f64..50.0), 0..20),
    ) {
        let max = min + span;
        let mut field = PheromoneField::new(CITIES, SERVERS, max, min, max);
        for (city, server, delta) in deposits {
            field.reinforce(city, server, delta);
        }
        field.evaporate(1.0);
        prop_assert!(field.snapshot().iter().all(|&v| v == min));
    }
}
