use std::sync::atomic::{AtomicUsize, Ordering};

use courier_matrix_providers::distance_oracle::{DistanceOracle, Kilometers, OracleError};
use fxhash::FxHashSet;
use geo::{Distance, Euclidean};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    problem::{
        distance_matrix::DistanceMatrix,
        point::{Point, PointIdx},
        routing_problem::RoutingProblem,
    },
    solver::solution::Solution,
};

const EPSILON: f64 = 1e-9;

/// Depot D and three deliveries A, B, C with demands 2, 2 and 3.
pub fn scenario() -> (RoutingProblem, DistanceMatrix) {
    let problem = RoutingProblem::new(
        Point::depot("D", 0.0, 0.0),
        vec![
            Point::new("A", 1.0, 0.0, 2.0),
            Point::new("B", 2.0, 0.0, 2.0),
            Point::new("C", 3.0, 0.0, 3.0),
        ],
    )
    .unwrap();

    let matrix = DistanceMatrix::from_rows(vec![
        vec![0.0, 2.0, 5.0, 9.0],
        vec![2.0, 0.0, 3.0, 6.0],
        vec![5.0, 3.0, 0.0, 4.0],
        vec![9.0, 6.0, 4.0, 0.0],
    ])
    .unwrap();

    (problem, matrix)
}

pub fn euclidean_matrix(problem: &RoutingProblem) -> DistanceMatrix {
    let rows = problem
        .points()
        .iter()
        .map(|from| {
            problem
                .points()
                .iter()
                .map(|to| Euclidean.distance(from.location(), to.location()))
                .collect()
        })
        .collect();

    DistanceMatrix::from_rows(rows).unwrap()
}

/// Points on an integer grid so that equal distances happen often.
pub fn random_problem(num_points: usize, max_demand: u32, seed: u64) -> RoutingProblem {
    let mut rng = SmallRng::seed_from_u64(seed);

    let points = (0..num_points)
        .map(|index| {
            Point::new(
                format!("P{index}"),
                rng.random_range(-20..=20) as f64,
                rng.random_range(-20..=20) as f64,
                rng.random_range(1..=max_demand) as f64,
            )
        })
        .collect();

    RoutingProblem::new(Point::depot("D", 0.0, 0.0), points).unwrap()
}

pub fn assert_valid_solution(
    problem: &RoutingProblem,
    matrix: &DistanceMatrix,
    capacity: f64,
    solution: &Solution,
) {
    let mut seen = FxHashSet::default();
    let mut total = 0.0;

    for route in solution.routes() {
        let points = route.points();
        assert!(points.len() >= 3, "route without deliveries: {points:?}");
        assert!(points[0].is_depot());
        assert!(points[points.len() - 1].is_depot());

        let mut load = 0.0;
        for &point in route.deliveries() {
            assert!(!point.is_depot(), "depot inside a route: {points:?}");
            assert!(seen.insert(point), "{point} visited twice");
            load += problem.point(point).demand();
        }

        assert!(load <= capacity + EPSILON, "load {load} over {capacity}");
        assert!((route.load() - load).abs() < EPSILON);
        assert!((route.total_distance() - route.distance(matrix)).abs() < EPSILON);

        total += route.total_distance();
    }

    assert_eq!(seen.len(), problem.num_delivery_points());
    assert!((solution.total_distance() - total).abs() < EPSILON);
}

/// Replays the construction and checks that every step picked one of the
/// `rcl_size` nearest feasible candidates, and that routes only close when
/// nothing else fits.
pub fn assert_rcl_bound(
    problem: &RoutingProblem,
    matrix: &DistanceMatrix,
    capacity: f64,
    rcl_size: usize,
    solution: &Solution,
) {
    let mut unvisited: FxHashSet<PointIdx> = problem.delivery_indices().collect();

    for route in solution.routes() {
        let mut current = PointIdx::DEPOT;
        let mut load = 0.0;

        for &next in route.deliveries() {
            let mut distances =
                feasible_distances(problem, matrix, &unvisited, current, capacity - load);
            distances.sort_by(f64::total_cmp);

            let bound = distances[rcl_size.min(distances.len()) - 1];
            let chosen = matrix.distance(current, next);
            assert!(
                chosen <= bound + EPSILON,
                "{next} at {chosen} is outside the {rcl_size} nearest (bound {bound})"
            );

            unvisited.remove(&next);
            load += problem.point(next).demand();
            current = next;
        }

        assert!(
            feasible_distances(problem, matrix, &unvisited, current, capacity - load).is_empty(),
            "route closed while a point still fits"
        );
    }

    assert!(unvisited.is_empty());
}

fn feasible_distances(
    problem: &RoutingProblem,
    matrix: &DistanceMatrix,
    unvisited: &FxHashSet<PointIdx>,
    current: PointIdx,
    remaining: f64,
) -> Vec<f64> {
    unvisited
        .iter()
        .filter(|&&point| problem.point(point).demand() <= remaining + EPSILON)
        .map(|&point| matrix.distance(current, point))
        .collect()
}

enum MockBehavior {
    Asymmetric,
    FailingBetween(geo::Point),
    Constant(Kilometers),
}

/// In-memory oracle counting the queries it answers and the peak of queries in flight.
pub struct MockOracle {
    behavior: MockBehavior,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl MockOracle {
    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn asymmetric() -> Self {
        Self::with_behavior(MockBehavior::Asymmetric)
    }

    /// Fails with `NoRoute` on every query touching `location`.
    pub fn failing_between(location: geo::Point) -> Self {
        Self::with_behavior(MockBehavior::FailingBetween(location))
    }

    pub fn constant(distance: Kilometers) -> Self {
        Self::with_behavior(MockBehavior::Constant(distance))
    }

    /// Euclidean distance plus a penalty when going towards larger x.
    pub fn asymmetric_distance(from: geo::Point, to: geo::Point) -> Kilometers {
        let penalty = if to.x() > from.x() { 0.5 } else { 0.0 };
        Euclidean.distance(from, to) + penalty
    }
}

impl DistanceOracle for MockOracle {
    async fn distance(&self, from: geo::Point, to: geo::Point) -> Result<Kilometers, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        // Stay pending long enough for the other queries to start
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Asymmetric => Ok(Self::asymmetric_distance(from, to)),
            MockBehavior::FailingBetween(location) if from == *location || to == *location => {
                Err(OracleError::NoRoute)
            }
            MockBehavior::FailingBetween(_) => Ok(Euclidean.distance(from, to)),
            MockBehavior::Constant(distance) => Ok(*distance),
        }
    }
}
