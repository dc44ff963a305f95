use fixedbitset::FixedBitSet;
use thiserror::Error;
use tracing::debug;

use crate::{
    problem::{
        distance_matrix::{Distance, DistanceMatrix},
        point::{Demand, PointIdx},
        routing_problem::RoutingProblem,
        vehicle::{CapacityExceeded, Vehicle},
    },
    solver::solution::{OpenRoute, Solution},
};

#[derive(Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),

    #[error("Point {point} has demand {demand} but the vehicle capacity is {capacity}")]
    InfeasibleDemand {
        point: String,
        demand: Demand,
        capacity: Demand,
    },

    #[error("Distance matrix has {actual} points but the problem has {expected}")]
    MatrixMismatch { expected: usize, actual: usize },
}

/// A capacity-feasible unvisited point and its distance from the current route tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub point: PointIdx,
    pub distance: Distance,
}

pub trait ConstructRoutes {
    /// Picks the next point to visit. `candidates` are listed in input order and are
    /// never empty.
    fn select_candidate<R>(&self, candidates: &[Candidate], rng: &mut R) -> Candidate
    where
        R: rand::Rng;

    fn construct_routes<R>(
        &self,
        problem: &RoutingProblem,
        matrix: &DistanceMatrix,
        vehicle: &mut Vehicle,
        rng: &mut R,
    ) -> Result<Solution, ConstructionError>
    where
        R: rand::Rng,
    {
        construct_routes_with(problem, matrix, vehicle, |candidates| {
            self.select_candidate(candidates, &mut *rng)
        })
    }
}

fn check_demands(problem: &RoutingProblem, vehicle: &Vehicle) -> Result<(), ConstructionError> {
    match problem
        .delivery_points()
        .iter()
        .find(|point| point.demand() > vehicle.capacity())
    {
        Some(point) => Err(ConstructionError::InfeasibleDemand {
            point: point.id().to_owned(),
            demand: point.demand(),
            capacity: vehicle.capacity(),
        }),
        None => Ok(()),
    }
}

/// Builds depot-to-depot routes until every delivery point is visited.
///
/// Each route starts with an empty vehicle and is extended with the candidate
/// returned by `select` until no unvisited point fits the remaining capacity.
pub fn construct_routes_with<F>(
    problem: &RoutingProblem,
    matrix: &DistanceMatrix,
    vehicle: &mut Vehicle,
    mut select: F,
) -> Result<Solution, ConstructionError>
where
    F: FnMut(&[Candidate]) -> Candidate,
{
    if matrix.num_points() != problem.num_points() {
        return Err(ConstructionError::MatrixMismatch {
            expected: problem.num_points(),
            actual: matrix.num_points(),
        });
    }

    check_demands(problem, vehicle)?;

    let mut unvisited = FixedBitSet::with_capacity(problem.num_points());
    unvisited.insert_range(1..problem.num_points());

    let mut candidates: Vec<Candidate> = Vec::with_capacity(problem.num_delivery_points());
    let mut solution = Solution::new();

    while !unvisited.is_clear() {
        vehicle.reset_load();
        let mut route = OpenRoute::start();

        loop {
            let current = route.tail();

            candidates.clear();
            candidates.extend(
                unvisited
                    .ones()
                    .map(PointIdx::new)
                    .filter(|&point| vehicle.can_load(problem.point(point).demand()))
                    .map(|point| Candidate {
                        point,
                        distance: matrix.distance(current, point),
                    }),
            );

            if candidates.is_empty() {
                break;
            }

            let next = select(&candidates);
            let demand = problem.point(next.point).demand();

            vehicle.load(demand)?;
            route.visit(next.point, next.distance, demand);
            unvisited.set(next.point.get(), false);
        }

        if !route.has_deliveries() {
            // An empty vehicle could not take any remaining point
            let point = problem.point(PointIdx::new(unvisited.ones().next().unwrap_or(0)));
            return Err(ConstructionError::InfeasibleDemand {
                point: point.id().to_owned(),
                demand: point.demand(),
                capacity: vehicle.capacity(),
            });
        }

        let return_distance = matrix.distance(route.tail(), PointIdx::DEPOT);
        let route = route.close(return_distance);

        debug!(
            "Route {} closed: {} points, load {}, distance {}",
            solution.num_routes(),
            route.deliveries().len(),
            route.load(),
            route.total_distance()
        );

        solution.push_route(route);
    }

    Ok(solution)
}
