use rand::{SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::problem::{
    distance_matrix::DistanceMatrix, routing_problem::RoutingProblem, vehicle::Vehicle,
};

use super::{
    construction::{
        construct_routes::{ConstructRoutes, ConstructionError},
        route_constructor::{ConstructionStrategy, RouteConstructor},
    },
    solution::Solution,
    solver_params::GraspParams,
};

#[derive(Debug, Error)]
pub enum GraspError {
    #[error("Construction failed at iteration {iteration}: {source}")]
    Construction {
        iteration: usize,
        #[source]
        source: ConstructionError,
    },

    #[error("At least one iteration is required")]
    InvalidIterations,

    #[error("Failed to create the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone)]
pub struct GraspResult {
    pub solution: Solution,
    pub strategy: ConstructionStrategy,
    pub iterations: usize,
    pub best_iteration: usize,
    /// Seed of the first iteration, `None` for deterministic strategies
    pub seed: Option<u64>,
}

/// Runs the route constructor several times and keeps the shortest solution.
///
/// The problem and the matrix are shared read-only between iterations, every
/// iteration gets its own vehicle and its own random generator.
pub struct GraspSolver {
    params: GraspParams,
}

impl GraspSolver {
    pub fn new(params: GraspParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GraspParams {
        &self.params
    }

    fn run_iteration(
        constructor: &RouteConstructor,
        problem: &RoutingProblem,
        matrix: &DistanceMatrix,
        vehicle: &Vehicle,
        seed: u64,
        iteration: usize,
    ) -> Result<Solution, GraspError> {
        let mut vehicle = vehicle.clone();
        let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(iteration as u64));

        constructor
            .construct_routes(problem, matrix, &mut vehicle, &mut rng)
            .map_err(|source| GraspError::Construction { iteration, source })
    }

    pub fn solve(
        &self,
        problem: &RoutingProblem,
        matrix: &DistanceMatrix,
        vehicle: &Vehicle,
    ) -> Result<GraspResult, GraspError> {
        let strategy = self.params.strategy;
        let iterations = self.params.effective_iterations();

        if iterations == 0 {
            return Err(GraspError::InvalidIterations);
        }

        if strategy.is_deterministic() && self.params.iterations.is_some_and(|n| n > 1) {
            debug!("Strategy {} is deterministic, running a single iteration", strategy);
        }

        let seed = self.params.resolve_seed();
        let rng_seed = seed.unwrap_or_default();
        let constructor = strategy.constructor();

        match seed {
            Some(seed) => info!(
                "Start GRASP: strategy {}, {} iterations, {} delivery points, seed {}",
                strategy,
                iterations,
                problem.num_delivery_points(),
                seed
            ),
            None => info!(
                "Start GRASP: strategy {}, {} iterations, {} delivery points",
                strategy,
                iterations,
                problem.num_delivery_points()
            ),
        }

        let solutions: Vec<Result<Solution, GraspError>> = if iterations == 1 {
            vec![Self::run_iteration(
                &constructor,
                problem,
                matrix,
                vehicle,
                rng_seed,
                0,
            )]
        } else {
            let thread_pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.threads.number_of_threads())
                .build()?;

            thread_pool.install(|| {
                (0..iterations)
                    .into_par_iter()
                    .map(|iteration| {
                        Self::run_iteration(
                            &constructor,
                            problem,
                            matrix,
                            vehicle,
                            rng_seed,
                            iteration,
                        )
                    })
                    .collect()
            })
        };

        let mut best: Option<(usize, Solution)> = None;
        for (iteration, solution) in solutions.into_iter().enumerate() {
            let solution = solution?;

            let improves = best.as_ref().is_none_or(|(_, best_solution)| {
                solution.total_distance() < best_solution.total_distance()
            });

            if improves {
                debug!(
                    "Iteration {}: new best distance {} with {} routes",
                    iteration,
                    solution.total_distance(),
                    solution.num_routes()
                );
                best = Some((iteration, solution));
            }
        }

        let (best_iteration, solution) = best.ok_or(GraspError::InvalidIterations)?;

        info!(
            "GRASP finished: best distance {} with {} routes (iteration {}/{})",
            solution.total_distance(),
            solution.num_routes(),
            best_iteration + 1,
            iterations
        );

        Ok(GraspResult {
            solution,
            strategy,
            iterations,
            best_iteration,
            seed,
        })
    }
}
