use courier_matrix_providers::{
    distance_client::DistanceClient, distance_oracle::OracleError,
    distance_provider::DistanceProvider,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    problem::{
        distance_matrix::{DEFAULT_CONCURRENCY, DistanceMatrix, MatrixError},
        point::Point,
        routing_problem::{ProblemError, RoutingProblem, RoutingProblemBuilder},
        vehicle::Vehicle,
    },
    solver::{
        construction::{
            randomized_constructor::DEFAULT_RCL_SIZE,
            route_constructor::{ConstructionStrategy, StrategyError},
        },
        grasp::{GraspError, GraspResult, GraspSolver},
        solution::Route,
        solver_params::{GraspParams, Threads},
    },
};

const DEFAULT_DEPOT_ID: &str = "depot";
const DEFAULT_STRATEGY: &str = "greedy";

pub trait FromProblem<T> {
    fn from_problem(value: T, problem: &RoutingProblem) -> Self;
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("Invalid distance provider: {0}")]
    Provider(#[from] OracleError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "RoutingProblem", rename_all = "camelCase")]
pub struct JsonRoutingProblem {
    pub id: Option<String>,
    pub depot: JsonDepot,
    pub points: Vec<JsonPoint>,
    pub vehicle_id: Option<String>,
    pub vehicle_capacity: f64,
    /// Restricted candidate list size of the randomized strategy, defaults to 3
    pub rcl_size: Option<usize>,
    /// `greedy` (default) or `randomized`
    pub strategy: Option<String>,
    /// Defaults to 1 for greedy and 25 for randomized
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    /// Defaults to as the crow flies
    pub provider: Option<DistanceProvider>,
    /// Maximum distance queries in flight, defaults to 4
    pub concurrency: Option<usize>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "Depot")]
pub struct JsonDepot {
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "Point")]
pub struct JsonPoint {
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
}

/// Everything a solve needs, resolved from a [`JsonRoutingProblem`].
pub struct PreparedProblem {
    pub problem: RoutingProblem,
    pub matrix: DistanceMatrix,
    pub vehicle: Vehicle,
    pub params: GraspParams,
}

impl PreparedProblem {
    pub fn solve(&self) -> Result<GraspResult, GraspError> {
        GraspSolver::new(self.params.clone()).solve(&self.problem, &self.matrix, &self.vehicle)
    }
}

impl JsonRoutingProblem {
    pub fn build_problem(&self) -> Result<RoutingProblem, ProblemError> {
        let mut builder = RoutingProblemBuilder::default();

        if let Some(id) = &self.id {
            builder.set_id(id.clone());
        }

        let depot_id = self.depot.id.as_deref().unwrap_or(DEFAULT_DEPOT_ID);
        builder.set_depot(Point::depot(depot_id, self.depot.x, self.depot.y));

        for point in &self.points {
            builder.add_point(match &point.id {
                Some(id) => Point::new(id.as_str(), point.x, point.y, point.demand),
                None => Point::with_generated_id(point.x, point.y, point.demand),
            });
        }

        builder.build()
    }

    pub fn build_vehicle(&self) -> Result<Vehicle, ProblemError> {
        match &self.vehicle_id {
            Some(id) => Vehicle::new(id.as_str(), self.vehicle_capacity),
            None => Vehicle::with_generated_id(self.vehicle_capacity),
        }
    }

    pub fn strategy(&self) -> Result<ConstructionStrategy, StrategyError> {
        ConstructionStrategy::from_name(
            self.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY),
            self.rcl_size.unwrap_or(DEFAULT_RCL_SIZE),
        )
    }

    pub fn grasp_params(&self) -> Result<GraspParams, StrategyError> {
        Ok(GraspParams {
            strategy: self.strategy()?,
            iterations: self.iterations,
            seed: self.seed,
            threads: Threads::Auto,
        })
    }

    pub fn distance_client(&self, problem: &RoutingProblem) -> Result<DistanceClient, OracleError> {
        DistanceClient::from_provider(
            self.provider.clone().unwrap_or_default(),
            &problem.coordinates(),
        )
    }

    /// Validates the input and builds the distance matrix.
    #[instrument(skip_all, level = "debug")]
    pub async fn prepare(self) -> Result<PreparedProblem, InputError> {
        let problem = self.build_problem()?;
        let vehicle = self.build_vehicle()?;
        let params = self.grasp_params()?;
        let client = self.distance_client(&problem)?;

        info!(
            "Loaded problem {} with {} delivery points, total demand {}, vehicle capacity {}",
            problem.id().unwrap_or("<unnamed>"),
            problem.num_delivery_points(),
            problem.total_demand(),
            vehicle.capacity()
        );

        let matrix = DistanceMatrix::build(
            &problem,
            &client,
            self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
        )
        .await?;

        Ok(PreparedProblem {
            problem,
            matrix,
            vehicle,
            params,
        })
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "Solution", rename_all = "camelCase")]
pub struct JsonSolution {
    pub routes: Vec<JsonRoute>,
    pub total_distance: f64,
    pub strategy: String,
    pub iterations: usize,
    pub best_iteration: usize,
    pub seed: Option<u64>,
}

impl FromProblem<&GraspResult> for JsonSolution {
    fn from_problem(value: &GraspResult, problem: &RoutingProblem) -> Self {
        JsonSolution {
            routes: value
                .solution
                .routes()
                .iter()
                .map(|route| JsonRoute::from_problem(route, problem))
                .collect(),
            total_distance: value.solution.total_distance(),
            strategy: value.strategy.name().to_owned(),
            iterations: value.iterations,
            best_iteration: value.best_iteration,
            seed: value.seed,
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "Route", rename_all = "camelCase")]
pub struct JsonRoute {
    pub points: Vec<JsonPointRef>,
    pub total_distance: f64,
    pub load: f64,
}

impl FromProblem<&Route> for JsonRoute {
    fn from_problem(value: &Route, problem: &RoutingProblem) -> Self {
        JsonRoute {
            points: value
                .points()
                .iter()
                .map(|&index| JsonPointRef::from_problem(problem.point(index), problem))
                .collect(),
            total_distance: value.total_distance(),
            load: value.load(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "RoutePoint")]
pub struct JsonPointRef {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
}

impl FromProblem<&Point> for JsonPointRef {
    fn from_problem(value: &Point, _problem: &RoutingProblem) -> Self {
        JsonPointRef {
            id: value.id().to_owned(),
            x: value.x(),
            y: value.y(),
            demand: value.demand(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "DistanceMatrix")]
pub struct JsonDistanceMatrix {
    /// Point ids in matrix order, depot first
    pub ids: Vec<String>,
    /// Kilometers, `distances[from][to]`
    pub distances: Vec<Vec<f64>>,
}

impl FromProblem<&DistanceMatrix> for JsonDistanceMatrix {
    fn from_problem(value: &DistanceMatrix, problem: &RoutingProblem) -> Self {
        JsonDistanceMatrix {
            ids: problem
                .points()
                .iter()
                .map(|point| point.id().to_owned())
                .collect(),
            distances: value.rows(),
        }
    }
}
