use serde::Serialize;

use crate::problem::{
    distance_matrix::{Distance, DistanceMatrix},
    point::{Demand, PointIdx},
};

/// A depot-to-depot tour.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<PointIdx>,
    total_distance: Distance,
    load: Demand,
}

impl Route {
    pub fn points(&self) -> &[PointIdx] {
        &self.points
    }

    /// The visited points, without the depot at both ends.
    pub fn deliveries(&self) -> &[PointIdx] {
        &self.points[1..self.points.len() - 1]
    }

    pub fn total_distance(&self) -> Distance {
        self.total_distance
    }

    pub fn load(&self) -> Demand {
        self.load
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries().is_empty()
    }

    /// Recomputes the distance of the route against `matrix`.
    pub fn distance(&self, matrix: &DistanceMatrix) -> Distance {
        self.points
            .windows(2)
            .map(|pair| matrix.distance(pair[0], pair[1]))
            .sum()
    }
}

/// A route being extended from the depot, closed with [`OpenRoute::close`].
pub(crate) struct OpenRoute {
    points: Vec<PointIdx>,
    distance: Distance,
    load: Demand,
}

impl OpenRoute {
    pub fn start() -> Self {
        Self {
            points: vec![PointIdx::DEPOT],
            distance: 0.0,
            load: 0.0,
        }
    }

    pub fn tail(&self) -> PointIdx {
        self.points[self.points.len() - 1]
    }

    pub fn visit(&mut self, point: PointIdx, distance: Distance, demand: Demand) {
        self.points.push(point);
        self.distance += distance;
        self.load += demand;
    }

    pub fn has_deliveries(&self) -> bool {
        self.points.len() > 1
    }

    pub fn close(mut self, return_distance: Distance) -> Route {
        self.points.push(PointIdx::DEPOT);

        Route {
            points: self.points,
            total_distance: self.distance + return_distance,
            load: self.load,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Solution {
    routes: Vec<Route>,
    total_distance: Distance,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_route(&mut self, route: Route) {
        self.total_distance += route.total_distance;
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn total_distance(&self) -> Distance {
        self.total_distance
    }

    pub fn visited_points(&self) -> impl Iterator<Item = PointIdx> + '_ {
        self.routes
            .iter()
            .flat_map(|route| route.deliveries().iter().copied())
    }
}
