use fxhash::FxHashMap;
use thiserror::Error;

use super::point::{Demand, Point, PointIdx};

#[derive(Debug, Error, PartialEq)]
pub enum ProblemError {
    #[error("Point id {0} is used more than once")]
    DuplicatePointId(String),

    #[error("Point {id} has an invalid demand {demand}")]
    InvalidDemand { id: String, demand: Demand },

    #[error("Point {id} has invalid coordinates ({x}, {y})")]
    InvalidCoordinates { id: String, x: f64, y: f64 },

    #[error("Depot {id} must not carry demand, got {demand}")]
    DepotDemand { id: String, demand: Demand },

    #[error("Vehicle {id} must have a positive capacity, got {capacity}")]
    InvalidCapacity { id: String, capacity: f64 },

    #[error("A depot is required")]
    MissingDepot,
}

/// The depot and the delivery points of a single routing instance.
///
/// Points are stored depot first, so that a [`PointIdx`] addresses both the points
/// and the rows of the distance matrix.
#[derive(Debug, Clone)]
pub struct RoutingProblem {
    id: Option<String>,
    points: Vec<Point>,
    index_by_id: FxHashMap<String, PointIdx>,
}

impl RoutingProblem {
    pub fn new(depot: Point, delivery_points: Vec<Point>) -> Result<Self, ProblemError> {
        let mut builder = RoutingProblemBuilder::default();
        builder.set_depot(depot);
        builder.set_points(delivery_points);
        builder.build()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn depot(&self) -> &Point {
        &self.points[PointIdx::DEPOT]
    }

    pub fn point(&self, index: PointIdx) -> &Point {
        &self.points[index]
    }

    /// Depot followed by the delivery points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn delivery_points(&self) -> &[Point] {
        &self.points[1..]
    }

    pub fn delivery_indices(&self) -> impl Iterator<Item = PointIdx> + use<> {
        (1..self.points.len()).map(PointIdx::new)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_delivery_points(&self) -> usize {
        self.points.len() - 1
    }

    pub fn index_of(&self, id: &str) -> Option<PointIdx> {
        self.index_by_id.get(id).copied()
    }

    pub fn total_demand(&self) -> Demand {
        self.delivery_points().iter().map(Point::demand).sum()
    }

    pub fn coordinates(&self) -> Vec<geo::Point> {
        self.points.iter().map(geo::Point::from).collect()
    }
}

#[derive(Default)]
pub struct RoutingProblemBuilder {
    id: Option<String>,
    depot: Option<Point>,
    points: Vec<Point>,
}

impl RoutingProblemBuilder {
    pub fn set_id(&mut self, id: String) -> &mut RoutingProblemBuilder {
        self.id = Some(id);
        self
    }

    pub fn set_depot(&mut self, depot: Point) -> &mut RoutingProblemBuilder {
        self.depot = Some(depot);
        self
    }

    pub fn set_points(&mut self, points: Vec<Point>) -> &mut RoutingProblemBuilder {
        self.points = points;
        self
    }

    pub fn add_point(&mut self, point: Point) -> &mut RoutingProblemBuilder {
        self.points.push(point);
        self
    }

    pub fn build(self) -> Result<RoutingProblem, ProblemError> {
        let depot = self.depot.ok_or(ProblemError::MissingDepot)?;

        if depot.demand() != 0.0 {
            return Err(ProblemError::DepotDemand {
                id: depot.id().to_owned(),
                demand: depot.demand(),
            });
        }

        let mut points = Vec::with_capacity(self.points.len() + 1);
        points.push(depot);
        points.extend(self.points);

        let mut index_by_id = FxHashMap::default();
        for (index, point) in points.iter().enumerate() {
            if !point.x().is_finite() || !point.y().is_finite() {
                return Err(ProblemError::InvalidCoordinates {
                    id: point.id().to_owned(),
                    x: point.x(),
                    y: point.y(),
                });
            }

            if !point.demand().is_finite() || point.demand() < 0.0 {
                return Err(ProblemError::InvalidDemand {
                    id: point.id().to_owned(),
                    demand: point.demand(),
                });
            }

            if index_by_id
                .insert(point.id().to_owned(), PointIdx::new(index))
                .is_some()
            {
                return Err(ProblemError::DuplicatePointId(point.id().to_owned()));
            }
        }

        Ok(RoutingProblem {
            id: self.id,
            points,
            index_by_id,
        })
    }
}
