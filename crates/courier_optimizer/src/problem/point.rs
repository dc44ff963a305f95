use std::fmt::Display;

use serde::Serialize;

/// Position of a point inside a [`RoutingProblem`](super::routing_problem::RoutingProblem).
///
/// Index 0 is always the depot, delivery points follow in input order.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointIdx(usize);

impl PointIdx {
    pub const DEPOT: PointIdx = PointIdx(0);

    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(&self) -> usize {
        self.0
    }

    pub const fn is_depot(&self) -> bool {
        self.0 == 0
    }
}

impl Display for PointIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for PointIdx {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::ops::Index<PointIdx> for [Point] {
    type Output = Point;

    fn index(&self, index: PointIdx) -> &Self::Output {
        &self[index.0]
    }
}

impl std::ops::Index<PointIdx> for Vec<Point> {
    type Output = Point;

    fn index(&self, index: PointIdx) -> &Self::Output {
        &self[index.0]
    }
}

pub type Demand = f64;

/// A geo-located stop. `x` is the longitude and `y` the latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: String,
    location: geo::Point,
    demand: Demand,
}

impl Point {
    pub fn new(id: impl Into<String>, x: f64, y: f64, demand: Demand) -> Self {
        Self {
            id: id.into(),
            location: geo::Point::new(x, y),
            demand,
        }
    }

    /// The depot never carries demand.
    pub fn depot(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(id, x, y, 0.0)
    }

    pub fn with_generated_id(x: f64, y: f64, demand: Demand) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), x, y, demand)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn x(&self) -> f64 {
        self.location.x()
    }

    pub fn y(&self) -> f64 {
        self.location.y()
    }

    pub fn lon(&self) -> f64 {
        self.location.x()
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    pub fn demand(&self) -> Demand {
        self.demand
    }

    pub fn location(&self) -> geo::Point {
        self.location
    }
}

impl From<&Point> for geo::Point {
    fn from(point: &Point) -> Self {
        point.location
    }
}
