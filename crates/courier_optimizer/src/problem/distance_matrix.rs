use std::sync::atomic::{AtomicUsize, Ordering};

use courier_matrix_providers::distance_oracle::{DistanceOracle, OracleError};
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{Level, debug, info, instrument};

use super::{point::PointIdx, routing_problem::RoutingProblem};

pub type Distance = f64;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Distance oracle unavailable for {from} -> {to}: {source}")]
    OracleUnavailable {
        from: String,
        to: String,
        #[source]
        source: OracleError,
    },

    #[error("Distance matrix must be square, got {rows} rows and a row of {columns} columns")]
    NotSquare { rows: usize, columns: usize },

    #[error("Invalid distance {distance} from {from} to {to}")]
    InvalidDistance {
        from: usize,
        to: usize,
        distance: Distance,
    },
}

/// Travel distances in kilometers between every ordered pair of points of a problem.
///
/// Stored as a flat vector, the distance from `from` to `to` lives at
/// `from * num_points + to`. The matrix is never assumed to be symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    distances: Vec<Distance>,
    num_points: usize,
}

fn is_usable(distance: Distance) -> bool {
    distance.is_finite() && distance >= 0.0
}

impl DistanceMatrix {
    pub fn from_rows(rows: Vec<Vec<Distance>>) -> Result<Self, MatrixError> {
        let num_points = rows.len();

        if let Some(row) = rows.iter().find(|row| row.len() != num_points) {
            return Err(MatrixError::NotSquare {
                rows: num_points,
                columns: row.len(),
            });
        }

        for (from, row) in rows.iter().enumerate() {
            for (to, &distance) in row.iter().enumerate() {
                if from != to && !is_usable(distance) {
                    return Err(MatrixError::InvalidDistance { from, to, distance });
                }
            }
        }

        Ok(Self {
            distances: rows.into_iter().flatten().collect(),
            num_points,
        })
    }

    /// Queries `oracle` for every ordered pair of distinct points, with at most
    /// `concurrency` queries in flight.
    ///
    /// The first failing query aborts the build, queries still in flight are dropped
    /// and no matrix is returned.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub async fn build<O>(
        problem: &RoutingProblem,
        oracle: &O,
        concurrency: usize,
    ) -> Result<Self, MatrixError>
    where
        O: DistanceOracle,
    {
        let num_points = problem.num_points();
        let total_queries = num_points * num_points.saturating_sub(1);
        let concurrency = concurrency.max(1);

        info!(
            "Building distance matrix: {} points, {} queries, concurrency {}",
            num_points, total_queries, concurrency
        );

        let completed = AtomicUsize::new(0);
        let completed = &completed;

        let pairs = (0..num_points).flat_map(move |from| {
            (0..num_points)
                .filter(move |&to| to != from)
                .map(move |to| (PointIdx::new(from), PointIdx::new(to)))
        });

        let results: Vec<(PointIdx, PointIdx, Distance)> = futures::stream::iter(pairs)
            .map(|(from, to)| async move {
                let from_point = problem.point(from);
                let to_point = problem.point(to);

                let distance = oracle
                    .distance(from_point.into(), to_point.into())
                    .await
                    .and_then(|distance| {
                        if is_usable(distance) {
                            Ok(distance)
                        } else {
                            Err(OracleError::InvalidDistance(distance))
                        }
                    })
                    .map_err(|source| MatrixError::OracleUnavailable {
                        from: from_point.id().to_owned(),
                        to: to_point.id().to_owned(),
                        source,
                    })?;

                let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(
                    "query {}/{}: {} -> {} = {} km",
                    count,
                    total_queries,
                    from_point.id(),
                    to_point.id(),
                    distance
                );

                Ok::<_, MatrixError>((from, to, distance))
            })
            .buffer_unordered(concurrency)
            .try_collect()
            .await?;

        let mut distances = vec![0.0; num_points * num_points];
        for (from, to, distance) in results {
            distances[from.get() * num_points + to.get()] = distance;
        }

        info!("Distance matrix built with {} queries", total_queries);

        Ok(Self {
            distances,
            num_points,
        })
    }

    #[inline(always)]
    fn index(&self, from: PointIdx, to: PointIdx) -> usize {
        from.get() * self.num_points + to.get()
    }

    #[inline(always)]
    pub fn distance(&self, from: PointIdx, to: PointIdx) -> Distance {
        if from == to {
            return 0.0;
        }

        self.distances[self.index(from, to)]
    }

    pub fn distance_by_id(
        &self,
        problem: &RoutingProblem,
        from: &str,
        to: &str,
    ) -> Option<Distance> {
        let from = problem.index_of(from)?;
        let to = problem.index_of(to)?;

        (from.get() < self.num_points && to.get() < self.num_points)
            .then(|| self.distance(from, to))
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.num_points).all(|i| {
            (0..self.num_points).all(|j| {
                self.distances[i * self.num_points + j] == self.distances[j * self.num_points + i]
            })
        })
    }

    pub fn rows(&self) -> Vec<Vec<Distance>> {
        if self.num_points == 0 {
            return vec![];
        }

        self.distances
            .chunks(self.num_points)
            .map(<[Distance]>::to_vec)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use crate::{
        problem::{point::Point, routing_problem::RoutingProblem},
        test_utils::{self, MockOracle},
    };

    use super::*;

    fn line_problem() -> RoutingProblem {
        RoutingProblem::new(
            Point::depot("D", 0.0, 0.0),
            vec![
                Point::new("A", 1.0, 0.0, 1.0),
                Point::new("B", 2.0, 0.0, 1.0),
                Point::new("C", 3.0, 0.0, 1.0),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_queries_every_ordered_pair() {
        let problem = line_problem();
        let oracle = MockOracle::asymmetric();

        let matrix = DistanceMatrix::build(&problem, &oracle, 3).await.unwrap();

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 4 * 3);
        assert_eq!(matrix.num_points(), 4);

        for from in problem.points() {
            for to in problem.points() {
                let expected = if from.id() == to.id() {
                    0.0
                } else {
                    MockOracle::asymmetric_distance(from.location(), to.location())
                };

                assert_eq!(
                    matrix.distance_by_id(&problem, from.id(), to.id()),
                    Some(expected)
                );
            }
        }
    }

    #[tokio::test]
    async fn test_build_keeps_asymmetric_distances() {
        let problem = line_problem();

        let matrix = DistanceMatrix::build(&problem, &MockOracle::asymmetric(), 1)
            .await
            .unwrap();

        assert!(!matrix.is_symmetric());
        assert_ne!(
            matrix.distance(PointIdx::new(1), PointIdx::new(2)),
            matrix.distance(PointIdx::new(2), PointIdx::new(1))
        );
    }

    #[tokio::test]
    async fn test_build_fails_on_oracle_error() {
        let problem = line_problem();
        let oracle = MockOracle::failing_between(problem.point(PointIdx::new(2)).location());

        let result = DistanceMatrix::build(&problem, &oracle, 4).await;

        match result {
            Err(MatrixError::OracleUnavailable { from, to, source }) => {
                assert!(from == "B" || to == "B");
                assert!(matches!(source, OracleError::NoRoute));
            }
            other => panic!("expected OracleUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_bounds_queries_in_flight() {
        let problem = line_problem();

        for concurrency in [1, 3] {
            let oracle = MockOracle::asymmetric();

            DistanceMatrix::build(&problem, &oracle, concurrency)
                .await
                .unwrap();

            assert_eq!(oracle.calls.load(Ordering::SeqCst), 4 * 3);
            assert_eq!(oracle.peak_in_flight.load(Ordering::SeqCst), concurrency);
        }
    }

    #[tokio::test]
    async fn test_build_stops_at_first_failure() {
        let problem = line_problem();
        let oracle = MockOracle::failing_between(problem.point(PointIdx::new(1)).location());

        let result = DistanceMatrix::build(&problem, &oracle, 1).await;

        // D -> A is the first query, nothing is queried after it fails
        assert!(matches!(
            result,
            Err(MatrixError::OracleUnavailable { ref from, ref to, .. }) if from == "D" && to == "A"
        ));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_build_rejects_negative_distance() {
        let problem = line_problem();
        let oracle = MockOracle::constant(-1.0);

        let result = DistanceMatrix::build(&problem, &oracle, 2).await;

        assert!(matches!(
            result,
            Err(MatrixError::OracleUnavailable {
                source: OracleError::InvalidDistance(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_build_depot_only() {
        let problem = RoutingProblem::new(Point::depot("D", 0.0, 0.0), vec![]).unwrap();
        let oracle = MockOracle::constant(1.0);

        let matrix = DistanceMatrix::build(&problem, &oracle, 0).await.unwrap();

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
        assert_eq!(matrix.rows(), vec![vec![0.0]]);
    }

    #[test]
    fn test_from_rows() {
        let (problem, matrix) = test_utils::scenario();

        assert_eq!(matrix.distance_by_id(&problem, "D", "C"), Some(9.0));
        assert_eq!(matrix.distance_by_id(&problem, "B", "C"), Some(4.0));
        assert_eq!(matrix.distance_by_id(&problem, "A", "A"), Some(0.0));
        assert_eq!(matrix.distance_by_id(&problem, "A", "Z"), None);
        assert!(matrix.is_symmetric());
    }

    #[test]
    fn test_from_rows_not_square() {
        let result = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]);

        assert!(matches!(
            result,
            Err(MatrixError::NotSquare {
                rows: 2,
                columns: 1
            })
        ));
    }

    #[test]
    fn test_from_rows_invalid_distance() {
        let result = DistanceMatrix::from_rows(vec![vec![0.0, f64::INFINITY], vec![1.0, 0.0]]);

        assert!(matches!(
            result,
            Err(MatrixError::InvalidDistance { from: 0, to: 1, .. })
        ));
    }

    #[test]
    fn test_rows_round_trip() {
        let rows = vec![vec![0.0, 1.5], vec![2.5, 0.0]];

        assert_eq!(DistanceMatrix::from_rows(rows.clone()).unwrap().rows(), rows);
    }
}
