use fxhash::FxHashMap;

use crate::distance_oracle::{DistanceOracle, Kilometers, OracleError};

/// A fixed, row-major distance matrix over a known list of points.
///
/// Points are matched by their exact coordinates, which must be unique.
pub struct CustomDistances {
    index: FxHashMap<(u64, u64), usize>,
    distances: Vec<Vec<Kilometers>>,
}

fn coordinate_key(point: geo_types::Point) -> (u64, u64) {
    // -0.0 and 0.0 are the same coordinate
    ((point.x() + 0.0).to_bits(), (point.y() + 0.0).to_bits())
}

impl CustomDistances {
    pub fn new(
        points: &[geo_types::Point],
        distances: Vec<Vec<Kilometers>>,
    ) -> Result<Self, OracleError> {
        if distances.len() != points.len() || distances.iter().any(|row| row.len() != points.len())
        {
            return Err(OracleError::MissingConfiguration(format!(
                "custom distances must be a {n}x{n} matrix",
                n = points.len()
            )));
        }

        let mut index = FxHashMap::default();
        for (i, point) in points.iter().enumerate() {
            if index.insert(coordinate_key(*point), i).is_some() {
                return Err(OracleError::DuplicatePoint {
                    x: point.x(),
                    y: point.y(),
                });
            }
        }

        Ok(Self { index, distances })
    }

    fn position(&self, point: geo_types::Point) -> Result<usize, OracleError> {
        self.index
            .get(&coordinate_key(point))
            .copied()
            .ok_or(OracleError::UnknownPoint {
                x: point.x(),
                y: point.y(),
            })
    }
}

impl DistanceOracle for CustomDistances {
    async fn distance(
        &self,
        from: geo_types::Point,
        to: geo_types::Point,
    ) -> Result<Kilometers, OracleError> {
        let from = self.position(from)?;
        let to = self.position(to)?;

        Ok(self.distances[from][to])
    }
}
