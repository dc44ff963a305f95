use geo::{Distance, Haversine};

use crate::distance_oracle::{DistanceOracle, Kilometers, OracleError};

/// Great-circle distance, optionally inflated by a detour factor to
/// approximate the road network.
pub struct AsTheCrowFlies {
    detour_factor: f64,
}

impl AsTheCrowFlies {
    pub fn new(detour_factor: f64) -> Self {
        Self { detour_factor }
    }

    pub fn haversine_km(from: geo_types::Point, to: geo_types::Point) -> Kilometers {
        Haversine.distance(from, to) / 1000.0
    }
}

impl Default for AsTheCrowFlies {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DistanceOracle for AsTheCrowFlies {
    async fn distance(
        &self,
        from: geo_types::Point,
        to: geo_types::Point,
    ) -> Result<Kilometers, OracleError> {
        Ok(Self::haversine_km(from, to) * self.detour_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_km() {
        // One degree of latitude is roughly 111.2 km
        let distance = AsTheCrowFlies::haversine_km(
            geo_types::Point::new(0.0, 0.0),
            geo_types::Point::new(0.0, 1.0),
        );

        assert!((distance - 111.19).abs() < 0.1, "{distance}");
    }

    #[tokio::test]
    async fn test_detour_factor() {
        let from = geo_types::Point::new(-40.3375, -20.3155);
        let to = geo_types::Point::new(-40.3248, -20.3152);

        let straight = AsTheCrowFlies::default().distance(from, to).await.unwrap();
        let detour = AsTheCrowFlies::new(1.3).distance(from, to).await.unwrap();

        assert!(straight > 0.0);
        assert!((detour - straight * 1.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_same_point_is_zero() {
        let point = geo_types::Point::new(-40.3375, -20.3155);

        assert_eq!(
            AsTheCrowFlies::default()
                .distance(point, point)
                .await
                .unwrap(),
            0.0
        );
    }
}
