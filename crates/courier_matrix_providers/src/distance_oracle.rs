use std::future::Future;

use thiserror::Error;

/// Distance in kilometers between two coordinates.
pub type Kilometers = f64;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No route found between the two points")]
    NoRoute,

    #[error("Oracle returned an unusable distance: {0}")]
    InvalidDistance(f64),

    #[error("Point ({x}, {y}) is not part of the custom distance matrix")]
    UnknownPoint { x: f64, y: f64 },

    #[error("Point ({x}, {y}) appears more than once in the custom distance matrix")]
    DuplicatePoint { x: f64, y: f64 },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
}

/// Point-to-point travel distance query.
///
/// Points are `geo_types::Point` with `x = longitude` and `y = latitude`.
/// Implementations must be usable concurrently from several in-flight queries.
pub trait DistanceOracle: Sync {
    fn distance(
        &self,
        from: geo_types::Point,
        to: geo_types::Point,
    ) -> impl Future<Output = Result<Kilometers, OracleError>> + Send;
}
