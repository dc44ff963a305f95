use std::time::Duration;

use tracing::info;

use crate::{
    as_the_crow_flies::AsTheCrowFlies,
    custom_distances::CustomDistances,
    distance_oracle::{DistanceOracle, Kilometers, OracleError},
    distance_provider::DistanceProvider,
    valhalla_api::{VALHALLA_URL_ENV_VAR, ValhallaClient, ValhallaClientParams},
};

/// Dispatches distance queries to the oracle selected by a [`DistanceProvider`].
pub enum DistanceClient {
    Valhalla(ValhallaClient),
    AsTheCrowFlies(AsTheCrowFlies),
    Custom(CustomDistances),
}

impl DistanceClient {
    /// `points` are the problem points in matrix order, only used by the custom provider.
    pub fn from_provider(
        provider: DistanceProvider,
        points: &[geo_types::Point],
    ) -> Result<Self, OracleError> {
        let client = match provider {
            DistanceProvider::Valhalla {
                url,
                costing,
                timeout_secs,
            } => {
                let url = match url {
                    Some(url) => url,
                    None => std::env::var(VALHALLA_URL_ENV_VAR).map_err(|_| {
                        OracleError::MissingConfiguration(format!(
                            "valhalla url not set and {VALHALLA_URL_ENV_VAR} is not defined"
                        ))
                    })?,
                };

                info!("Using Valhalla at {} with costing {}", url, costing);

                DistanceClient::Valhalla(ValhallaClient::new(ValhallaClientParams {
                    url,
                    costing,
                    timeout: timeout_secs.map(Duration::from_secs),
                })?)
            }
            DistanceProvider::AsTheCrowFlies { detour_factor } => {
                DistanceClient::AsTheCrowFlies(AsTheCrowFlies::new(detour_factor))
            }
            DistanceProvider::Custom { distances } => {
                DistanceClient::Custom(CustomDistances::new(points, distances)?)
            }
        };

        Ok(client)
    }
}

impl DistanceOracle for DistanceClient {
    async fn distance(
        &self,
        from: geo_types::Point,
        to: geo_types::Point,
    ) -> Result<Kilometers, OracleError> {
        match self {
            DistanceClient::Valhalla(client) => client.distance(from, to).await,
            DistanceClient::AsTheCrowFlies(client) => client.distance(from, to).await,
            DistanceClient::Custom(client) => client.distance(from, to).await,
        }
    }
}
