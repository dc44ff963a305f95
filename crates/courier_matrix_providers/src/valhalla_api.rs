use std::{fmt::Display, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance_oracle::{DistanceOracle, Kilometers, OracleError};

pub const VALHALLA_ROUTE_API_PATH: &str = "/route";
pub const VALHALLA_URL_ENV_VAR: &str = "VALHALLA_URL";

#[derive(Deserialize, Serialize, JsonSchema, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValhallaCosting {
    #[default]
    Auto,
    Bicycle,
    Pedestrian,
    Truck,
    MotorScooter,
}

impl Display for ValhallaCosting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ValhallaCosting::Auto => "auto",
                ValhallaCosting::Bicycle => "bicycle",
                ValhallaCosting::Pedestrian => "pedestrian",
                ValhallaCosting::Truck => "truck",
                ValhallaCosting::MotorScooter => "motor_scooter",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ValhallaLocation {
    pub lat: f64,
    pub lon: f64,
}

impl From<geo_types::Point> for ValhallaLocation {
    fn from(point: geo_types::Point) -> Self {
        ValhallaLocation {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionsOptions {
    pub units: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteRequestBody {
    pub locations: [ValhallaLocation; 2],
    pub costing: ValhallaCosting,
    pub directions_options: DirectionsOptions,
}

impl RouteRequestBody {
    pub fn new(from: geo_types::Point, to: geo_types::Point, costing: ValhallaCosting) -> Self {
        RouteRequestBody {
            locations: [from.into(), to.into()],
            costing,
            directions_options: DirectionsOptions {
                units: "kilometers",
            },
        }
    }
}

#[derive(Deserialize)]
struct RouteSummary {
    /// Length in the requested units (kilometers)
    length: f64,
}

#[derive(Deserialize)]
struct RouteLeg {
    summary: RouteSummary,
}

#[derive(Deserialize)]
struct Trip {
    #[serde(default)]
    legs: Vec<RouteLeg>,
}

#[derive(Deserialize)]
struct RouteResponse {
    trip: Option<Trip>,
}

/// Valhalla answers with a trip made of one leg per pair of consecutive locations,
/// a two location request has a single leg.
fn first_leg_length(response: RouteResponse) -> Result<Kilometers, OracleError> {
    let trip = response.trip.ok_or(OracleError::NoRoute)?;
    let leg = trip.legs.first().ok_or(OracleError::NoRoute)?;

    Ok(leg.summary.length)
}

pub struct ValhallaClientParams {
    pub url: String,
    pub costing: ValhallaCosting,
    pub timeout: Option<Duration>,
}

pub struct ValhallaClient {
    params: ValhallaClientParams,
    client: reqwest::Client,
}

impl ValhallaClient {
    pub fn new(params: ValhallaClientParams) -> Result<Self, OracleError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = params.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            params,
        })
    }

    pub fn url(&self) -> &str {
        &self.params.url
    }

    fn route_url(&self) -> String {
        let mut url = self.params.url.trim_end_matches('/').to_owned();
        url.push_str(VALHALLA_ROUTE_API_PATH);
        url
    }

    async fn fetch_route(
        &self,
        from: geo_types::Point,
        to: geo_types::Point,
    ) -> Result<Kilometers, OracleError> {
        let body = RouteRequestBody::new(from, to, self.params.costing);

        let response = self.client.post(self.route_url()).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api { status, message });
        }

        let route: RouteResponse = response.json().await?;
        let length = first_leg_length(route)?;

        debug!(
            "Valhalla: ({}, {}) -> ({}, {}) = {} km",
            from.y(),
            from.x(),
            to.y(),
            to.x(),
            length
        );

        Ok(length)
    }
}

impl DistanceOracle for ValhallaClient {
    async fn distance(
        &self,
        from: geo_types::Point,
        to: geo_types::Point,
    ) -> Result<Kilometers, OracleError> {
        self.fetch_route(from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_lat_lon_order() {
        let body = RouteRequestBody::new(
            geo_types::Point::new(-40.3375, -20.3155),
            geo_types::Point::new(-40.3248, -20.3152),
            ValhallaCosting::Auto,
        );

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "locations": [
                    { "lat": -20.3155, "lon": -40.3375 },
                    { "lat": -20.3152, "lon": -40.3248 },
                ],
                "costing": "auto",
                "directions_options": { "units": "kilometers" },
            })
        );
    }

    #[test]
    fn test_first_leg_length() {
        let response: RouteResponse = serde_json::from_value(serde_json::json!({
            "trip": {
                "legs": [{ "summary": { "length": 2.345, "time": 300 } }],
                "status": 0,
                "units": "kilometers",
            }
        }))
        .unwrap();

        assert_eq!(first_leg_length(response).unwrap(), 2.345);
    }

    #[test]
    fn test_missing_trip_is_no_route() {
        let response: RouteResponse =
            serde_json::from_value(serde_json::json!({ "id": "x" })).unwrap();

        assert!(matches!(
            first_leg_length(response),
            Err(OracleError::NoRoute)
        ));
    }

    #[test]
    fn test_empty_legs_is_no_route() {
        let response: RouteResponse =
            serde_json::from_value(serde_json::json!({ "trip": { "legs": [] } })).unwrap();

        assert!(matches!(
            first_leg_length(response),
            Err(OracleError::NoRoute)
        ));
    }

    #[test]
    fn test_route_url_strips_trailing_slash() {
        let client = ValhallaClient::new(ValhallaClientParams {
            url: "http://localhost:8002/".to_string(),
            costing: ValhallaCosting::Auto,
            timeout: None,
        })
        .unwrap();

        assert_eq!(client.route_url(), "http://localhost:8002/route");
    }

    #[test]
    fn test_costing_display_matches_serde() {
        for costing in [
            ValhallaCosting::Auto,
            ValhallaCosting::Bicycle,
            ValhallaCosting::Pedestrian,
            ValhallaCosting::Truck,
            ValhallaCosting::MotorScooter,
        ] {
            assert_eq!(
                serde_json::to_value(costing).unwrap(),
                serde_json::Value::String(costing.to_string())
            );
        }
    }
}
