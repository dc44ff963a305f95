use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::valhalla_api::ValhallaCosting;

fn default_detour_factor() -> f64 {
    1.0
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceProvider {
    /// https://valhalla.github.io/valhalla/api/turn-by-turn/api-reference/
    Valhalla {
        /// Base URL of the Valhalla server, falls back to the `VALHALLA_URL` env variable
        url: Option<String>,
        #[serde(default)]
        costing: ValhallaCosting,
        timeout_secs: Option<u64>,
    },

    AsTheCrowFlies {
        #[serde(default = "default_detour_factor")]
        detour_factor: f64,
    },

    /// Row-major distances in kilometers, depot first then points in input order.
    /// Every point must have distinct coordinates.
    Custom { distances: Vec<Vec<f64>> },
}

impl Default for DistanceProvider {
    fn default() -> Self {
        DistanceProvider::AsTheCrowFlies {
            detour_factor: default_detour_factor(),
        }
    }
}

impl DistanceProvider {
    pub fn name(&self) -> &'static str {
        match self {
            DistanceProvider::Valhalla { .. } => "valhalla",
            DistanceProvider::AsTheCrowFlies { .. } => "as_the_crow_flies",
            DistanceProvider::Custom { .. } => "custom",
        }
    }
}
