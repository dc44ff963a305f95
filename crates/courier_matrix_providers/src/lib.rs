pub mod as_the_crow_flies;
pub mod custom_distances;
pub mod distance_client;
pub mod distance_oracle;
pub mod distance_provider;
pub mod valhalla_api;
