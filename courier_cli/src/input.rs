use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use courier_matrix_providers::distance_provider::DistanceProvider;
use courier_optimizer::json::types::JsonRoutingProblem;

pub fn read_problem(path: &Path) -> anyhow::Result<JsonRoutingProblem> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid problem file {}", path.display()))
}

/// Only the Valhalla provider performs network requests, other providers are left untouched.
pub fn set_request_timeout(problem: &mut JsonRoutingProblem, timeout: jiff::SignedDuration) {
    if let Some(DistanceProvider::Valhalla { timeout_secs, .. }) = &mut problem.provider {
        *timeout_secs = Some(timeout.as_secs().max(1) as u64);
    }
}
