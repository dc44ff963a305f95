use rand::Rng;

use super::construct_routes::{Candidate, ConstructRoutes};

pub const DEFAULT_RCL_SIZE: usize = 3;

/// Semi-greedy construction: the next point is drawn uniformly among the
/// `rcl_size` closest feasible candidates (the restricted candidate list).
#[derive(Debug, Clone, Copy)]
pub struct RandomizedConstructor {
    rcl_size: usize,
}

impl RandomizedConstructor {
    pub fn new(rcl_size: usize) -> Self {
        Self { rcl_size }
    }

    pub fn rcl_size(&self) -> usize {
        self.rcl_size
    }
}

impl Default for RandomizedConstructor {
    fn default() -> Self {
        Self::new(DEFAULT_RCL_SIZE)
    }
}

impl ConstructRoutes for RandomizedConstructor {
    fn select_candidate<R>(&self, candidates: &[Candidate], rng: &mut R) -> Candidate
    where
        R: Rng,
    {
        let mut ranked = candidates.to_vec();
        // Stable sort, equal distances keep the input order
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let restricted = &ranked[..self.rcl_size.clamp(1, ranked.len())];

        restricted[rng.random_range(0..restricted.len())]
    }
}
