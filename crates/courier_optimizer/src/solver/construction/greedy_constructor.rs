use super::construct_routes::{Candidate, ConstructRoutes};

/// Capacitated nearest neighbor: always extends the route with the closest
/// feasible point. Equal distances keep the point that comes first in the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyConstructor;

impl ConstructRoutes for GreedyConstructor {
    fn select_candidate<R>(&self, candidates: &[Candidate], _rng: &mut R) -> Candidate
    where
        R: rand::Rng,
    {
        let mut nearest = candidates[0];
        for &candidate in &candidates[1..] {
            if candidate.distance < nearest.distance {
                nearest = candidate;
            }
        }

        nearest
    }
}
