use super::construction::route_constructor::ConstructionStrategy;

/// Iterations run by the randomized strategy when none are configured.
pub const DEFAULT_RANDOMIZED_ITERATIONS: usize = 25;

#[derive(Clone, Debug, PartialEq)]
pub struct GraspParams {
    pub strategy: ConstructionStrategy,
    /// Number of constructions, ignored by the greedy strategy
    pub iterations: Option<usize>,
    /// Seed of the first iteration, iteration `i` uses `seed + i`
    pub seed: Option<u64>,
    pub threads: Threads,
}

impl Default for GraspParams {
    fn default() -> Self {
        Self {
            strategy: ConstructionStrategy::Greedy,
            iterations: None,
            seed: None,
            threads: Threads::Auto,
        }
    }
}

impl GraspParams {
    /// Constructions actually performed for the configured strategy.
    pub fn effective_iterations(&self) -> usize {
        match self.strategy {
            ConstructionStrategy::Greedy => 1,
            ConstructionStrategy::Randomized { .. } => {
                self.iterations.unwrap_or(DEFAULT_RANDOMIZED_ITERATIONS)
            }
        }
    }

    /// Seed of the first iteration, drawn from the OS when not configured.
    /// Deterministic strategies use no seed.
    pub fn resolve_seed(&self) -> Option<u64> {
        if self.strategy.is_deterministic() {
            return None;
        }

        Some(self.seed.unwrap_or_else(rand::random))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}
