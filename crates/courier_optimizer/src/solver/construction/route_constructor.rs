use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use super::{
    construct_routes::{Candidate, ConstructRoutes},
    greedy_constructor::GreedyConstructor,
    randomized_constructor::RandomizedConstructor,
};

#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    #[error("Unknown strategy '{0}', expected 'greedy' or 'randomized'")]
    UnknownStrategy(String),

    #[error("RCL size must be at least 1")]
    InvalidRclSize,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "name")]
pub enum ConstructionStrategy {
    Greedy,
    Randomized { rcl_size: usize },
}

impl ConstructionStrategy {
    pub fn randomized(rcl_size: usize) -> Result<Self, StrategyError> {
        if rcl_size == 0 {
            return Err(StrategyError::InvalidRclSize);
        }

        Ok(ConstructionStrategy::Randomized { rcl_size })
    }

    /// Resolves a configured strategy name. `rcl_size` is only used by `randomized`.
    pub fn from_name(name: &str, rcl_size: usize) -> Result<Self, StrategyError> {
        match name {
            "greedy" => Ok(ConstructionStrategy::Greedy),
            "randomized" => Self::randomized(rcl_size),
            other => Err(StrategyError::UnknownStrategy(other.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConstructionStrategy::Greedy => "greedy",
            ConstructionStrategy::Randomized { .. } => "randomized",
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, ConstructionStrategy::Greedy)
    }

    pub fn constructor(&self) -> RouteConstructor {
        match *self {
            ConstructionStrategy::Greedy => RouteConstructor::Greedy(GreedyConstructor),
            ConstructionStrategy::Randomized { rcl_size } => {
                RouteConstructor::Randomized(RandomizedConstructor::new(rcl_size))
            }
        }
    }
}

impl Display for ConstructionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructionStrategy::Greedy => write!(f, "greedy"),
            ConstructionStrategy::Randomized { rcl_size } => {
                write!(f, "randomized (rcl size {rcl_size})")
            }
        }
    }
}

pub enum RouteConstructor {
    Greedy(GreedyConstructor),
    Randomized(RandomizedConstructor),
}

impl ConstructRoutes for RouteConstructor {
    fn select_candidate<R>(&self, candidates: &[Candidate], rng: &mut R) -> Candidate
    where
        R: rand::Rng,
    {
        match self {
            RouteConstructor::Greedy(constructor) => constructor.select_candidate(candidates, rng),
            RouteConstructor::Randomized(constructor) => {
                constructor.select_candidate(candidates, rng)
            }
        }
    }
}
