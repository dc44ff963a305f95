use serde::Serialize;
use thiserror::Error;

use super::{point::Demand, routing_problem::ProblemError};

#[derive(Debug, Error, PartialEq)]
#[error(
    "Vehicle {vehicle} cannot load {demand}: current load {current_load}, capacity {capacity}"
)]
pub struct CapacityExceeded {
    pub vehicle: String,
    pub demand: Demand,
    pub current_load: Demand,
    pub capacity: Demand,
}

/// Tracks the load carried on the route currently being built.
///
/// `0 <= current_load <= capacity` holds after every successful [`Vehicle::load`].
#[derive(Serialize, Debug, Clone)]
pub struct Vehicle {
    id: String,
    capacity: Demand,
    current_load: Demand,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, capacity: Demand) -> Result<Self, ProblemError> {
        let id = id.into();

        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(ProblemError::InvalidCapacity { id, capacity });
        }

        Ok(Self {
            id,
            capacity,
            current_load: 0.0,
        })
    }

    pub fn with_generated_id(capacity: Demand) -> Result<Self, ProblemError> {
        Self::new(uuid::Uuid::new_v4().to_string(), capacity)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> Demand {
        self.capacity
    }

    pub fn current_load(&self) -> Demand {
        self.current_load
    }

    pub fn remaining_capacity(&self) -> Demand {
        self.capacity - self.current_load
    }

    pub fn can_load(&self, demand: Demand) -> bool {
        self.current_load + demand <= self.capacity
    }

    /// Callers are expected to check [`Vehicle::can_load`] first, the load is never clamped.
    pub fn load(&mut self, demand: Demand) -> Result<(), CapacityExceeded> {
        if !self.can_load(demand) {
            return Err(CapacityExceeded {
                vehicle: self.id.clone(),
                demand,
                current_load: self.current_load,
                capacity: self.capacity,
            });
        }

        self.current_load += demand;
        Ok(())
    }

    pub fn reset_load(&mut self) {
        self.current_load = 0.0;
    }
}
