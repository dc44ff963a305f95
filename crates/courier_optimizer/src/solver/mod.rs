pub mod construction;
pub mod grasp;
pub mod solution;
pub mod solver_params;
