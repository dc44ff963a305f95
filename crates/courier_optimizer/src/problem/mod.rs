pub mod distance_matrix;
pub mod point;
pub mod routing_problem;
pub mod vehicle;
