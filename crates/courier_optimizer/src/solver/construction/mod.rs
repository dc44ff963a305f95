pub mod construct_routes;
pub mod greedy_constructor;
pub mod randomized_constructor;
pub mod route_constructor;
