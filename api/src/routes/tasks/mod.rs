pub mod task_request;
pub mod task_route;
