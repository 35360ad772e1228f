pub mod summarize_request;
pub mod summarize_route;
