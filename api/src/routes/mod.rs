pub mod embeddings;
pub mod generate;
pub mod health_route;
pub mod models;
pub mod summarize;
pub mod tasks;
