pub mod embeddings_route;
