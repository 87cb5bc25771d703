pub mod aggregate;
pub mod api;
pub mod config;
pub mod enrich;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod store;
