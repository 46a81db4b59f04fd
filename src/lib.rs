pub mod ask;
pub mod cohere;
pub mod config;
pub mod models;
pub mod qdrant_store;
pub mod server;

pub use config::AppConfig;
pub use server::run_server;
