pub mod classifier;
pub mod config;
pub mod logging;
pub mod middleware;
pub mod protocols;
pub mod provider;
pub mod server;
