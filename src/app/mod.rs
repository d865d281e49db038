pub mod config;
pub mod export;
pub mod render;

pub use config::AppConfig;
