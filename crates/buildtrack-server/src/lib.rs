pub mod config;
pub mod export;

pub use config::Config;
