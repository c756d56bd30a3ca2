//! different utility modules used throughout the project
/// engine settings and their TOML form
pub mod config;
/// logger setup and CSV export of sampled data
pub mod logger;
