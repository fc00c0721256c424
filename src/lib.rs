pub mod app;
pub mod browse;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod playback;
pub mod preferences;
pub mod sources;
pub mod utils;
