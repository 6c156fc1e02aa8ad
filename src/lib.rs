pub mod config;
pub mod document;
pub mod engine;
pub mod model;
pub mod telemetry;
