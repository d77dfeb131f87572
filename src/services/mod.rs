// src/services/mod.rs
pub mod benchmark;
pub mod dashboard;
pub mod error;
pub mod market_data;
pub mod metrics;
pub mod projection;
pub mod state;
pub mod views;
