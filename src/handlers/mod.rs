// src/handlers/mod.rs
pub mod analysis;
pub mod benchmarking;
pub mod error;
pub mod overview;
pub mod ticker;
