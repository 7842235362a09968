//! SOOP dashboard - station map, charts and latest values over an OGC
//! SensorThings API.
//!
//! This library exposes the core modules for testing and reuse.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod observations;
pub mod series;
pub mod session;
pub mod sta;
