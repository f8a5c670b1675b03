//! Suitability prediction service: HTTP API and configuration

pub mod api;
pub mod config;
