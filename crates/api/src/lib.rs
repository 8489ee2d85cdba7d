//! HTTP host surface: login events, on-demand refresh, level inspection.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
