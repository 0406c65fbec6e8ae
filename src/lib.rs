pub mod api;
pub mod config;
pub mod domain;
pub mod forecast;
pub mod ml;
pub mod service;
pub mod telemetry;
