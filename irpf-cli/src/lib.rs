//! Command-line shell around `irpf-core`: argument handling, configuration,
//! logging, batch CSV input and BRL formatting.

pub mod app;
pub mod config;
pub mod csv_loader;
pub mod logging;
pub mod report;
pub mod utils;
