//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the SolarDim binaries."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the SolarDim workspace.
//! This crate exposes configuration loading and tracing initialisation
//! consumed by the command-line tooling.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, DefaultsConfig, FinanceConfig, LoadedAppConfig, LoggingConfig, ReportsConfig,
};
pub use logging::{init_tracing, LogFormat};
