//! Cell culture seeding and dilution planning.
//!
//! The planners in [`core::seeding`] and [`core::dilution`] are pure functions
//! over typed requests; [`core::calculator`] is the JSON boundary that builds
//! those requests from loosely typed payloads.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::storage::LocalStorage;
pub use crate::config::catalog::Catalog;
#[cfg(feature = "cli")]
pub use crate::config::{BulkConfig, CliConfig};

pub use crate::core::calculator::{SeedingCalculator, SeedingResponse};
pub use crate::core::engine::PlanningEngine;
pub use crate::core::pipeline::BulkSeedingPipeline;
pub use crate::utils::error::{CalcError, Result};
