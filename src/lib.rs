//! Truck loading sequence planner.
//!
//! Given a truck's cargo space and the order line items of one trip, the
//! planner reports volume and weight utilization and a deterministic
//! unit-by-unit loading order. The core (`utilization`, `sequencer`,
//! `planner`) is pure; `api` exposes it over HTTP.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod planner;
pub mod sequencer;
pub mod types;
pub mod utilization;

pub use error::PlanError;
pub use planner::{LoadPlanResult, PlannerConfig, plan_load, plan_load_with_config};
