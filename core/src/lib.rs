//! Deterministic OLAP/KPI query engine over in-memory synthetic facts.
//!
//! Layering, leaves first:
//!   store → normalize → aggregate → ranking → variance
//!   → facts / drilldown / query_spec / plan / kpi → engine

pub mod aggregate;
pub mod config;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod facts;
pub mod kpi;
pub mod normalize;
pub mod plan;
pub mod query_spec;
pub mod ranking;
pub mod store;
pub mod types;
pub mod variance;

pub use engine::QueryEngine;
pub use error::{NoData, Outcome, QueryError, QueryResult};
