//! SDRF validation core.
//!
//! Payload normalization, the template registry, the rule engine boundary
//! (with the built-in SDRF engine), multi-template aggregation, and the
//! external report shape. No HTTP concerns live here.

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod issue;
pub mod payload;
pub mod registry;
pub mod report;
