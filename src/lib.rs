//! Quota Engine library crate.
//!
//! This crate computes how many additional foreign workers a
//! manufacturing employer may hire under the quota regulation.  The
//! core is a pure function, `engine::compute_quota`, over a validated
//! `models::CompanyProfile`; the API and report modules are thin
//! layers around it.

pub mod models;
pub mod error;
pub mod rules;
pub mod intake;
pub mod engine;
pub mod report;
pub mod config;
pub mod telemetry;
pub mod api;

pub use engine::{compute_batch, compute_quota};
pub use error::QuotaError;
pub use models::{CompanyProfile, QuotaResult, RateTier};
pub use rules::{regulatory_round, QuotaRules};
