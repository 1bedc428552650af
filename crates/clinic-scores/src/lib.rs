//! Clinic review scoring: weighted NPS aggregation, composite and final
//! clinic scores, and CMS rank publication.

pub mod api;
pub mod config;
pub mod error;
pub mod publication;
pub mod scoring;
pub mod store;
pub mod telemetry;
