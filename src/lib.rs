//! Opentribe - view tracking for marketplace listings
//!
//! This library records deduplicated page views for grants, bounties, RFPs,
//! submissions and grant applications, and exposes them over HTTP.
//!
//! # Architecture
//! - `views`: View manager, entity references and the `ViewStore` seam
//! - `storage`: SeaORM-backed storage (SQLite, MySQL, PostgreSQL)
//! - `api`: HTTP services (record view, cron cleanup, health)
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and shutdown handling
//! - `utils`: Request header helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod storage;
pub mod system;
pub mod utils;
pub mod views;
