//! Measurement catalog for the air quality monitor.
//!
//! The sensor uploads one CSV file per interval into an object store under
//! `hourly/`, `daily/`, `weekly/` and `monthly/`. This crate lists those
//! files, prunes hourly files from past days, orders the rest by the time
//! encoded in their names, decodes individual files into readings, and
//! fetches the alert verdict computed by a separate decision service.
//!
//! Module layout:
//! - `dates`: timestamp derivation from file names
//! - `catalog`: classification, retention and ordering over a store
//! - `decoder`: measurement file rows
//! - `store`: the object store seam and its backends
//! - `alert`, `devices`: outbound HTTP clients
//! - `routes`: the HTTP API served by the binary

pub mod alert;
pub mod catalog;
pub mod config;
pub mod dates;
pub mod decoder;
pub mod devices;
mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
