//! Sentinela alarm controller library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;

// The ESP-IDF adapters and drivers compile on the host with simulated
// back-ends; the real implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
