//! Interrupt-driven peripherals and system supervision.

pub mod rf_receiver;
pub mod watchdog;
