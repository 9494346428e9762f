//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the business rules of the Sentinela alarm: the
//! arming state machine, command decoding for the three input channels,
//! connectivity supervision and the durable event log.  All interaction
//! with hardware and the network happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without peripherals.

pub mod channels;
pub mod clock;
pub mod commands;
pub mod connectivity;
pub mod controller;
pub mod debounce;
pub mod event_log;
pub mod events;
pub mod interval;
pub mod messages;
pub mod ports;
pub mod service;
