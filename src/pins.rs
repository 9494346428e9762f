//! GPIO pin assignments for the Sentinela controller board (ESP32 DevKit).
//!
//! Single source of truth: `main()` and the drivers reference this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// HC-SR501 PIR motion sensor output. HIGH = motion detected.
pub const PIR_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Relay module driving the siren (active HIGH). Must boot LOW.
pub const RELAY_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// DATA line of the 433 MHz superheterodyne receiver.
/// Interrupt on any edge; the ISR timestamps pulse widths.
pub const RF_RECEIVER_GPIO: i32 = 14;

/// Momentary arm/disarm button, internal pull-up, active LOW.
pub const BUTTON_GPIO: i32 = 27;
