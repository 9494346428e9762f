//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the full `AlarmService`
//! loop against mock adapters.  All tests run on the host (x86_64) with
//! no real hardware required.

mod alarm_flow_tests;
mod link_tests;
mod mock_hw;
