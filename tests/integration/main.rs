//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! in-memory lines and a recording event sink.  The async tests run the
//! real loops on the host with short timings; no GPIO is required.

mod coordinator_flow_tests;
mod debounce_flow_tests;
mod mock_lines;
