//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the engine end to end
//! against mock pins and a recording sink.  All tests run on the host
//! (x86_64) with no real hardware required.

mod combo_tests;
mod queue_tests;
