//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the scripted mock transport.  No server required.

mod load_tests;
mod mock_transport;
mod safe_client_tests;
mod synchronizer_tests;
mod vim_tests;
