//! Integration test crate for the weave social core.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end social flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p weave-integration-tests
//! ```
