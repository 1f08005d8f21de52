//! # clearlog testkit
//!
//! Testing utilities for the clearlog protocol.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a three-party bench (monitor, owner, receiver) wired
//!   into an in-memory resolver
//! - **Generators**: proptest strategies for access log values
//!
//! ## Test Fixtures
//!
//! ```rust
//! use clearlog_testkit::TestBench;
//!
//! let bench = TestBench::new();
//! let log = bench.sample_access_log();
//! let signed = bench.monitor.sign_access_log(&log).unwrap();
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestBench;
pub use generators::{access_log_from_params, AccessLogParams};
