//! Shared test harness
//!
//! Each integration test binary compiles this module independently, so not
//! every helper is used by every binary.
#![allow(dead_code)]

pub mod config;
pub mod mock_backend;
pub mod server;
