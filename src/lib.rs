//! BlitzBoat: boat-race chance race detection and trifecta ticket allocation.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod parse;
pub mod strategy;
pub mod storage;
pub mod daily;
pub mod report;
