//! Integration tests: raw snapshots through normalization, statistics,
//! planning and persistence.

mod fixtures;
mod pipeline;
