//! Recompute programming club rank lists from per-event solve stats.

pub mod config;
pub mod model;
pub mod output;
pub mod recompute;
pub mod scoring;
pub mod store;
