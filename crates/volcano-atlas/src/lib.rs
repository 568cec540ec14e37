//! Volcano activity atlas: loads the volcano export, scores each volcano's
//! danger level, and serves filtered views to chart renderers.

pub mod atlas;
pub mod config;
pub mod error;
pub mod telemetry;
