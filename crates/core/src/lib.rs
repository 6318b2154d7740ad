//! Shared types for the clipforge media pipeline.
//!
//! Holds the material record returned by search providers and the
//! task-directory layout used to store per-task artifacts on disk.

pub mod material;
pub mod tasks;
