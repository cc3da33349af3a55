//! Helpers for serialization and deserialization.

pub mod duration;
