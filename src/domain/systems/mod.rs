// Per-tick systems operating on the particle collection.

pub mod collisions;
pub mod eviction;
pub mod motion;
