//! # skein-debug
//!
//! Binary state snapshots for debugging simulation issues. A snapshot
//! stores a body's positions and velocities after a frame, the frame's
//! solver statistics and, for hair, the continuum grid.

pub mod snapshot;

pub use snapshot::StateSnapshot;
