//! # skein-telemetry
//!
//! Event bus for simulation telemetry. Emits structured per-frame
//! events (timing, convergence, contacts, energy, hair grid) that are
//! consumed by pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::{EventBus, EventEmitter};
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
