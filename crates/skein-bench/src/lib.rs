//! # skein-bench
//!
//! Benchmark suite for the skein solver.
//!
//! Provides four procedural scenarios, a frame-by-frame runner that
//! reports through the telemetry bus, and CSV/JSON export for regression
//! tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind, SceneFile};
