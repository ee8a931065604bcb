//! Prometheus metrics for the Velero Dashboard API
//!
//! Request counts and latencies per route, plus counters for storage
//! validations and resource modifier cleanups.

mod prometheus;

pub use self::prometheus::*;
