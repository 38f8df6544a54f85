//! perfcurve: equity curves and performance criteria for trading records.
//!
//! Hexagonal layout: pure computation in [`domain`], port traits in [`ports`],
//! file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
