//! Port traits for the outside world.

pub mod config_port;
pub mod data_port;
