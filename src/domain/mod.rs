//! Core domain types and calculations.

pub mod num;
pub mod bar;
pub mod cost;
pub mod position;
pub mod trading_record;
pub mod analysis;
pub mod criteria;
pub mod config_validation;
pub mod error;
