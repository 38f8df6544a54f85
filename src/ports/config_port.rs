//! Configuration access port.
//!
//! Values come back as raw strings so that the domain decides what counts
//! as missing and what counts as malformed.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
