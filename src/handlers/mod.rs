//! HTTP handlers for configured containers.

pub mod container;
pub use container::*;
