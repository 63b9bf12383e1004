//! Concrete solver implementations.

pub mod default;
