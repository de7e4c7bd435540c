//! Command implementations

pub mod new;
