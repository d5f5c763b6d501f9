//! Karma store back-ends.

pub mod karma;
pub mod memory;
