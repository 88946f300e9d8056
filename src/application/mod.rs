//! Application services layer.

pub mod error;
pub mod levels;
pub mod repos;
