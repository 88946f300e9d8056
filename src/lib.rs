//! levelkeep: hierarchical level inheritance served through a level cache and
//! a response cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
