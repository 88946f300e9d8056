//! Domain layer types and invariants.

pub mod error;
pub mod field;
pub mod levels;

pub use field::Field;
pub use levels::{Level, LevelFields, LevelPayload};
