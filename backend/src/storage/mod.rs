//! Storage layer: a trait the domain depends on plus the JSON blob
//! implementation used in production.

pub mod json;
pub mod traits;

pub use json::{JsonConnection, OccurrenceRepository};
pub use traits::OccurrenceStore;
