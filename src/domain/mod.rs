pub mod comics;
pub mod errors;
pub mod generator;

pub use errors::{GenerationError, ValidationError};
