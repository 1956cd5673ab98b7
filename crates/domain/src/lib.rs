//! Domain layer for TaskSage
//!
//! Holds the vocabulary of task suggestions: categories, priorities,
//! provenance, and the request/result shapes exchanged with callers.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
