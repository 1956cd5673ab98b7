//! Value Objects - Immutable, identity-less domain primitives

mod category;
mod priority;
mod source;

pub use category::Category;
pub use priority::Priority;
pub use source::Source;
