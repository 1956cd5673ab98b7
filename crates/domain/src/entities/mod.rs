//! Domain entities - request and result shapes of the suggestion engine

mod parsed_task;
mod suggestion;

pub use parsed_task::ParsedTask;
pub use suggestion::{MAX_TIPS, ModelOverride, SuggestionRequest, SuggestionResult};
