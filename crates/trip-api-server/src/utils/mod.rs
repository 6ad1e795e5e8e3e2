pub mod error;
pub mod limiters;
pub mod llm_json;

pub use error::ApiError;
pub use limiters::{LimitError, Limiters};
