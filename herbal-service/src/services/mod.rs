pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod remedy;

pub use remedy::{RemedyService, RemedyTimeouts};
