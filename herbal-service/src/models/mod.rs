pub mod remedy;

pub use remedy::{RemedyData, RemedyResponse, RemedyResult, SymptomText};
