//! Request and response shapes for the remedy endpoint.
//!
//! Neither type is persisted; both live for the duration of one request.

use serde::Serialize;

/// A trimmed symptom description whose length has been checked.
///
/// Only constructed by `services::remedy::validate_symptoms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomText(String);

impl SymptomText {
    pub(crate) fn new_unchecked(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

/// Markdown remedy plan returned by the model, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemedyResult(String);

impl RemedyResult {
    pub(crate) fn new_unchecked(markdown: String) -> Self {
        Self(markdown)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Success envelope: `{ "status": "success", "data": { "remedy": ... } }`.
#[derive(Debug, Serialize)]
pub struct RemedyResponse {
    pub status: &'static str,
    pub data: RemedyData,
}

#[derive(Debug, Serialize)]
pub struct RemedyData {
    pub remedy: String,
}

impl From<RemedyResult> for RemedyResponse {
    fn from(result: RemedyResult) -> Self {
        Self {
            status: "success",
            data: RemedyData {
                remedy: result.into_inner(),
            },
        }
    }
}
