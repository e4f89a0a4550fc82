//! Values produced by the two pipeline stages.

use crate::language::Language;
use serde::{Deserialize, Serialize};

/// The three-field payload returned by the analysis step.
///
/// Older replies omit `answerKey`; it then deserialises to an empty list.
/// A key whose length differs from `practice_problems` is tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResult {
    pub concept_review: String,
    pub practice_problems: Vec<String>,
    #[serde(default)]
    pub answer_key: Vec<String>,
}

impl StructuredResult {
    pub fn has_answer_key(&self) -> bool {
        !self.answer_key.is_empty()
    }

    /// `true` when the answer key is present and lines up with the problems.
    pub fn answer_key_matches(&self) -> bool {
        self.has_answer_key() && self.answer_key.len() == self.practice_problems.len()
    }
}

/// Counters for one analysis call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
    /// Size of the image payload actually sent (decoded bytes).
    pub image_bytes: usize,
}

/// Result of a successful analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub result: StructuredResult,
    pub language: Language,
    pub stats: AnalysisStats,
}

/// A finished worksheet, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct RenderedWorksheet {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub file_name: String,
}
