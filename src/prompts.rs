//! Prompts for quiz-photo analysis.
//!
//! Keeping the prompt text here means the wording can change without
//! touching request or parsing code, and tests can inspect it directly.
//! The instruction is a pure function of the language and problem count.

use crate::language::Language;

/// Default system prompt: the remedial-teacher persona.
///
/// Used when `WorksheetConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert Filipino Master Teacher (Guro III) \
specialising in remedial education. You read photos of students' quizzes, find the exact \
misconception behind a wrong answer, and write short, encouraging remediation material. \
You always answer with a single JSON object and nothing else.";

/// JSON schema the reply must follow.
///
/// Sent inside the instruction because not every provider supports a
/// native response-schema constraint.
pub const RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "conceptReview": { "type": "string" },
    "practiceProblems": { "type": "array", "items": { "type": "string" } },
    "answerKey": { "type": "array", "items": { "type": "string" } }
  },
  "required": ["conceptReview", "practiceProblems", "answerKey"]
}"#;

/// Build the user instruction sent alongside the quiz photo.
pub fn analysis_instruction(language: Language, problem_count: usize) -> String {
    let english_only = if language == Language::English {
        "\n   - Use ONLY English. No Tagalog or Taglish words except proper nouns \
(e.g. Jeepney, Manila)."
    } else {
        ""
    };

    format!(
        r#"Analyse the attached photo of a student's failed quiz or worksheet.

1. FIND THE ERROR
   - Identify the specific misconception or mistake the student made.

2. DETECT THE QUESTION FORMAT
   - Decide whether the failed question is Multiple Choice, True/False,
     Identification, Fill-in-the-blanks or Matching Type.

3. conceptReview
   - Explain the correct concept simply and kindly.
   - Plain text only, no markdown. Open with a friendly line, list the key
     ideas or steps as lines starting with "- ", and close with a short
     encouraging remark.
   - Write it strictly in {language}.

4. practiceProblems
   - Exactly {problem_count} problems in the SAME format you detected in step 2.
   - Multiple Choice: the question, then options A, B, C and D on separate lines.
   - Fill-in-the-blanks: mark the blank with "________".
   - Identification / True or False: state the question clearly.
   - Use Filipino context (sari-sari store, jeepney fare, mangoes, wet market,
     peso coins, local geography).
   - Write them strictly in {language}.{english_only}

5. answerKey
   - Exactly {problem_count} answers, in the same order as the problems.
   - Multiple Choice: the letter followed by the full option text
     (e.g. "A. The full answer text").
   - Otherwise: the correct word, phrase or sentence.

Reply with ONE JSON object matching this schema and nothing else:
{schema}"#,
        language = language,
        problem_count = problem_count,
        english_only = english_only,
        schema = RESPONSE_SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_language_and_count() {
        let p = analysis_instruction(Language::Cebuano, 7);
        assert!(p.contains("strictly in Cebuano"));
        assert!(p.contains("Exactly 7 problems"));
        assert!(p.contains("Exactly 7 answers"));
        assert!(p.contains("\"answerKey\""));
    }

    #[test]
    fn instruction_is_deterministic() {
        assert_eq!(
            analysis_instruction(Language::Taglish, 5),
            analysis_instruction(Language::Taglish, 5)
        );
    }

    #[test]
    fn english_gets_no_taglish_rule() {
        assert!(analysis_instruction(Language::English, 5).contains("ONLY English"));
        assert!(!analysis_instruction(Language::Tagalog, 5).contains("ONLY English"));
    }

    #[test]
    fn schema_is_valid_json() {
        let v: serde_json::Value = serde_json::from_str(RESPONSE_SCHEMA).expect("valid JSON");
        assert_eq!(v["required"].as_array().map(|a| a.len()), Some(3));
    }
}
