//! Worksheet language.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language the concept review and practice problems are written in.
///
/// The display name is sent to the model verbatim and printed in the
/// worksheet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    English,
    Tagalog,
    Cebuano,
    /// Tagalog–English code-switching, the classroom default.
    #[default]
    Taglish,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Tagalog,
        Language::Cebuano,
        Language::Taglish,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Tagalog => "Tagalog",
            Language::Cebuano => "Cebuano",
            Language::Taglish => "Taglish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names none of the four languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown language '{}' (expected English, Tagalog, Cebuano or Taglish)",
            self.0
        )
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
