//! Content languages supported by the wiki.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A language a piece of content is written in.
///
/// Stored as its lowercase ISO 639-1 code in `TEXT` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    Ja,
    En,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 3] = [Language::Ko, Language::Ja, Language::En];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::Ja => "ja",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ko" => Ok(Language::Ko),
            "ja" => Ok(Language::Ja),
            "en" => Ok(Language::En),
            other => Err(CoreError::Validation(format!(
                "Unsupported language '{other}'. Must be one of: ko, ja, en"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn rejects_unknown_and_uppercase() {
        assert!("fr".parse::<Language>().is_err());
        assert!("KO".parse::<Language>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Ja).unwrap(), "\"ja\"");
    }
}
