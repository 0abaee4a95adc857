use crate::JugalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversation language, used for recognition locale and voice choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Nepali,
}

impl Language {
    /// BCP-47 locale handed to the platform speech services
    pub fn locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Nepali => "ne-NP",
        }
    }

    /// Language part of the locale, matched against voice locales
    pub fn prefix(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Nepali => "ne",
        }
    }

    /// Closest higher-resource language whose voices can stand in
    pub fn fallback_prefix(&self) -> Option<&'static str> {
        match self {
            Language::English => None,
            // Hindi shares the Devanagari script
            Language::Nepali => Some("hi"),
        }
    }

    /// Short label for the language toggle
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "ENG",
            Language::Nepali => "NEP",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locale())
    }
}

impl FromStr for Language {
    type Err = JugalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "eng" | "english" | "en-us" => Ok(Language::English),
            "ne" | "nep" | "nepali" | "ne-np" => Ok(Language::Nepali),
            other => Err(JugalError::ConfigError(format!(
                "Unknown language: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locales() {
        assert_eq!(Language::English.locale(), "en-US");
        assert_eq!(Language::Nepali.locale(), "ne-NP");
        assert_eq!(Language::Nepali.prefix(), "ne");
    }

    #[test]
    fn test_fallback_only_for_nepali() {
        assert_eq!(Language::English.fallback_prefix(), None);
        assert_eq!(Language::Nepali.fallback_prefix(), Some("hi"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("NEP".parse::<Language>().unwrap(), Language::Nepali);
        assert_eq!("en-US".parse::<Language>().unwrap(), Language::English);
        assert!("fr".parse::<Language>().is_err());
    }
}
