use std::fmt;

use crate::error::{CatalogError, Result};

/// A `language[_TERRITORY]` locale as used in TS file names and the `language` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    pub language: String,
    pub territory: Option<String>,
}

impl Locale {
    /// Accepts `de`, `de_DE`, `de-DE` and POSIX forms such as `pt_BR.UTF-8` or `sr_RS@latin`.
    pub fn parse(tag: &str) -> Result<Self> {
        let base = tag
            .trim()
            .split(['.', '@'])
            .next()
            .unwrap_or("");

        let mut parts = base.split(['_', '-']);
        let language = parts.next().unwrap_or("").to_ascii_lowercase();
        let territory = parts.next().map(|t| t.to_ascii_uppercase());

        let valid_lang = (2..=3).contains(&language.len())
            && language.chars().all(|c| c.is_ascii_alphabetic());
        let valid_territory = territory
            .as_deref()
            .map_or(true, |t| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric()));

        if !valid_lang || !valid_territory || parts.next().is_some() {
            return Err(CatalogError::Config(format!("invalid locale: {tag}")));
        }

        Ok(Locale {
            language,
            territory,
        })
    }

    /// Most specific first: `de_DE` then `de`.
    pub fn fallback_chain(&self) -> Vec<String> {
        let mut chain = Vec::with_capacity(2);
        if self.territory.is_some() {
            chain.push(self.to_string());
        }
        chain.push(self.language.clone());
        chain
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.territory {
            Some(t) => write!(f, "{}_{}", self.language, t),
            None => f.write_str(&self.language),
        }
    }
}
