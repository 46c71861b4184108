use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::entry::TranslationEntry;

fn default_version() -> String {
    "2.1".to_string()
}

/// A parsed TS document: target/source locale plus ordered contexts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub source_language: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub name: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub messages: Vec<TranslationEntry>,
}

/// (context, source, translation)
pub type Triple = (String, String, String);

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            version: default_version(),
            language: String::new(),
            source_language: String::new(),
            contexts: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn new(language: impl Into<String>, source_language: impl Into<String>) -> Self {
        Catalog {
            language: language.into(),
            source_language: source_language.into(),
            ..Default::default()
        }
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Returns the context named `name`, appending an empty one if missing.
    pub fn context_mut(&mut self, name: &str) -> &mut Context {
        let idx = match self.contexts.iter().position(|c| c.name == name) {
            Some(i) => i,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[idx]
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TranslationEntry)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Sorted set of (context, source, translation). Numerus forms are joined with `\u{9c}`,
    /// the separator lrelease uses for plural variants.
    pub fn triples(&self) -> BTreeSet<Triple> {
        self.entries()
            .map(|(ctx, m)| {
                let translation = if m.numerus {
                    m.numerus_forms.join("\u{9c}")
                } else {
                    m.translation.clone()
                };
                (ctx.to_string(), m.source.clone(), translation)
            })
            .collect()
    }

    /// Every (context, source, comment) key that occurs more than once, in document order.
    pub fn duplicate_keys(&self) -> Vec<(String, String, String)> {
        let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
        let mut dups = Vec::new();

        for (ctx, m) in self.entries() {
            let key = (ctx, m.source.as_str(), m.comment.as_str());
            if !seen.insert(key) {
                dups.push((ctx.to_string(), m.source.clone(), m.comment.clone()));
            }
        }

        dups
    }

    pub fn validate(&self) -> Result<()> {
        match self.duplicate_keys().into_iter().next() {
            Some((context, source_text, _)) => Err(CatalogError::DuplicateKey {
                context,
                source_text,
            }),
            None => Ok(()),
        }
    }
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Context {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn find(&self, source: &str, comment: &str) -> Option<&TranslationEntry> {
        self.messages
            .iter()
            .find(|m| m.source == source && m.comment == comment)
    }
}
