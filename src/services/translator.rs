use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::catalog::Catalog;
use crate::model::entry::{TranslationEntry, TranslationType};
use crate::services::numerus::NumerusRule;

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Unfinished translations are used like finished ones, as lrelease does by default.
    pub include_unfinished: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            include_unfinished: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolved {
    Text(String),
    Forms(Vec<String>),
}

// context -> source -> disambiguation -> text
type Index = HashMap<String, HashMap<String, HashMap<String, Resolved>>>;

/// Read-only lookup table built from one or more catalogs.
///
/// Once built it is never mutated by lookups, so a shared reference can be
/// handed to any number of threads.
#[derive(Debug, Clone)]
pub struct Translator {
    language: String,
    rule: NumerusRule,
    index: Index,
    len: usize,
}

impl Translator {
    pub fn new(language: impl Into<String>) -> Self {
        let language = language.into();
        Translator {
            rule: NumerusRule::for_language(&language),
            language,
            index: HashMap::new(),
            len: 0,
        }
    }

    pub fn from_catalog(catalog: &Catalog, options: &LoadOptions) -> Self {
        let mut translator = Translator::new(catalog.language.clone());
        translator.add_catalog(catalog, options);
        translator
    }

    /// Adds every usable message of `catalog`. Keys already present win, so
    /// catalogs must be added from the most to the least specific locale.
    /// Within one catalog only the first message of a key counts, usable or not.
    /// Returns the number of messages added.
    pub fn add_catalog(&mut self, catalog: &Catalog, options: &LoadOptions) -> usize {
        let before = self.len;
        let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
        let mut duplicates = 0usize;
        let mut overridden = 0usize;

        for context in &catalog.contexts {
            for m in &context.messages {
                if !seen.insert((context.name.as_str(), m.source.as_str(), m.comment.as_str())) {
                    duplicates += 1;
                    continue;
                }
                let Some(resolved) = resolve(m, options) else {
                    continue;
                };

                let slot = self
                    .index
                    .entry(context.name.clone())
                    .or_default()
                    .entry(m.source.clone())
                    .or_default();

                if slot.contains_key(&m.comment) {
                    overridden += 1;
                    continue;
                }
                slot.insert(m.comment.clone(), resolved);
                self.len += 1;
            }
        }

        if duplicates > 0 {
            warn!(
                language = %catalog.language,
                duplicates,
                "ignored repeated messages within one catalog"
            );
        }
        if overridden > 0 {
            debug!(
                language = %catalog.language,
                overridden,
                "messages already provided by a more specific catalog"
            );
        }

        self.len - before
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn rule(&self) -> NumerusRule {
        self.rule
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, context: &str, source: &str, disambiguation: Option<&str>) -> bool {
        self.find(context, source, disambiguation).is_some()
    }

    /// Translation of `source`, or `source` itself when none is loaded.
    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguation: Option<&str>,
    ) -> &'a str {
        match self.find(context, source, disambiguation) {
            Some(Resolved::Text(t)) => t.as_str(),
            Some(Resolved::Forms(forms)) => match forms.first() {
                Some(f) if !f.is_empty() => f.as_str(),
                _ => source,
            },
            None => {
                debug!(context, source, "no translation, using source text");
                source
            }
        }
    }

    /// Picks the numerus form for `n` and substitutes `%n`.
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        n: i64,
    ) -> String {
        let template = match self.find(context, source, disambiguation) {
            Some(Resolved::Text(t)) => t.as_str(),
            Some(Resolved::Forms(forms)) => {
                let idx = self.rule.form_index(n).min(forms.len().saturating_sub(1));
                match forms.get(idx) {
                    Some(f) if !f.is_empty() => f.as_str(),
                    _ => source,
                }
            }
            None => source,
        };

        substitute_count(template, n)
    }

    fn find(&self, context: &str, source: &str, disambiguation: Option<&str>) -> Option<&Resolved> {
        let by_comment = self.index.get(context)?.get(source)?;
        let comment = disambiguation.unwrap_or("");

        by_comment.get(comment).or_else(|| {
            if comment.is_empty() {
                None
            } else {
                by_comment.get("")
            }
        })
    }
}

fn resolve(m: &TranslationEntry, options: &LoadOptions) -> Option<Resolved> {
    if m.translation_type.is_retired() || m.is_untranslated() {
        return None;
    }
    if m.translation_type == TranslationType::Unfinished && !options.include_unfinished {
        return None;
    }

    Some(if m.numerus {
        Resolved::Forms(m.numerus_forms.clone())
    } else {
        Resolved::Text(m.translation.clone())
    })
}

fn substitute_count(template: &str, n: i64) -> String {
    let count = n.to_string();
    template.replace("%Ln", &count).replace("%n", &count)
}
