use serde::Serialize;

use crate::model::catalog::{Catalog, Context};
use crate::model::entry::TranslationType;

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub finished: usize,
    pub unfinished: usize,
    pub untranslated: usize,
    pub obsolete: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContextStats {
    pub name: String,
    pub counts: Counts,
    pub percent_complete: f32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CatalogStats {
    pub language: String,
    pub total: Counts,
    pub percent_complete: f32,
    pub contexts: Vec<ContextStats>,
}

impl Counts {
    /// Messages still present in the source code.
    pub fn active(&self) -> usize {
        self.finished + self.unfinished + self.untranslated
    }

    fn add(&mut self, other: &Counts) {
        self.finished += other.finished;
        self.unfinished += other.unfinished;
        self.untranslated += other.untranslated;
        self.obsolete += other.obsolete;
    }

    fn percent(&self) -> f32 {
        match self.active() {
            0 => 100.0,
            n => self.finished as f32 * 100.0 / n as f32,
        }
    }
}

pub fn compute(catalog: &Catalog) -> CatalogStats {
    let mut total = Counts::default();
    let mut contexts = Vec::with_capacity(catalog.contexts.len());

    for ctx in &catalog.contexts {
        let counts = count(ctx);
        total.add(&counts);
        contexts.push(ContextStats {
            name: ctx.name.clone(),
            percent_complete: counts.percent(),
            counts,
        });
    }

    CatalogStats {
        language: catalog.language.clone(),
        percent_complete: total.percent(),
        total,
        contexts,
    }
}

fn count(ctx: &Context) -> Counts {
    let mut c = Counts::default();

    for m in &ctx.messages {
        if m.translation_type.is_retired() {
            c.obsolete += 1;
        } else if m.is_untranslated() {
            c.untranslated += 1;
        } else if m.translation_type == TranslationType::Unfinished {
            c.unfinished += 1;
        } else {
            c.finished += 1;
        }
    }

    c
}

impl CatalogStats {
    /// One line in the style lrelease prints after compiling a catalog.
    pub fn summary(&self) -> String {
        let t = &self.total;
        let mut line = format!(
            "Generated {} translation(s) ({} finished and {} unfinished)",
            t.finished + t.unfinished,
            t.finished,
            t.unfinished
        );
        if t.untranslated > 0 {
            line.push_str(&format!("\nIgnored {} untranslated source text(s)", t.untranslated));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::TranslationEntry;
    use crate::parsers::ts;

    const MYTHNEWS_DE: &str = include_str!("../../testdata/mythnews_de.ts");

    #[test]
    fn german_catalog_is_complete() {
        let stats = compute(&ts::parse(MYTHNEWS_DE).unwrap());

        assert_eq!(stats.total.finished, 26);
        assert_eq!(stats.total.active(), 26);
        assert_eq!(stats.percent_complete, 100.0);
        assert_eq!(stats.contexts.len(), 5);
        assert_eq!(stats.contexts[4].name, "ThemeUI");
        assert_eq!(stats.contexts[4].counts.finished, 1);
        assert_eq!(
            stats.summary(),
            "Generated 26 translation(s) (26 finished and 0 unfinished)"
        );
    }

    #[test]
    fn classifies_every_state() {
        let mut cat = Catalog::new("de_DE", "en_US");
        let ctx = cat.context_mut("MythNews");
        ctx.messages.push(TranslationEntry::new("Cancel", "Abbrechen"));
        ctx.messages.push(
            TranslationEntry::new("Options", "Optionen").with_type(TranslationType::Unfinished),
        );
        ctx.messages.push(TranslationEntry::new("Updated", ""));
        ctx.messages.push(TranslationEntry::new("Unknown", "").with_type(TranslationType::Unfinished));
        ctx.messages
            .push(TranslationEntry::new("Old", "Alt").with_type(TranslationType::Obsolete));

        let stats = compute(&cat);
        assert_eq!(
            stats.total,
            Counts {
                finished: 1,
                unfinished: 1,
                untranslated: 2,
                obsolete: 1,
            }
        );
        assert_eq!(stats.percent_complete, 25.0);
        assert_eq!(
            stats.summary(),
            "Generated 2 translation(s) (1 finished and 1 unfinished)\nIgnored 2 untranslated source text(s)"
        );
    }

    #[test]
    fn empty_catalog_counts_as_complete() {
        let stats = compute(&Catalog::new("de", "en"));
        assert_eq!(stats.percent_complete, 100.0);
        assert!(stats.contexts.is_empty());
    }
}
