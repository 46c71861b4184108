use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::model::catalog::Catalog;
use crate::model::entry::{TranslationEntry, TranslationType};
use crate::services::normalize::normalize;
use crate::services::numerus::NumerusRule;

#[derive(Debug, Serialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Key found unchanged; translation carried over.
    pub same: usize,
    /// Source changed only in case, spacing or punctuation; translation carried over as unfinished.
    pub similar: usize,
    pub new: usize,
    /// Translated messages that no longer exist in the fresh extraction.
    pub vanished: usize,
}

/// Merges an existing translation into a freshly extracted catalog.
///
/// The fresh catalog decides which messages exist and in which order; the
/// existing one contributes translations. Existing translated messages
/// without a counterpart are kept at the end of their context as vanished.
pub fn merge(existing: &Catalog, fresh: &Catalog) -> (Catalog, MergeReport) {
    let language = if existing.language.is_empty() {
        fresh.language.clone()
    } else {
        existing.language.clone()
    };
    let source_language = if existing.source_language.is_empty() {
        fresh.source_language.clone()
    } else {
        existing.source_language.clone()
    };
    let rule = NumerusRule::for_language(&language);

    let mut out = Catalog {
        version: fresh.version.clone(),
        language,
        source_language,
        contexts: Vec::with_capacity(fresh.contexts.len()),
    };
    let mut report = MergeReport::default();
    // (context index, message index) into `existing`
    let mut used: HashSet<(usize, usize)> = HashSet::new();

    for fresh_ctx in &fresh.contexts {
        let old_ctx = existing
            .contexts
            .iter()
            .position(|c| c.name == fresh_ctx.name);

        let ctx = out.context_mut(&fresh_ctx.name);
        if ctx.comment.is_none() {
            ctx.comment = fresh_ctx.comment.clone();
        }

        for m in &fresh_ctx.messages {
            let mut merged = m.clone();

            match old_ctx.and_then(|ci| find_exact(existing, ci, m, &used)) {
                Some((ci, mi)) => {
                    let old = &existing.contexts[ci].messages[mi];
                    carry_translation(&mut merged, old);
                    merged.translation_type = if old.translation_type.is_retired() {
                        TranslationType::Unfinished
                    } else {
                        old.translation_type
                    };
                    used.insert((ci, mi));
                    report.same += 1;
                }
                None => match old_ctx.and_then(|ci| find_similar(existing, ci, m, &used)) {
                    Some((ci, mi)) => {
                        let old = &existing.contexts[ci].messages[mi];
                        carry_translation(&mut merged, old);
                        merged.old_source = Some(old.source.clone());
                        merged.translation_type = TranslationType::Unfinished;
                        used.insert((ci, mi));
                        report.similar += 1;
                    }
                    None => {
                        merged.translation.clear();
                        merged.translation_type = TranslationType::Unfinished;
                        if merged.numerus {
                            merged.numerus_forms = vec![String::new(); rule.form_count()];
                        }
                        report.new += 1;
                    }
                },
            }

            ctx.messages.push(merged);
        }
    }

    for (ci, old_ctx) in existing.contexts.iter().enumerate() {
        for (mi, old) in old_ctx.messages.iter().enumerate() {
            if used.contains(&(ci, mi)) || old.is_untranslated() {
                continue;
            }
            let mut kept = old.clone();
            if kept.translation_type != TranslationType::Obsolete {
                kept.translation_type = TranslationType::Vanished;
            }
            out.context_mut(&old_ctx.name).messages.push(kept);
            report.vanished += 1;
        }
    }

    info!(
        same = report.same,
        similar = report.similar,
        new = report.new,
        vanished = report.vanished,
        "merged catalog"
    );

    (out, report)
}

fn find_exact(
    existing: &Catalog,
    ci: usize,
    m: &TranslationEntry,
    used: &HashSet<(usize, usize)>,
) -> Option<(usize, usize)> {
    existing.contexts[ci]
        .messages
        .iter()
        .enumerate()
        .find(|(mi, old)| {
            !used.contains(&(ci, *mi)) && old.source == m.source && old.comment == m.comment
        })
        .map(|(mi, _)| (ci, mi))
}

fn find_similar(
    existing: &Catalog,
    ci: usize,
    m: &TranslationEntry,
    used: &HashSet<(usize, usize)>,
) -> Option<(usize, usize)> {
    let norm = normalize(&m.source);
    if norm.is_empty() {
        return None;
    }

    existing.contexts[ci]
        .messages
        .iter()
        .enumerate()
        .find(|(mi, old)| {
            !used.contains(&(ci, *mi))
                && !old.is_untranslated()
                && old.numerus == m.numerus
                && normalize(&old.source) == norm
        })
        .map(|(mi, _)| (ci, mi))
}

fn carry_translation(target: &mut TranslationEntry, old: &TranslationEntry) {
    target.translation = old.translation.clone();
    target.numerus_forms = old.numerus_forms.clone();
    target.translator_comment = old.translator_comment.clone();
}
