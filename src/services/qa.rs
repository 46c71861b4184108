use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::entry::{TranslationEntry, TranslationType};
use crate::services::numerus::NumerusRule;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub context: String,
    pub source: String,
    pub code: String,
    pub message: String,
}

pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let placeholder_re = placeholder_regex();
    let rule = NumerusRule::for_language(&catalog.language);
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();

    for (ctx, e) in catalog.entries() {
        let mut push = |code: &str, message: String| {
            issues.push(QaIssue {
                context: ctx.to_string(),
                source: e.source.clone(),
                code: code.to_string(),
                message,
            });
        };

        if !seen.insert((ctx, e.source.as_str(), e.comment.as_str())) {
            push(
                "DUPLICATE_MESSAGE",
                "Source text occurs more than once in this context".to_string(),
            );
        }

        // Retired messages are kept for reference only.
        if e.translation_type.is_retired() {
            continue;
        }

        if e.is_untranslated() {
            push(
                "EMPTY_TRANSLATION",
                "No translation; the source text is shown".to_string(),
            );
            continue;
        }

        if e.translation_type == TranslationType::Unfinished {
            push(
                "UNFINISHED",
                "Translation is marked unfinished".to_string(),
            );
        }

        if e.numerus && e.numerus_forms.len() != rule.form_count() {
            push(
                "NUMERUS_FORM_COUNT",
                format!(
                    "Expected {} plural forms for '{}', found {}",
                    rule.form_count(),
                    catalog.language,
                    e.numerus_forms.len()
                ),
            );
        }

        for text in translations(e) {
            if text.is_empty() {
                continue;
            }

            // Identical text is normal for single-word labels ("Ok", "URL:").
            if text.trim() == e.source.trim() && e.source.split_whitespace().count() > 1 {
                push(
                    "SAME_AS_SOURCE",
                    "Translation is identical to the source text".to_string(),
                );
            }

            let expected = placeholders(&placeholder_re, &e.source);
            let found = placeholders(&placeholder_re, text);
            if expected != found {
                push(
                    "PLACEHOLDER_MISMATCH",
                    format!(
                        "Placeholders differ: source {:?}, translation {:?}",
                        expected, found
                    ),
                );
            }

            if leading_ws(&e.source) != leading_ws(text)
                || trailing_ws(&e.source) != trailing_ws(text)
            {
                push(
                    "WHITESPACE_MISMATCH",
                    "Leading or trailing whitespace differs from the source text".to_string(),
                );
            }
        }
    }

    issues
}

fn translations(e: &TranslationEntry) -> Vec<&str> {
    if e.numerus {
        e.numerus_forms.iter().map(String::as_str).collect()
    } else {
        vec![e.translation.as_str()]
    }
}

fn placeholder_regex() -> Regex {
    // %1..%99 and the plural count %n / %Ln
    Regex::new(r"%L?(\d{1,2}|n)").expect("static regex")
}

fn placeholders(re: &Regex, text: &str) -> BTreeSet<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn leading_ws(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

fn trailing_ws(s: &str) -> &str {
    &s[s.trim_end().len()..]
}
