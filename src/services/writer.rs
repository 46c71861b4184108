use std::fmt::Write;

use quick_xml::escape::escape;

use crate::model::catalog::{Catalog, Context};
use crate::model::entry::TranslationEntry;

/// Serializes a catalog in the layout lupdate produces.
pub fn write(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.message_count() * 160 + 128);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");

    out.push_str("<TS version=\"");
    out.push_str(&escape(catalog.version.as_str()));
    out.push('"');
    if !catalog.language.is_empty() {
        let _ = write!(out, " language=\"{}\"", escape(catalog.language.as_str()));
    }
    if !catalog.source_language.is_empty() {
        let _ = write!(
            out,
            " sourcelanguage=\"{}\"",
            escape(catalog.source_language.as_str())
        );
    }
    out.push_str(">\n");

    for context in &catalog.contexts {
        write_context(&mut out, context);
    }

    out.push_str("</TS>\n");
    out
}

fn write_context(out: &mut String, context: &Context) {
    out.push_str("<context>\n");
    element(out, 4, "name", &context.name);
    if let Some(comment) = &context.comment {
        element(out, 4, "comment", comment);
    }

    for m in &context.messages {
        write_message(out, m);
    }

    out.push_str("</context>\n");
}

fn write_message(out: &mut String, m: &TranslationEntry) {
    out.push_str("    <message");
    if let Some(id) = &m.id {
        let _ = write!(out, " id=\"{}\"", escape(id.as_str()));
    }
    if m.numerus {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    for loc in &m.locations {
        let _ = write!(
            out,
            "        <location filename=\"{}\"",
            escape(loc.filename.as_str())
        );
        if let Some(line) = loc.line {
            let _ = write!(out, " line=\"{line}\"");
        }
        out.push_str("/>\n");
    }

    element(out, 8, "source", &m.source);
    optional(out, "oldsource", m.old_source.as_deref());
    if !m.comment.is_empty() {
        element(out, 8, "comment", &m.comment);
    }
    optional(out, "oldcomment", m.old_comment.as_deref());
    optional(out, "extracomment", m.extra_comment.as_deref());
    optional(out, "translatorcomment", m.translator_comment.as_deref());

    out.push_str("        <translation");
    if let Some(ty) = m.translation_type.attribute() {
        let _ = write!(out, " type=\"{ty}\"");
    }
    out.push('>');

    if m.numerus {
        out.push('\n');
        for form in &m.numerus_forms {
            element(out, 12, "numerusform", form);
        }
        out.push_str("        ");
    } else {
        protect(out, &m.translation);
    }
    out.push_str("</translation>\n");

    out.push_str("    </message>\n");
}

fn optional(out: &mut String, tag: &str, value: Option<&str>) {
    if let Some(v) = value {
        element(out, 8, tag, v);
    }
}

fn element(out: &mut String, indent: usize, tag: &str, text: &str) {
    for _ in 0..indent {
        out.push(' ');
    }
    let _ = write!(out, "<{tag}>");
    protect(out, text);
    let _ = writeln!(out, "</{tag}>");
}

/// Escapes markup characters; control characters become `<byte value="xNN"/>`.
fn protect(out: &mut String, text: &str) {
    let mut run_start = 0;

    for (i, ch) in text.char_indices() {
        if is_control(ch) {
            out.push_str(&escape(&text[run_start..i]));
            let _ = write!(out, "<byte value=\"x{:x}\"/>", ch as u32);
            run_start = i + ch.len_utf8();
        }
    }

    out.push_str(&escape(&text[run_start..]));
}

fn is_control(ch: char) -> bool {
    (ch as u32) < 0x20 && !matches!(ch, '\n' | '\r' | '\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::TranslationType;
    use crate::parsers::ts;

    const MYTHNEWS_DE: &str = include_str!("../../testdata/mythnews_de.ts");

    #[test]
    fn reproduces_lupdate_output_byte_for_byte() {
        let cat = ts::parse(MYTHNEWS_DE).unwrap();
        assert_eq!(write(&cat), MYTHNEWS_DE);
    }

    #[test]
    fn reparse_yields_same_triples() {
        let cat = ts::parse(MYTHNEWS_DE).unwrap();
        let again = ts::parse(&write(&cat)).unwrap();

        assert_eq!(cat.triples(), again.triples());
        assert_eq!(cat, again);
    }

    #[test]
    fn writes_numerus_comments_and_types() {
        let mut cat = Catalog::new("de_DE", "en_US");
        cat.context_mut("ChannelImporter").messages.push(
            TranslationEntry::new("Found %n channel(s)", "")
                .with_comment("scan")
                .with_type(TranslationType::Unfinished)
                .with_numerus_forms(vec!["%n Kanal".into(), "%n Kanäle".into()]),
        );

        let text = write(&cat);
        assert!(text.contains("    <message numerus=\"yes\">\n"));
        assert!(text.contains("        <comment>scan</comment>\n"));
        assert!(text.contains(
            "        <translation type=\"unfinished\">\n            <numerusform>%n Kanal</numerusform>\n            <numerusform>%n Kanäle</numerusform>\n        </translation>\n"
        ));

        assert_eq!(ts::parse(&text).unwrap(), cat);
    }

    #[test]
    fn escapes_markup_and_control_characters() {
        let mut cat = Catalog::new("de", "");
        cat.context_mut("A")
            .messages
            .push(TranslationEntry::new("<b>\"Tom & Jerry\"</b>\u{1b}", "x\ty"));

        let text = write(&cat);
        assert!(text.contains(
            "<source>&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;<byte value=\"x1b\"/></source>"
        ));
        assert!(!text.contains("sourcelanguage"));

        let again = ts::parse(&text).unwrap();
        assert_eq!(again.contexts[0].messages[0].source, "<b>\"Tom & Jerry\"</b>\u{1b}");
        assert_eq!(again.contexts[0].messages[0].translation, "x\ty");
    }

    #[test]
    fn context_comment_round_trips() {
        let mut cat = Catalog::new("de", "en_US");
        let ctx = cat.context_mut("MythNews");
        ctx.comment = Some("news reader screen".into());
        ctx.messages.push(TranslationEntry::new("Cancel", "Abbrechen"));

        let text = write(&cat);
        assert!(text.contains(
            "<context>\n    <name>MythNews</name>\n    <comment>news reader screen</comment>\n    <message>\n"
        ));
        assert_eq!(ts::parse(&text).unwrap(), cat);
    }

    #[test]
    fn location_without_line() {
        let mut cat = Catalog::new("de", "en");
        let mut m = TranslationEntry::new("Minutes", "Minuten");
        m.locations.push(crate::model::entry::Location {
            filename: "themestrings.h".into(),
            line: None,
        });
        cat.context_mut("ThemeUI").messages.push(m);

        assert!(write(&cat).contains("        <location filename=\"themestrings.h\"/>\n"));
    }
}
