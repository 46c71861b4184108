use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CatalogError, Result};
use crate::model::catalog::{Catalog, Context};
use crate::model::entry::{Location, TranslationEntry, TranslationType};

/// Elements whose character data is collected.
const TEXT_ELEMENTS: &[&str] = &[
    "name",
    "comment",
    "source",
    "oldsource",
    "oldcomment",
    "extracomment",
    "translatorcomment",
    "translation",
    "numerusform",
];

/// Parses a Qt Linguist TS document.
pub fn parse(text: &str) -> Result<Catalog> {
    let mut reader = Reader::from_str(text);
    // Whitespace inside <source>/<translation> is significant.
    reader.trim_text(false);

    let mut state = TsParser::default();

    loop {
        let pos = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => state.start(&e, pos)?,
            Ok(Event::Empty(e)) => {
                state.start(&e, pos)?;
                state.end(pos)?;
            }
            Ok(Event::End(_)) => state.end(pos)?,
            Ok(Event::Text(t)) => {
                let s = t
                    .unescape()
                    .map_err(|e| CatalogError::parse(pos, e.to_string()))?;
                state.text(&s);
            }
            Ok(Event::CData(c)) => {
                let raw = c.into_inner();
                let s = std::str::from_utf8(&raw)
                    .map_err(|e| CatalogError::parse(pos, e.to_string()))?;
                state.text(s);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CatalogError::parse(
                    reader.buffer_position(),
                    e.to_string(),
                ))
            }
        }
    }

    state.finish(reader.buffer_position())
}

#[derive(Default)]
struct TsParser {
    catalog: Option<Catalog>,
    stack: Vec<String>,
    context: Option<Context>,
    context_named: bool,
    message: Option<TranslationEntry>,
    message_has_source: bool,
    text: String,
    // First <lengthvariant> of the current text element.
    variant: Option<String>,
    // An unknown child made the current text element unusable.
    discard: bool,
    // Relative `line="+3"` values resolve against the last line seen per file.
    last_file: String,
    last_line: HashMap<String, i32>,
}

impl TsParser {
    fn start(&mut self, e: &BytesStart, pos: usize) -> Result<()> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name.as_str()) {
            (None, "TS") => {
                if self.catalog.is_some() {
                    return Err(CatalogError::parse(pos, "more than one <TS> root"));
                }
                let mut catalog = Catalog::default();
                if let Some(v) = attr(e, b"version", pos)? {
                    catalog.version = v;
                }
                catalog.language = attr(e, b"language", pos)?.unwrap_or_default();
                catalog.source_language = attr(e, b"sourcelanguage", pos)?.unwrap_or_default();
                self.catalog = Some(catalog);
            }
            (None, other) => {
                return Err(CatalogError::parse(
                    pos,
                    format!("expected <TS> root element, found <{other}>"),
                ));
            }
            (Some("TS"), "context") => {
                self.context = Some(Context::default());
                self.context_named = false;
            }
            (Some("context"), "message") => {
                let mut entry = TranslationEntry {
                    id: attr(e, b"id", pos)?,
                    ..Default::default()
                };
                entry.numerus = attr(e, b"numerus", pos)?.as_deref() == Some("yes");
                self.message = Some(entry);
                self.message_has_source = false;
            }
            (Some("message"), "location") => {
                let location = self.location(e, pos)?;
                if let Some(m) = self.message.as_mut() {
                    m.locations.push(location);
                }
            }
            (Some("message"), "translation") => {
                let ty = attr(e, b"type", pos)?.unwrap_or_default();
                let ty = TranslationType::from_attribute(&ty).ok_or_else(|| {
                    CatalogError::parse(pos, format!("unknown translation type '{ty}'"))
                })?;
                if let Some(m) = self.message.as_mut() {
                    m.translation_type = ty;
                }
                self.begin_text();
            }
            (_, "byte") => {
                let value = attr(e, b"value", pos)?.unwrap_or_default();
                let ch = byte_value(&value).ok_or_else(|| {
                    CatalogError::parse(pos, format!("invalid <byte> value '{value}'"))
                })?;
                self.text.push(ch);
            }
            (_, n) if TEXT_ELEMENTS.contains(&n) => self.begin_text(),
            (Some(p), "lengthvariant") if TEXT_ELEMENTS.contains(&p) => self.text.clear(),
            (Some(p), _) if TEXT_ELEMENTS.contains(&p) => self.discard = true,
            _ => {}
        }

        self.stack.push(name);
        Ok(())
    }

    fn end(&mut self, pos: usize) -> Result<()> {
        let name = match self.stack.pop() {
            Some(n) => n,
            None => return Err(CatalogError::parse(pos, "unbalanced closing tag")),
        };
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name.as_str()) {
            (Some("context"), "name") => {
                let text = self.take_text();
                if let Some(c) = self.context.as_mut() {
                    c.name = text;
                }
                self.context_named = true;
            }
            (Some("context"), "comment") => {
                let text = self.take_text();
                if let Some(c) = self.context.as_mut() {
                    c.comment = Some(text);
                }
            }
            (Some(p), "lengthvariant") if TEXT_ELEMENTS.contains(&p) => {
                let text = std::mem::take(&mut self.text);
                if self.variant.is_none() {
                    self.variant = Some(text);
                }
            }
            (Some("message"), field) => {
                let text = self.take_text();
                if field == "source" {
                    self.message_has_source = true;
                }
                if let Some(m) = self.message.as_mut() {
                    match field {
                        "source" => m.source = text,
                        "comment" => m.comment = text,
                        "oldsource" => m.old_source = Some(text),
                        "oldcomment" => m.old_comment = Some(text),
                        "extracomment" => m.extra_comment = Some(text),
                        "translatorcomment" => m.translator_comment = Some(text),
                        "translation" if !m.numerus => m.translation = text,
                        _ => {}
                    }
                }
            }
            (Some("translation"), "numerusform") => {
                let text = self.take_text();
                if let Some(m) = self.message.as_mut() {
                    m.numerus_forms.push(text);
                }
            }
            (Some("context"), "message") => {
                let message = self.message.take();
                if !self.message_has_source {
                    return Err(CatalogError::parse(pos, "<message> without <source>"));
                }
                if let (Some(c), Some(m)) = (self.context.as_mut(), message) {
                    c.messages.push(m);
                }
            }
            (Some("TS"), "context") => {
                if !self.context_named {
                    return Err(CatalogError::parse(pos, "<context> without <name>"));
                }
                if let (Some(cat), Some(c)) = (self.catalog.as_mut(), self.context.take()) {
                    cat.contexts.push(c);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn text(&mut self, s: &str) {
        let collecting = self.stack.last().map_or(false, |top| {
            top == "lengthvariant" || TEXT_ELEMENTS.contains(&top.as_str())
        });
        if collecting {
            self.text.push_str(s);
        }
    }

    fn begin_text(&mut self) {
        self.text.clear();
        self.variant = None;
        self.discard = false;
    }

    /// Text of the element being closed: the first length variant if there
    /// were any, empty if an unknown child was inside.
    fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        let variant = self.variant.take();
        if std::mem::take(&mut self.discard) {
            return String::new();
        }
        variant.unwrap_or(text)
    }

    fn location(&mut self, e: &BytesStart, pos: usize) -> Result<Location> {
        let filename = match attr(e, b"filename", pos)? {
            Some(f) if !f.is_empty() => f,
            _ => self.last_file.clone(),
        };

        let line = match attr(e, b"line", pos)? {
            None => None,
            Some(raw) => {
                let value: i32 = raw.trim().parse().map_err(|_| {
                    CatalogError::parse(pos, format!("invalid location line '{raw}'"))
                })?;
                let relative = raw.starts_with('+') || raw.starts_with('-');
                let base = self.last_line.get(&filename).copied().unwrap_or(0);
                let line = if relative {
                    base.checked_add(value).ok_or_else(|| {
                        CatalogError::parse(pos, format!("location line '{raw}' out of range"))
                    })?
                } else {
                    value
                };
                self.last_line.insert(filename.clone(), line);
                Some(line)
            }
        };

        self.last_file = filename.clone();
        Ok(Location { filename, line })
    }

    fn finish(self, pos: usize) -> Result<Catalog> {
        if let Some(open) = self.stack.last() {
            return Err(CatalogError::parse(
                pos,
                format!("unexpected end of document inside <{open}>"),
            ));
        }
        self.catalog
            .ok_or_else(|| CatalogError::parse(pos, "missing <TS> root element"))
    }
}

fn attr(e: &BytesStart, key: &[u8], pos: usize) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(|err| CatalogError::parse(pos, err.to_string()))?;
        if a.key.as_ref() == key {
            let value = a
                .unescape_value()
                .map_err(|err| CatalogError::parse(pos, err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// `<byte value="x1b"/>` is hex, `<byte value="27"/>` decimal.
fn byte_value(value: &str) -> Option<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
