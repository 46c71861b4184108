use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::Regex;
use serde::Serialize;

use crate::error::{CatalogError, Result};

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

/// Decodes a TS file into UTF-8 text.
///
/// Order: byte order mark, then the `encoding` of the XML declaration,
/// then statistical detection. Malformed input for the chosen encoding is an error.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let (encoding, skip) = if let Some(bom) = bom_encoding(bytes) {
        bom
    } else if let Some(declared) = declared_encoding(bytes) {
        (declared, 0)
    } else {
        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        (detector.guess(None, true), 0)
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[skip..]);
    if had_errors {
        return Err(CatalogError::Encoding(format!(
            "input is not valid {}",
            encoding.name()
        )));
    }

    Ok(text.into_owned())
}

pub fn decode_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| CatalogError::io(path, e))?;
    decode(&bytes)
}

fn bom_encoding(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((UTF_8, 3))
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Some((UTF_16LE, 2))
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Some((UTF_16BE, 2))
    } else {
        None
    }
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).expect("static regex")
    })
}

/// Reads `encoding="..."` from an ASCII-compatible XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    if !head.starts_with("<?xml") {
        return None;
    }

    let decl_end = head.find("?>")?;
    let label = declaration_regex().captures(&head[..decl_end])?.get(1)?.as_str();

    Encoding::for_label(label.as_bytes())
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult> {
    let bytes = fs::read(path).map_err(|e| CatalogError::io(path, e))?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    // BOM UTF-8 (EF BB BF)
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    // chardetng never guesses UTF-16, so the BOM is the only signal.
    if let Some((encoding, _)) = bom_encoding(bytes) {
        let best = encoding.name().to_lowercase();
        return EncodingDetectionResult {
            candidates: vec![EncodingCandidate {
                name: best.clone(),
                confidence: 0.99,
            }],
            best,
            confidence: 0.99,
        };
    }

    if let Some(declared) = declared_encoding(bytes) {
        let (_, had_errors) = declared.decode_without_bom_handling(bytes);
        if !had_errors {
            let best = declared.name().to_lowercase();
            return EncodingDetectionResult {
                candidates: vec![EncodingCandidate {
                    name: best.clone(),
                    confidence: 0.95,
                }],
                best,
                confidence: 0.95,
            };
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let encoding = detector.guess(None, true);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // Latin-1 style catalogs are easily confused with each other.
    if best == "windows-1252" {
        candidates.push(EncodingCandidate {
            name: "iso-8859-15".into(),
            confidence: (confidence - 0.05).max(0.0),
        });
    }

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
