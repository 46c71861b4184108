use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::config::CatalogConfig;
use crate::model::catalog::Catalog;
use crate::parsers::ts;
use crate::services::translator::Translator;
use crate::services::{encoding, fingerprint, merge, qa, stats, store, writer};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload<'a>(req: &'a Value) -> &'a Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// `payload.<key>` holds either TS text or a catalog object.
fn catalog_arg(payload: &Value, key: &str) -> Result<Catalog, String> {
    match payload.get(key) {
        Some(Value::String(text)) => ts::parse(text).map_err(|e| e.to_string()),
        Some(v) if v.is_object() => serde_json::from_value::<Catalog>(v.clone())
            .map_err(|e| format!("invalid payload.{key}: {e}")),
        _ => Err(format!("payload.{key} is required")),
    }
}

/// `payload.path` (a TS file) or `payload.catalog`.
fn catalog_from_payload(payload: &Value) -> Result<Catalog, String> {
    let path = get_str(payload, "path");
    if !path.is_empty() {
        return store::load_catalog(Path::new(path)).map_err(|e| e.to_string());
    }
    catalog_arg(payload, "catalog")
}

fn config_from_payload(payload: &Value) -> Result<CatalogConfig, String> {
    let config_path = get_str(payload, "config_path");
    if !config_path.is_empty() {
        return CatalogConfig::load(Path::new(config_path)).map_err(|e| e.to_string());
    }

    match payload.get("config") {
        Some(v) if v.is_object() => serde_json::from_value::<CatalogConfig>(v.clone())
            .map_err(|e| format!("invalid payload.config: {e}")),
        _ => Err("payload.config or payload.config_path is required".to_string()),
    }
}

/// One client connection. Holds the translator of the last `catalog.load`;
/// loading again (e.g. on a locale switch) replaces it wholesale.
#[derive(Default)]
pub struct Session {
    translator: Option<Translator>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translator(&self) -> Option<&Translator> {
        self.translator.as_ref()
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let payload = get_payload(&req);

        match Command::from(get_cmd(&req)) {
            Command::Ping => ok(id, json!({ "message": "linguist-core alive" })),

            Command::ParseTs => {
                let text = get_str(payload, "text");
                match ts::parse(text) {
                    Ok(catalog) => ok(id, json!({ "catalog": catalog })),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::WriteTs => {
                let catalog = match catalog_arg(payload, "catalog") {
                    Ok(c) => c,
                    Err(e) => return err(id, e),
                };
                let path = get_str(payload, "path");
                if path.is_empty() {
                    return ok(id, json!({ "text": writer::write(&catalog) }));
                }
                match store::save_catalog(Path::new(path), &catalog) {
                    Ok(()) => ok(id, json!({ "path": path })),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::RunQa => match catalog_from_payload(payload) {
                Ok(catalog) => ok(id, json!({ "issues": qa::run(&catalog) })),
                Err(e) => err(id, e),
            },

            Command::Stats => match catalog_from_payload(payload) {
                Ok(catalog) => {
                    let s = stats::compute(&catalog);
                    ok(id, json!({ "summary": s.summary(), "stats": s }))
                }
                Err(e) => err(id, e),
            },

            Command::Fingerprint => match catalog_from_payload(payload) {
                Ok(catalog) => ok(id, json!({ "fingerprint": fingerprint::of(&catalog) })),
                Err(e) => err(id, e),
            },

            Command::Merge => {
                let existing = match catalog_arg(payload, "existing") {
                    Ok(c) => c,
                    Err(e) => return err(id, e),
                };
                let fresh = match catalog_arg(payload, "fresh") {
                    Ok(c) => c,
                    Err(e) => return err(id, e),
                };
                let (catalog, report) = merge::merge(&existing, &fresh);
                ok(id, json!({ "catalog": catalog, "report": report }))
            }

            Command::DetectEncoding => {
                let path_str = get_str(payload, "path");
                if path_str.is_empty() {
                    return err(id, "payload.path is required");
                }
                match encoding::detect_from_file(Path::new(path_str)) {
                    Ok(result) => ok(id, serde_json::to_value(result).unwrap_or(json!({}))),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::CatalogLocales => {
                let dir = get_str(payload, "i18n_dir");
                let domain = get_str(payload, "domain");
                if dir.is_empty() { return err(id, "payload.i18n_dir is required"); }
                if domain.is_empty() { return err(id, "payload.domain is required"); }

                match store::available_locales(Path::new(dir), domain) {
                    Ok(locales) => ok(id, json!({ "locales": locales })),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::CatalogLoad => {
                let config = match config_from_payload(payload) {
                    Ok(c) => c,
                    Err(e) => return err(id, e),
                };
                match store::load_translator(&config) {
                    Ok(translator) => {
                        let reply = json!({
                            "language": translator.language(),
                            "messages": translator.len(),
                            "plural_forms": translator.rule().form_count()
                        });
                        info!(language = translator.language(), "session translator replaced");
                        self.translator = Some(translator);
                        ok(id, reply)
                    }
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::CatalogTranslate => {
                let Some(translator) = self.translator.as_ref() else {
                    return err(id, "no catalog loaded");
                };

                let context = get_str(payload, "context");
                let source = get_str(payload, "source");
                let disambiguation = payload.get("disambiguation").and_then(|v| v.as_str());

                let translation = match payload.get("n").and_then(|v| v.as_i64()) {
                    Some(n) => translator.translate_plural(context, source, disambiguation, n),
                    None => translator.translate(context, source, disambiguation).to_string(),
                };
                ok(
                    id,
                    json!({
                        "translation": translation,
                        "found": translator.contains(context, source, disambiguation)
                    }),
                )
            }

            Command::Unknown => err(id, "unknown command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MYTHNEWS_DE: &str = include_str!("../../testdata/mythnews_de.ts");

    fn call(session: &mut Session, req: Value) -> Value {
        serde_json::from_str(&session.handle(&req.to_string())).unwrap()
    }

    #[test]
    fn ping_and_unknown() {
        let mut s = Session::new();
        let resp = call(&mut s, json!({ "id": 1, "cmd": "ping" }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["id"], 1);

        let resp = call(&mut s, json!({ "id": 2, "cmd": "frobnicate" }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "unknown command");

        let raw: Value = serde_json::from_str(&s.handle("{oops")).unwrap();
        assert_eq!(raw["message"], "invalid json");
    }

    #[test]
    fn parse_then_write_round_trips() {
        let mut s = Session::new();
        let parsed = call(
            &mut s,
            json!({ "id": 1, "cmd": "ts.parse", "payload": { "text": MYTHNEWS_DE } }),
        );
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["payload"]["catalog"]["language"], "de_DE");

        let written = call(
            &mut s,
            json!({ "id": 2, "cmd": "ts.write", "payload": { "catalog": parsed["payload"]["catalog"] } }),
        );
        assert_eq!(written["payload"]["text"], MYTHNEWS_DE);
    }

    #[test]
    fn parse_error_is_reported() {
        let mut s = Session::new();
        let resp = call(
            &mut s,
            json!({ "id": 1, "cmd": "ts.parse", "payload": { "text": "<TS><context>" } }),
        );
        assert_eq!(resp["status"], "error");
        assert!(resp["message"].as_str().unwrap().starts_with("parse error"));
    }

    #[test]
    fn qa_stats_and_fingerprint_accept_ts_text() {
        let mut s = Session::new();
        let payload = json!({ "catalog": MYTHNEWS_DE });

        let qa = call(&mut s, json!({ "id": 1, "cmd": "run_qa", "payload": payload }));
        assert_eq!(qa["payload"]["issues"], json!([]));

        let st = call(&mut s, json!({ "id": 2, "cmd": "stats", "payload": payload }));
        assert_eq!(st["payload"]["stats"]["total"]["finished"], 26);

        let fp = call(&mut s, json!({ "id": 3, "cmd": "fingerprint", "payload": payload }));
        assert_eq!(fp["payload"]["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn merge_reports_counts() {
        let mut s = Session::new();
        let fresh = r#"<TS version="2.1" sourcelanguage="en_US"><context><name>ThemeUI</name><message><source>Minutes</source><translation type="unfinished"></translation></message><message><source>Hours</source><translation type="unfinished"></translation></message></context></TS>"#;

        let resp = call(
            &mut s,
            json!({ "id": 1, "cmd": "merge", "payload": { "existing": MYTHNEWS_DE, "fresh": fresh } }),
        );
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["report"]["same"], 1);
        assert_eq!(resp["payload"]["report"]["new"], 1);
        assert_eq!(resp["payload"]["report"]["vanished"], 25);
    }

    #[test]
    fn translate_requires_loaded_catalog() {
        let mut s = Session::new();
        let resp = call(
            &mut s,
            json!({ "id": 1, "cmd": "catalog.translate", "payload": { "context": "MythNews", "source": "Cancel" } }),
        );
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "no catalog loaded");
    }

    #[test]
    fn load_then_translate_and_switch_locale() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mythnews_de.ts"), MYTHNEWS_DE).unwrap();
        std::fs::write(
            dir.path().join("mythnews_fr.ts"),
            r#"<TS version="2.1" language="fr"><context><name>MythNews</name><message><source>Cancel</source><translation>Annuler</translation></message></context></TS>"#,
        )
        .unwrap();
        let i18n_dir = dir.path().to_string_lossy().to_string();

        let mut s = Session::new();
        let locales = call(
            &mut s,
            json!({ "id": 0, "cmd": "catalog.locales", "payload": { "i18n_dir": i18n_dir, "domain": "mythnews" } }),
        );
        assert_eq!(locales["payload"]["locales"], json!(["de", "fr"]));

        let loaded = call(
            &mut s,
            json!({ "id": 1, "cmd": "catalog.load", "payload": { "config": { "i18n_dir": i18n_dir, "domain": "mythnews", "locale": "de_DE" } } }),
        );
        assert_eq!(loaded["status"], "ok");
        assert_eq!(loaded["payload"]["messages"], 26);

        let tr = |s: &mut Session, source: &str| {
            call(
                s,
                json!({ "id": 2, "cmd": "tr", "payload": { "context": "MythNews", "source": source } }),
            )["payload"]["translation"]
                .clone()
        };
        assert_eq!(tr(&mut s, "Cancel"), "Abbrechen");
        assert_eq!(tr(&mut s, "NotPresentString"), "NotPresentString");
        assert_eq!(loaded["payload"]["plural_forms"], 2);

        let missing = call(
            &mut s,
            json!({ "id": 2, "cmd": "tr", "payload": { "context": "MythNews", "source": "NotPresentString" } }),
        );
        assert_eq!(missing["payload"]["found"], false);

        call(
            &mut s,
            json!({ "id": 3, "cmd": "catalog.load", "payload": { "config": { "i18n_dir": i18n_dir, "domain": "mythnews", "locale": "fr_FR" } } }),
        );
        assert_eq!(tr(&mut s, "Cancel"), "Annuler");
        assert_eq!(s.translator().unwrap().language(), "fr_FR");
    }

    #[test]
    fn failed_load_keeps_previous_translator() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mythnews_de.ts"), MYTHNEWS_DE).unwrap();
        let i18n_dir = dir.path().to_string_lossy().to_string();

        let mut s = Session::new();
        call(
            &mut s,
            json!({ "id": 1, "cmd": "catalog.load", "payload": { "config": { "i18n_dir": i18n_dir, "domain": "mythnews", "locale": "de" } } }),
        );
        let resp = call(
            &mut s,
            json!({ "id": 2, "cmd": "catalog.load", "payload": { "config": { "i18n_dir": i18n_dir, "domain": "mythnews", "locale": "ja" } } }),
        );
        assert_eq!(resp["status"], "error");
        assert_eq!(s.translator().unwrap().language(), "de");
    }

    #[test]
    fn empty_source_translates_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mythnews_de.ts"), MYTHNEWS_DE).unwrap();

        let mut s = Session::new();
        call(
            &mut s,
            json!({ "id": 1, "cmd": "catalog.load", "payload": { "config": { "i18n_dir": dir.path().to_string_lossy(), "domain": "mythnews", "locale": "de" } } }),
        );
        let resp = call(
            &mut s,
            json!({ "id": 2, "cmd": "tr", "payload": { "context": "MythNews", "source": "" } }),
        );
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["translation"], "");
        assert_eq!(resp["payload"]["found"], false);
    }

    #[test]
    fn plural_lookup_through_protocol() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mythtv_de.ts"),
            r#"<TS version="2.1" language="de"><context><name>ChannelImporter</name><message numerus="yes"><source>Found %n channel(s)</source><translation><numerusform>%n Kanal gefunden</numerusform><numerusform>%n Kanäle gefunden</numerusform></translation></message></context></TS>"#,
        )
        .unwrap();

        let mut s = Session::new();
        call(
            &mut s,
            json!({ "id": 1, "cmd": "catalog.load", "payload": { "config": { "i18n_dir": dir.path().to_string_lossy(), "domain": "mythtv", "locale": "de" } } }),
        );
        let resp = call(
            &mut s,
            json!({ "id": 2, "cmd": "catalog.translate", "payload": { "context": "ChannelImporter", "source": "Found %n channel(s)", "n": 3 } }),
        );
        assert_eq!(resp["payload"]["translation"], "3 Kanäle gefunden");
    }
}
