use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::model::catalog::Catalog;
use crate::model::locale::Locale;
use crate::parsers::ts;
use crate::services::translator::Translator;
use crate::services::{encoding, writer};

/// `<dir>/<domain>_<locale>.ts`
pub fn catalog_path(dir: &Path, domain: &str, locale: &str) -> PathBuf {
    dir.join(format!("{domain}_{locale}.ts"))
}

/// Locales for which `<domain>_<locale>.ts` exists in `dir`, sorted.
pub fn available_locales(dir: &Path, domain: &str) -> Result<Vec<String>> {
    let prefix = format!("{domain}_");
    let mut locales = Vec::new();

    let entries = fs::read_dir(dir).map_err(|e| CatalogError::io(dir, e))?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(code) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".ts"))
        else {
            continue;
        };

        match Locale::parse(code) {
            Ok(locale) => locales.push(locale.to_string()),
            Err(_) => warn!(file = name, "skipping catalog with unrecognised locale"),
        }
    }

    locales.sort();
    locales.dedup();
    Ok(locales)
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let text = encoding::decode_file(path)?;
    ts::parse(&text)
}

/// Loads every catalog on the locale fallback chain into one translator.
/// The most specific locale is added first and wins on conflicts.
pub fn load_translator(config: &CatalogConfig) -> Result<Translator> {
    config.validate()?;
    let locale = config.resolved_locale()?;
    let dir = Path::new(&config.i18n_dir);
    let options = config.load_options();

    let chain = locale.fallback_chain();
    let mut translator = Translator::new(locale.to_string());
    let mut loaded = 0usize;

    for code in &chain {
        let path = catalog_path(dir, &config.domain, code);
        if !path.exists() {
            continue;
        }

        let catalog = load_catalog(&path)?;
        if config.strict {
            catalog.validate()?;
        }

        let added = translator.add_catalog(&catalog, &options);
        info!(path = %path.display(), locale = %code, added, "loaded catalog");
        loaded += 1;
    }

    if loaded == 0 {
        return Err(CatalogError::NotFound {
            domain: config.domain.clone(),
            locales: chain.join(", "),
        });
    }

    Ok(translator)
}

pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    write_atomic(path, writer::write(catalog).as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }

    fs::write(&tmp, bytes).map_err(|e| CatalogError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| CatalogError::io(path, e))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "catalog.ts".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
