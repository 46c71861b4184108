use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::locale::Locale;
use crate::services::translator::LoadOptions;

fn default_i18n_dir() -> String {
    "i18n".to_string()
}

fn default_true() -> bool {
    true
}

/// Which catalogs to load and how. Usually stored as `catalog.json` next to the catalogs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    #[serde(default = "default_i18n_dir")]
    pub i18n_dir: String,

    /// File name prefix: `<domain>_<locale>.ts`.
    #[serde(default)]
    pub domain: String,

    /// Empty means: take it from the environment (`LC_ALL`, `LC_MESSAGES`, `LANG`).
    #[serde(default, alias = "language")]
    pub locale: String,

    #[serde(default = "default_true")]
    pub include_unfinished: bool,

    /// Reject catalogs with duplicate keys instead of keeping the first one.
    #[serde(default)]
    pub strict: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            i18n_dir: default_i18n_dir(),
            domain: String::new(),
            locale: String::new(),
            include_unfinished: true,
            strict: false,
        }
    }
}

impl CatalogConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let config: CatalogConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(CatalogError::Config("domain is required".into()));
        }
        if self.domain.contains(['/', '\\']) {
            return Err(CatalogError::Config(format!(
                "domain must be a file name prefix, got '{}'",
                self.domain
            )));
        }
        if !self.locale.is_empty() {
            Locale::parse(&self.locale)?;
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            include_unfinished: self.include_unfinished,
        }
    }

    pub fn resolved_locale(&self) -> Result<Locale> {
        self.resolved_locale_with(|key| std::env::var(key).ok())
    }

    /// `C` and `POSIX` are skipped, like an unset variable.
    pub fn resolved_locale_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<Locale> {
        if !self.locale.is_empty() {
            return Locale::parse(&self.locale);
        }

        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| env(key))
            .find(|v| !v.is_empty() && v != "C" && v != "POSIX")
            .map(|v| Locale::parse(&v))
            .unwrap_or_else(|| Err(CatalogError::Config("no locale configured".into())))
    }
}
