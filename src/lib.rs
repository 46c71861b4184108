//! Loading, lookup and maintenance of Qt Linguist `.ts` translation catalogs.

pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use model::catalog::{Catalog, Context};
pub use model::entry::{Location, TranslationEntry, TranslationType};
pub use services::translator::{LoadOptions, Translator};
