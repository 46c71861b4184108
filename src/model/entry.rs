use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TranslationEntry {
    #[serde(default)]
    pub id: Option<String>,

    pub source: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub translation_type: TranslationType,

    /// Disambiguation comment. Part of the lookup key.
    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub locations: Vec<Location>,

    #[serde(default)]
    pub old_source: Option<String>,

    #[serde(default)]
    pub old_comment: Option<String>,

    #[serde(default)]
    pub extra_comment: Option<String>,

    #[serde(default)]
    pub translator_comment: Option<String>,

    #[serde(default)]
    pub numerus: bool,

    #[serde(default)]
    pub numerus_forms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: String,

    #[serde(default)]
    pub line: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TranslationType {
    Finished,
    Unfinished,
    Obsolete,
    Vanished,
}

impl Default for TranslationType {
    fn default() -> Self {
        TranslationType::Finished
    }
}

impl TranslationType {
    /// Value of the `type` attribute, `None` for finished translations.
    pub fn attribute(self) -> Option<&'static str> {
        match self {
            TranslationType::Finished => None,
            TranslationType::Unfinished => Some("unfinished"),
            TranslationType::Obsolete => Some("obsolete"),
            TranslationType::Vanished => Some("vanished"),
        }
    }

    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "" => Some(TranslationType::Finished),
            "unfinished" => Some(TranslationType::Unfinished),
            "obsolete" => Some(TranslationType::Obsolete),
            "vanished" => Some(TranslationType::Vanished),
            _ => None,
        }
    }

    /// Obsolete and vanished messages no longer exist in the source code.
    pub fn is_retired(self) -> bool {
        matches!(self, TranslationType::Obsolete | TranslationType::Vanished)
    }
}

impl TranslationEntry {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        TranslationEntry {
            source: source.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    /// True when there is no translated text at all (every numerus form empty).
    pub fn is_untranslated(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().all(|f| f.is_empty())
        } else {
            self.translation.is_empty()
        }
    }

    /// The text a flat lookup yields: the translation, or the first numerus form.
    pub fn primary_translation(&self) -> &str {
        if self.numerus {
            self.numerus_forms.first().map(String::as_str).unwrap_or("")
        } else {
            &self.translation
        }
    }

    pub fn with_location(mut self, filename: impl Into<String>, line: i32) -> Self {
        self.locations.push(Location {
            filename: filename.into(),
            line: Some(line),
        });
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_type(mut self, translation_type: TranslationType) -> Self {
        self.translation_type = translation_type;
        self
    }

    pub fn with_numerus_forms(mut self, forms: Vec<String>) -> Self {
        self.numerus = true;
        self.numerus_forms = forms;
        self.translation.clear();
        self
    }
}
