#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ParseTs,
    WriteTs,
    RunQa,
    Stats,
    Fingerprint,
    Merge,
    DetectEncoding,
    CatalogLocales,
    CatalogLoad,
    CatalogTranslate,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "ts.parse" => Command::ParseTs,
            "ts.write" => Command::WriteTs,
            "run_qa" => Command::RunQa,
            "stats" => Command::Stats,
            "fingerprint" => Command::Fingerprint,
            "merge" => Command::Merge,
            "encoding.detect" | "detect_encoding" => Command::DetectEncoding,
            "catalog.locales" => Command::CatalogLocales,
            "catalog.load" => Command::CatalogLoad,
            "catalog.translate" | "tr" => Command::CatalogTranslate,
            _ => Command::Unknown,
        }
    }
}
