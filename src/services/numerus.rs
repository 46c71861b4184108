/// Plural selection rules, keyed by the target language of a catalog.
///
/// The form order matches what Qt Linguist presents to translators, so
/// `form_index` indexes straight into `TranslationEntry::numerus_forms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumerusRule {
    /// One form for every count (ja, zh, ko, ...).
    Single,
    /// `n == 1` singular, everything else plural (en, de, ...).
    OneOther,
    /// `n <= 1` singular (fr, pt_BR).
    French,
    /// one / few / many (ru, uk, be, sr, hr, bs).
    EastSlavic,
    /// one / few / many (pl).
    Polish,
    /// one / few / other (cs, sk).
    CzechSlovak,
    /// zero / one / two / few / many / other (ar).
    Arabic,
}

impl NumerusRule {
    /// `language` may be a bare code or a full locale (`pt_BR`, `de-DE`).
    pub fn for_language(language: &str) -> Self {
        let normalized = language.replace('-', "_");
        let mut parts = normalized.split('_');
        let lang = parts.next().unwrap_or("").to_ascii_lowercase();
        let territory = parts.next().unwrap_or("").to_ascii_uppercase();

        match lang.as_str() {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "tr" | "lo" | "my" => {
                NumerusRule::Single
            }
            "fr" | "oc" | "ln" | "mg" => NumerusRule::French,
            "pt" if territory == "BR" => NumerusRule::French,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => NumerusRule::EastSlavic,
            "pl" => NumerusRule::Polish,
            "cs" | "sk" => NumerusRule::CzechSlovak,
            "ar" => NumerusRule::Arabic,
            _ => NumerusRule::OneOther,
        }
    }

    pub fn form_count(self) -> usize {
        match self {
            NumerusRule::Single => 1,
            NumerusRule::OneOther | NumerusRule::French => 2,
            NumerusRule::EastSlavic | NumerusRule::Polish | NumerusRule::CzechSlovak => 3,
            NumerusRule::Arabic => 6,
        }
    }

    pub fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;

        match self {
            NumerusRule::Single => 0,
            NumerusRule::OneOther => usize::from(n != 1),
            NumerusRule::French => usize::from(n > 1),
            NumerusRule::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            NumerusRule::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            NumerusRule::CzechSlovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            NumerusRule::Arabic => match (n, n100) {
                (0, _) => 0,
                (1, _) => 1,
                (2, _) => 2,
                (_, 3..=10) => 3,
                (_, 11..=99) => 4,
                _ => 5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn german_and_english_use_one_other() {
        let rule = NumerusRule::for_language("de_DE");
        assert_eq!(rule, NumerusRule::OneOther);
        assert_eq!(rule.form_count(), 2);
        assert_eq!(rule.form_index(1), 0);
        assert_eq!(rule.form_index(0), 1);
        assert_eq!(rule.form_index(5), 1);
        assert_eq!(NumerusRule::for_language("en"), NumerusRule::OneOther);
    }

    #[test]
    fn french_treats_zero_as_singular() {
        let rule = NumerusRule::for_language("fr");
        assert_eq!(rule.form_index(0), 0);
        assert_eq!(rule.form_index(1), 0);
        assert_eq!(rule.form_index(2), 1);
        assert_eq!(NumerusRule::for_language("pt-BR"), NumerusRule::French);
        assert_eq!(NumerusRule::for_language("pt_PT"), NumerusRule::OneOther);
    }

    #[test]
    fn russian_forms() {
        let rule = NumerusRule::for_language("ru_RU");
        let picks: Vec<usize> = [1, 2, 5, 11, 12, 21, 22, 25, 111]
            .iter()
            .map(|&n| rule.form_index(n))
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 2, 2, 0, 1, 2, 2]);
    }

    #[test]
    fn polish_and_czech_differ_at_twenty_two() {
        assert_eq!(NumerusRule::Polish.form_index(22), 1);
        assert_eq!(NumerusRule::Polish.form_index(21), 2);
        assert_eq!(NumerusRule::CzechSlovak.form_index(22), 2);
        assert_eq!(NumerusRule::CzechSlovak.form_index(3), 1);
    }

    #[test]
    fn arabic_has_six_forms() {
        let rule = NumerusRule::for_language("ar");
        assert_eq!(rule.form_count(), 6);
        let picks: Vec<usize> = [0, 1, 2, 3, 11, 100, 102, 103]
            .iter()
            .map(|&n| rule.form_index(n))
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 3, 4, 5, 5, 3]);
    }

    #[test]
    fn single_form_and_negative_counts() {
        assert_eq!(NumerusRule::for_language("ja").form_index(42), 0);
        assert_eq!(NumerusRule::OneOther.form_index(-1), 0);
    }
}
