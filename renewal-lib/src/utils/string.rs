/// Normalize text by replacing control characters with spaces and normalizing whitespace
/// Replaces newlines and control characters with spaces, collapses runs of whitespace
/// and trims both ends. Used on sheet names and column headers before alias matching.
pub fn normalize_string(value: &str) -> String {
    value
        .chars() // Process character by character
        .map(|c| {
            if c.is_control() {
                ' ' // Replace control characters (newlines, tabs, etc.) with spaces
            } else {
                c
            }
        })
        .collect::<String>()
        .split_whitespace() // Split on whitespace to normalize multiple spaces
        .collect::<Vec<&str>>()
        .join(" ") // Join back with single spaces
}

/// Lowercase with the Turkish dotted/dotless i pair folded onto a plain `i`.
///
/// `str::to_lowercase` maps `I` to `i` and `İ` to `i̇`, so `"YAPILDI"` would never
/// meet `"yapıldı"`. Folding `ı`, `İ` and the combining dot makes upper and lower case
/// spellings of Turkish words compare equal.
pub fn fold_case(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

/// Lowercase with Turkish casing rules: `I` becomes `ı` and `İ` becomes `i`.
///
/// Unlike [`fold_case`] this keeps `ı` and `i` apart, so it is fit for exact
/// matching against a closed word list.
pub fn turkish_lowercase(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'I' => 'ı',
            'İ' => 'i',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Case-insensitive substring test on top of [`fold_case`]
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(&fold_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_string_collapses_whitespace_and_controls() {
        assert_eq!(normalize_string("  Öğretmen \n  ID "), "Öğretmen ID");
        assert_eq!(normalize_string("Kayıt\tYeniledi"), "Kayıt Yeniledi");
        assert_eq!(normalize_string(""), "");
    }

    #[test]
    fn test_fold_case_turkish_i() {
        assert_eq!(fold_case("YAPILDI"), fold_case("yapıldı"));
        assert_eq!(fold_case("TAMAMLANDI"), fold_case("tamamlandı"));
        assert_eq!(fold_case("İSTANBUL"), "istanbul");
        assert_eq!(fold_case("YENİLEDİ"), "yeniledi");
        assert_eq!(fold_case("Öğretmenler"), "öğretmenler");
    }

    #[test]
    fn test_turkish_lowercase_keeps_dotless_i() {
        assert_eq!(turkish_lowercase("YAPILDI"), "yapıldı");
        assert_eq!(turkish_lowercase("YENİLEDİ"), "yeniledi");
        assert_eq!(turkish_lowercase("yapildi"), "yapildi");
        assert_eq!(turkish_lowercase("Tamamlandı"), "tamamlandı");
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("ÖĞRETMENLER", "öğretmen"));
        assert!(contains_folded("Sayfa - Öğrenciler 2024", "öğrenci"));
        assert!(!contains_folded("Sheet1", "öğrenci"));
    }
}
