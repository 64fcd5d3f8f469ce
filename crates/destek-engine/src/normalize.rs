//! Turkish text normalization.
//!
//! Every resolution stage compares text in one canonical form: trimmed,
//! lowercased, with Turkish dotted/accented letters folded to their ASCII
//! base and internal whitespace runs collapsed to single spaces.

/// Fold one character through the fixed Turkish substitution table.
///
/// Dotted capital `İ` and dotless `ı` both map to plain `i`; everything else
/// in the table loses its diacritic. Characters outside the table pass
/// through untouched (case is handled afterwards).
fn fold_char(c: char) -> char {
    match c {
        'İ' | 'I' | 'ı' => 'i',
        'Ş' | 'ş' => 's',
        'Ğ' | 'ğ' => 'g',
        'Ü' | 'ü' => 'u',
        'Ö' | 'ö' => 'o',
        'Ç' | 'ç' => 'c',
        _ => c,
    }
}

/// Normalize `text` into its canonical comparable form.
///
/// Pure and idempotent: normalizing an already-normalized string is a
/// no-op, and the function never fails — empty or whitespace-only input
/// yields the empty string.
pub fn normalize(text: &str) -> String {
    let folded: String = text.chars().map(fold_char).collect();
    let lowered = folded.to_lowercase();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_turkish_letters() {
        assert_eq!(normalize("İşçi"), "isci");
        assert_eq!(normalize("ŞİFRE"), "sifre");
        assert_eq!(normalize("Ağ bağlantısı"), "ag baglantisi");
        assert_eq!(normalize("GÜNAYDIN"), "gunaydin");
        assert_eq!(normalize("Çözüm Önerisi"), "cozum onerisi");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize("  vpn \t bağlanmıyor \n"), "vpn baglanmiyor");
        assert_eq!(normalize("a   b    c"), "a b c");
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n "), "");
    }

    #[test]
    fn idempotent() {
        for s in ["İşçi", "  Çok   HIZLI  ", "already normal", "", "  "] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn leaves_ascii_and_digits_alone() {
        assert_eq!(normalize("SAP GUI 7.50"), "sap gui 7.50");
    }
}
