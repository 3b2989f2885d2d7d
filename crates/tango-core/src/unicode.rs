//! Character-level Unicode classification for Japanese text.

pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Full Katakana block (U+30A0..U+30FF) plus the half-width forms
/// (U+FF66..U+FF9F).
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c) || ('\u{FF66}'..='\u{FF9F}').contains(&c)
}

pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

/// True when `text` contains katakana and no hiragana or kanji.
///
/// Word sources use this to skip loanword entries that have no kanji form.
/// Other characters (digits, punctuation, spaces) are ignored.
pub fn is_primarily_katakana(text: &str) -> bool {
    let mut has_katakana = false;
    for c in text.chars() {
        if is_hiragana(c) || is_kanji(c) {
            return false;
        }
        if is_katakana(c) {
            has_katakana = true;
        }
    }
    has_katakana
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_classification() {
        assert!(is_hiragana('あ'));
        assert!(!is_hiragana('ア'));
        assert!(is_katakana('ア'));
        assert!(is_katakana('ー'));
        assert!(is_katakana('ｱ'));
        assert!(!is_katakana('あ'));
        assert!(is_kanji('漢'));
        assert!(!is_kanji('あ'));
    }

    #[test]
    fn test_is_primarily_katakana() {
        assert!(is_primarily_katakana("コーヒー"));
        assert!(is_primarily_katakana("ｺｰﾋｰ"));
        assert!(is_primarily_katakana("テレビ 2"));
        assert!(!is_primarily_katakana("コーヒーを"));
        assert!(!is_primarily_katakana("ガス代"));
        assert!(!is_primarily_katakana("ねこ"));
        assert!(!is_primarily_katakana("123"));
        assert!(!is_primarily_katakana(""));
    }
}
