/// Languages spoken on a call, judged by script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    English,
    Hindi,
    Both,
}

/// Devanagari letters and marks used in Hindi speech transcripts
fn is_devanagari(c: char) -> bool {
    matches!(c,
        '\u{0901}'              // candrabindu
        | '\u{0902}'            // anusvara
        | '\u{0905}'..='\u{0939}' // vowels and consonants
        | '\u{093E}'..='\u{094C}' // vowel signs
        | '\u{094D}'            // virama
    )
}

/// Detect the language mix of a transcript
///
/// Any Devanagari character counts as Hindi, any ASCII letter as English.
/// A transcript with neither defaults to English.
pub fn detect_language(text: &str) -> LanguageTag {
    let has_hindi = text.chars().any(is_devanagari);
    let has_english = text.chars().any(|c| c.is_ascii_alphabetic());

    match (has_hindi, has_english) {
        (true, true) => LanguageTag::Both,
        (true, false) => LanguageTag::Hindi,
        _ => LanguageTag::English,
    }
}
