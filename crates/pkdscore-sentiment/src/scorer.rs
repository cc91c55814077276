//! Polish lexicon scorer for post emotion.
//!
//! Each lexicon entry is a word stem; a word matches the first stem it
//! starts with, which covers most inflected forms. A stem directly after
//! `nie` has its weight negated.

/// Emotion assigned to text with no lexicon hits.
pub const NEUTRAL_EMOTION: f64 = 50.0;

/// Stem weights. Values in `(0.0, 1.0]` are positive, in `[-1.0, 0.0)` are
/// negative. Longer stems come before the shorter stems they extend.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("najlepsz", 0.5),
    ("świetn", 0.5),
    ("genialn", 0.5),
    ("doskonał", 0.5),
    ("wspaniał", 0.5),
    ("rewelac", 0.5),
    ("kocha", 0.5),
    ("polecam", 0.4),
    ("super", 0.4),
    ("brawo", 0.4),
    ("sukces", 0.4),
    ("zadowol", 0.4),
    ("zysk", 0.4),
    ("dobr", 0.3),
    ("fajn", 0.3),
    ("wzrost", 0.3),
    ("rośnie", 0.3),
    ("bezpieczn", 0.3),
    ("stabiln", 0.3),
    ("opłaca", 0.3),
    ("innowac", 0.3),
    ("nowoczesn", 0.3),
    ("dziękuj", 0.3),
    ("lubi", 0.3),
    ("szans", 0.2),
    ("korzystn", 0.2),
    // Negative signals
    ("najgorsz", -0.6),
    ("beznadziej", -0.6),
    ("fataln", -0.6),
    ("okropn", -0.6),
    ("tragiczn", -0.6),
    ("tragedi", -0.6),
    ("katastrof", -0.6),
    ("bankruct", -0.6),
    ("oszust", -0.6),
    ("oszuk", -0.6),
    ("złodziej", -0.6),
    ("nienawidz", -0.6),
    ("kryzys", -0.5),
    ("upad", -0.5),
    ("skandal", -0.5),
    ("porażk", -0.5),
    ("rozczarow", -0.5),
    ("żenad", -0.5),
    ("żenując", -0.5),
    ("bubel", -0.5),
    ("kradz", -0.5),
    ("strac", -0.4),
    ("gorsz", -0.4),
    ("kiepsk", -0.4),
    ("głupi", -0.4),
    ("wstyd", -0.4),
    ("zawiod", -0.4),
    ("awari", -0.4),
    ("afer", -0.4),
    ("bezroboc", -0.4),
    ("problem", -0.3),
    ("niestety", -0.3),
    ("słab", -0.3),
    ("spad", -0.3),
    ("droże", -0.3),
    ("inflac", -0.3),
    ("opóźni", -0.3),
    ("zwolnie", -0.3),
];

const NEGATION: &str = "nie";

fn stem_weight(word: &str) -> Option<f32> {
    LEXICON
        .iter()
        .find(|(stem, _)| word.starts_with(stem))
        .map(|&(_, weight)| weight)
}

/// Score text using the lexicon.
///
/// Splits text into lowercase words, sums matching stem weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    let mut negated = false;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if w == NEGATION {
            negated = true;
            continue;
        }
        if let Some(weight) = stem_weight(&w) {
            score += if negated { -weight } else { weight };
        }
        negated = false;
    }
    score.clamp(-1.0, 1.0)
}

/// Emotion of a post on a `0..=100` scale, 50 being neutral, rounded to two
/// decimal places.
#[must_use]
pub fn emotion_score(text: &str) -> f64 {
    let raw = f64::from(lexicon_score(text));
    let scaled = NEUTRAL_EMOTION + NEUTRAL_EMOTION * raw;
    (scaled * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
        assert_eq!(emotion_score(""), NEUTRAL_EMOTION);
    }

    #[test]
    fn unknown_words_are_neutral() {
        assert_eq!(emotion_score("pociąg odjechał o ósmej"), NEUTRAL_EMOTION);
    }

    #[test]
    fn inflected_forms_match_their_stem() {
        assert!(lexicon_score("Świetna inwestycja") > 0.0);
        assert!(lexicon_score("świetnie sobie radzą") > 0.0);
        assert!(lexicon_score("kolejny kryzysu objaw") < 0.0);
    }

    #[test]
    fn punctuation_is_ignored() {
        assert!((lexicon_score("super!!!") - 0.4).abs() < 1e-6);
    }

    #[test]
    fn negation_flips_the_following_word() {
        assert!((lexicon_score("nie polecam") + 0.4).abs() < 1e-6);
        assert!((lexicon_score("nie jest dobrze") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn score_is_clamped() {
        let text = "świetny genialny doskonały wspaniały rewelacyjny";
        assert_eq!(lexicon_score(text), 1.0);
        assert_eq!(emotion_score(text), 100.0);

        let text = "fatalny okropny tragiczny katastrofa bankructwo";
        assert_eq!(lexicon_score(text), -1.0);
        assert_eq!(emotion_score(text), 0.0);
    }

    #[test]
    fn emotion_maps_linearly_around_neutral() {
        assert!((emotion_score("super") - 70.0).abs() < 1e-9);
        assert!((emotion_score("problem") - 35.0).abs() < 1e-9);
    }

    #[test]
    fn longer_stems_precede_their_prefixes() {
        for (i, (stem, _)) in LEXICON.iter().enumerate() {
            for (other, _) in &LEXICON[i + 1..] {
                assert!(
                    !other.starts_with(stem) || other == stem,
                    "{other} is shadowed by {stem}"
                );
            }
        }
    }
}
