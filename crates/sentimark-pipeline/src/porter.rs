//! Porter stemmer
//!
//! The Porter (1980) algorithm with the NLTK extensions the training
//! process stems with: a table of irregular forms, no stemming of words of
//! two characters or fewer, `-ies`/`-ied` handling for four-letter words,
//! and the extra step 2 rules for `-alli`, `-fulli` and `-logi`.
//!
//! Input is expected to be lowercase already.
//!
//! ```
//! use sentimark_pipeline::porter::stem;
//!
//! assert_eq!(stem("running"), "run");
//! assert_eq!(stem("generous"), "gener");
//! assert_eq!(stem("communication"), "commun");
//! ```

/// Irregular forms stemmed by lookup
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("sky", "sky"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

/// Stem one lowercase word
pub fn stem(word: &str) -> String {
    if let Some((_, stemmed)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
        return (*stemmed).to_string();
    }

    let mut w: Vec<char> = word.chars().collect();
    if w.len() <= 2 {
        return word.to_string();
    }

    w = step1a(w);
    w = step1b(w);
    w = step1c(w);
    w = step2(w);
    w = step3(w);
    w = step4(w);
    w = step5a(w);
    w = step5b(w);

    w.into_iter().collect()
}

type Word = Vec<char>;

/// Condition evaluated on the word with the suffix removed
#[derive(Debug, Clone, Copy)]
enum Cond {
    Always,
    MeasureAbove(usize),
    MeasureIs(usize),
    /// Step 4 `-ion`: m > 1 and the stem ends in `s` or `t`
    IonStem,
}

impl Cond {
    fn holds(self, stem: &[char]) -> bool {
        match self {
            Cond::Always => true,
            Cond::MeasureAbove(n) => measure(stem) > n,
            Cond::MeasureIs(n) => measure(stem) == n,
            Cond::IonStem => measure(stem) > 1 && matches!(stem.last(), Some('s') | Some('t')),
        }
    }
}

fn is_consonant(w: &[char], i: usize) -> bool {
    match w[i] {
        'a' | 'e' | 'i' | 'o' | 'u' => false,
        'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences, `m` in `[C](VC)^m[V]`
fn measure(w: &[char]) -> usize {
    let mut m = 0;
    let mut previous_vowel = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && previous_vowel {
            m += 1;
        }
        previous_vowel = !consonant;
    }
    m
}

fn contains_vowel(w: &[char]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[char]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// Ends consonant-vowel-consonant with a final letter other than w, x, y;
/// a two-letter vowel-consonant word also qualifies
fn ends_cvc(w: &[char]) -> bool {
    let n = w.len();
    if n >= 3 {
        is_consonant(w, n - 3)
            && !is_consonant(w, n - 2)
            && is_consonant(w, n - 1)
            && !matches!(w[n - 1], 'w' | 'x' | 'y')
    } else {
        n == 2 && !is_consonant(w, 0) && is_consonant(w, 1)
    }
}

fn ends_with(w: &[char], suffix: &str) -> bool {
    let n = suffix.chars().count();
    w.len() >= n && w[w.len() - n..].iter().copied().eq(suffix.chars())
}

fn strip(w: &[char], suffix: &str) -> Word {
    w[..w.len() - suffix.chars().count()].to_vec()
}

fn with_suffix(mut stem: Word, replacement: &str) -> Word {
    stem.extend(replacement.chars());
    stem
}

/// Apply the first rule whose suffix matches. A matching rule whose
/// condition fails leaves the word unchanged.
fn apply_rules(w: Word, rules: &[(&str, &str, Cond)]) -> Word {
    for &(suffix, replacement, cond) in rules {
        if ends_with(&w, suffix) {
            let stem = strip(&w, suffix);
            return if cond.holds(&stem) {
                with_suffix(stem, replacement)
            } else {
                w
            };
        }
    }
    w
}

fn step1a(w: Word) -> Word {
    if w.len() == 4 && ends_with(&w, "ies") {
        return with_suffix(strip(&w, "ies"), "ie");
    }
    apply_rules(
        w,
        &[
            ("sses", "ss", Cond::Always),
            ("ies", "i", Cond::Always),
            ("ss", "ss", Cond::Always),
            ("s", "", Cond::Always),
        ],
    )
}

fn step1b(w: Word) -> Word {
    if ends_with(&w, "ied") {
        let replacement = if w.len() == 4 { "ie" } else { "i" };
        return with_suffix(strip(&w, "ied"), replacement);
    }

    if ends_with(&w, "eed") {
        let stem = strip(&w, "eed");
        return if measure(&stem) > 0 {
            with_suffix(stem, "ee")
        } else {
            w
        };
    }

    let stem = match ["ed", "ing"]
        .iter()
        .find(|suffix| ends_with(&w, suffix) && contains_vowel(&strip(&w, suffix)))
    {
        Some(suffix) => strip(&w, suffix),
        None => return w,
    };

    if ends_with(&stem, "at") || ends_with(&stem, "bl") || ends_with(&stem, "iz") {
        return with_suffix(stem, "e");
    }
    if ends_double_consonant(&stem) {
        let mut stem = stem;
        if !matches!(stem.last(), Some('l') | Some('s') | Some('z')) {
            stem.pop();
        }
        return stem;
    }
    if measure(&stem) == 1 && ends_cvc(&stem) {
        return with_suffix(stem, "e");
    }
    stem
}

fn step1c(w: Word) -> Word {
    let n = w.len();
    if ends_with(&w, "y") && n > 2 && is_consonant(&w, n - 2) {
        let mut w = w;
        w[n - 1] = 'i';
        return w;
    }
    w
}

const STEP2_RULES: &[(&str, &str, Cond)] = &[
    ("ational", "ate", Cond::MeasureAbove(0)),
    ("tional", "tion", Cond::MeasureAbove(0)),
    ("enci", "ence", Cond::MeasureAbove(0)),
    ("anci", "ance", Cond::MeasureAbove(0)),
    ("izer", "ize", Cond::MeasureAbove(0)),
    ("bli", "ble", Cond::MeasureAbove(0)),
    ("alli", "al", Cond::MeasureAbove(0)),
    ("entli", "ent", Cond::MeasureAbove(0)),
    ("eli", "e", Cond::MeasureAbove(0)),
    ("ousli", "ous", Cond::MeasureAbove(0)),
    ("ization", "ize", Cond::MeasureAbove(0)),
    ("ation", "ate", Cond::MeasureAbove(0)),
    ("ator", "ate", Cond::MeasureAbove(0)),
    ("alism", "al", Cond::MeasureAbove(0)),
    ("iveness", "ive", Cond::MeasureAbove(0)),
    ("fulness", "ful", Cond::MeasureAbove(0)),
    ("ousness", "ous", Cond::MeasureAbove(0)),
    ("aliti", "al", Cond::MeasureAbove(0)),
    ("iviti", "ive", Cond::MeasureAbove(0)),
    ("biliti", "ble", Cond::MeasureAbove(0)),
    ("fulli", "ful", Cond::MeasureAbove(0)),
];

fn step2(w: Word) -> Word {
    if ends_with(&w, "alli") && measure(&strip(&w, "alli")) > 0 {
        return step2(with_suffix(strip(&w, "alli"), "al"));
    }

    if STEP2_RULES.iter().any(|(suffix, _, _)| ends_with(&w, suffix)) {
        return apply_rules(w, STEP2_RULES);
    }

    // -logi is tested against the word minus its last three letters
    if ends_with(&w, "logi") {
        return if measure(&w[..w.len() - 3]) > 0 {
            with_suffix(strip(&w, "logi"), "log")
        } else {
            w
        };
    }
    w
}

fn step3(w: Word) -> Word {
    apply_rules(
        w,
        &[
            ("icate", "ic", Cond::MeasureAbove(0)),
            ("ative", "", Cond::MeasureAbove(0)),
            ("alize", "al", Cond::MeasureAbove(0)),
            ("iciti", "ic", Cond::MeasureAbove(0)),
            ("ical", "ic", Cond::MeasureAbove(0)),
            ("ful", "", Cond::MeasureAbove(0)),
            ("ness", "", Cond::MeasureAbove(0)),
        ],
    )
}

fn step4(w: Word) -> Word {
    apply_rules(
        w,
        &[
            ("al", "", Cond::MeasureAbove(1)),
            ("ance", "", Cond::MeasureAbove(1)),
            ("ence", "", Cond::MeasureAbove(1)),
            ("er", "", Cond::MeasureAbove(1)),
            ("ic", "", Cond::MeasureAbove(1)),
            ("able", "", Cond::MeasureAbove(1)),
            ("ible", "", Cond::MeasureAbove(1)),
            ("ant", "", Cond::MeasureAbove(1)),
            ("ement", "", Cond::MeasureAbove(1)),
            ("ment", "", Cond::MeasureAbove(1)),
            ("ent", "", Cond::MeasureAbove(1)),
            ("ion", "", Cond::IonStem),
            ("ou", "", Cond::MeasureAbove(1)),
            ("ism", "", Cond::MeasureAbove(1)),
            ("ate", "", Cond::MeasureAbove(1)),
            ("iti", "", Cond::MeasureAbove(1)),
            ("ous", "", Cond::MeasureAbove(1)),
            ("ive", "", Cond::MeasureAbove(1)),
            ("ize", "", Cond::MeasureAbove(1)),
        ],
    )
}

fn step5a(w: Word) -> Word {
    if ends_with(&w, "e") {
        let stem = strip(&w, "e");
        if Cond::MeasureAbove(1).holds(&stem)
            || (Cond::MeasureIs(1).holds(&stem) && !ends_cvc(&stem))
        {
            return stem;
        }
    }
    w
}

fn step5b(w: Word) -> Word {
    // m is taken on the word minus one `l`
    if ends_with(&w, "ll") && measure(&w[..w.len() - 1]) > 1 {
        let mut w = w;
        w.pop();
        return w;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Word {
        s.chars().collect()
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure(&chars("tr")), 0);
        assert_eq!(measure(&chars("tree")), 0);
        assert_eq!(measure(&chars("trouble")), 1);
        assert_eq!(measure(&chars("oats")), 1);
        assert_eq!(measure(&chars("troubles")), 2);
        assert_eq!(measure(&chars("oaten")), 2);
    }

    #[test]
    fn test_y_as_vowel() {
        assert!(is_consonant(&chars("toy"), 2));
        assert!(is_consonant(&chars("yes"), 0));
        assert!(!is_consonant(&chars("syzygy"), 1));
    }

    #[test]
    fn test_adverb_and_adjective_suffixes() {
        assert_eq!(stem("generous"), "gener");
        assert_eq!(stem("fairly"), "fairli");
        assert_eq!(stem("amazingly"), "amazingli");
        assert_eq!(stem("communication"), "commun");
    }

    #[test]
    fn test_step1() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("ties"), "tie");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("conflated"), "conflat");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("filing"), "file");
        assert_eq!(stem("cried"), "cri");
        assert_eq!(stem("happy"), "happi");
    }

    #[test]
    fn test_later_steps() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("hopeful"), "hope");
        assert_eq!(stem("goodness"), "good");
        assert_eq!(stem("adjustment"), "adjust");
        assert_eq!(stem("adoption"), "adopt");
        assert_eq!(stem("controlling"), "control");
        assert_eq!(stem("rolling"), "roll");
        assert_eq!(stem("probate"), "probat");
        assert_eq!(stem("rate"), "rate");
        assert_eq!(stem("terrible"), "terribl");
        assert_eq!(stem("wonderful"), "wonder");
    }

    #[test]
    fn test_nltk_extensions() {
        assert_eq!(stem("dying"), "die");
        assert_eq!(stem("skies"), "sky");
        assert_eq!(stem("news"), "news");
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("as"), "as");
        assert_eq!(stem("dies"), "die");
        assert_eq!(stem("generically"), "gener");
        assert_eq!(stem("archaeology"), "archaeolog");
        assert_eq!(stem("hopefully"), "hope");
    }

    #[test]
    fn test_common_review_words() {
        assert_eq!(stem("loved"), "love");
        assert_eq!(stem("love"), "love");
        assert_eq!(stem("hate"), "hate");
        assert_eq!(stem("great"), "great");
        assert_eq!(stem("movie"), "movi");
        assert_eq!(stem("foxes"), "fox");
        assert_eq!(stem("running"), "run");
    }

    #[test]
    fn test_non_ascii_treated_as_consonants() {
        assert_eq!(stem("café"), "café");
        assert_eq!(stem("日本語"), "日本語");
    }
}
