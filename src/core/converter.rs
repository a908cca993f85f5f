use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

const HALANTA: char = '\u{094d}';
const ANUSVARA: char = '\u{0902}';
const VISARGA: char = '\u{0903}';
const CANDRABINDU: char = '\u{0901}';

// Combining marks used by decomposed IAST.
const MACRON: char = '\u{0304}';
const DOT_BELOW: char = '\u{0323}';
const DOT_ABOVE: char = '\u{0307}';
const TILDE: char = '\u{0303}';
const ACUTE: char = '\u{0301}';
const RING_BELOW: char = '\u{0325}';
const CANDRABINDU_ABOVE: char = '\u{0310}';

/// Script a verse line is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputScript {
    /// Devanagari when the line has any Devanagari letter, IAST otherwise.
    #[default]
    Auto,
    Devanagari,
    Iast,
}

impl InputScript {
    /// Settles `Auto` for a concrete line.
    pub fn resolve(self, line: &str) -> InputScript {
        match self {
            InputScript::Auto if line.chars().any(is_devanagari_letter) => InputScript::Devanagari,
            InputScript::Auto => InputScript::Iast,
            other => other,
        }
    }
}

/// Devanagari block, excluding dandas and digits.
pub fn is_devanagari_letter(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c) && !('\u{0964}'..='\u{096F}').contains(&c)
}

/// Converts IAST romanization to Devanagari, remembering where each output
/// character came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct IastConverter;

impl IastConverter {
    pub fn new() -> Self {
        Self
    }

    /// Transliterates a full romanized string.
    pub fn transliterate(&self, roman: &str) -> String {
        self.to_devanagari(roman).into_iter().map(|(_, c)| c).collect()
    }

    /// Converts one line into Devanagari characters, each tagged with the byte
    /// offset of the source grapheme that produced it.
    pub fn to_devanagari(&self, roman: &str) -> Vec<(usize, char)> {
        let letters: Vec<(usize, char)> = roman
            .grapheme_indices(true)
            .map(|(offset, g)| (offset, compose(g)))
            .collect();

        let mut result = Vec::with_capacity(letters.len());
        let mut last_was_consonant = false;
        let mut i = 0;

        while i < letters.len() {
            let (offset, c) = letters[i];
            let next = letters.get(i + 1).map(|&(_, n)| n);

            if let Some(cons) = self.get_consonant(c, next) {
                if last_was_consonant {
                    result.push((offset, HALANTA));
                }
                result.push((offset, cons.letter));
                last_was_consonant = true;
                i += if cons.aspirated { 2 } else { 1 };
                continue;
            }

            if let Some(vowel) = self.get_vowel(c, next) {
                match (last_was_consonant, vowel.sign) {
                    (true, Some(sign)) => result.push((offset, sign)),
                    (true, None) => {} // inherent a
                    (false, _) => result.push((offset, vowel.letter)),
                }
                last_was_consonant = false;
                i += if vowel.digraph { 2 } else { 1 };
                continue;
            }

            let mark = match c {
                'ṃ' | 'ṁ' => Some(ANUSVARA),
                'ḥ' => Some(VISARGA),
                CANDRABINDU => Some(CANDRABINDU),
                _ => None,
            };
            if let Some(mark) = mark {
                if last_was_consonant {
                    result.push((offset, HALANTA));
                }
                result.push((offset, mark));
                last_was_consonant = false;
                i += 1;
                continue;
            }

            if last_was_consonant {
                result.push((offset, HALANTA));
            }
            if c == '|' && next == Some('|') {
                result.push((offset, '॥'));
                i += 2;
            } else {
                result.push((offset, if c == '|' { '।' } else { c }));
                i += 1;
            }
            last_was_consonant = false;
        }

        if last_was_consonant {
            let offset = letters.last().map(|&(o, _)| o).unwrap_or(0);
            result.push((offset, HALANTA));
        }

        result
    }

    fn get_consonant(&self, c: char, next: Option<char>) -> Option<Consonant> {
        let aspirated = next == Some('h');
        let (plain, breathy) = match c {
            'k' => ('क', Some('ख')), 'g' => ('ग', Some('घ')), 'ṅ' => ('ङ', None),
            'c' => ('च', Some('छ')), 'j' => ('ज', Some('झ')), 'ñ' => ('ञ', None),
            'ṭ' => ('ट', Some('ठ')), 'ḍ' => ('ड', Some('ढ')), 'ṇ' => ('ण', None),
            't' => ('त', Some('थ')), 'd' => ('द', Some('ध')), 'n' => ('न', None),
            'p' => ('प', Some('फ')), 'b' => ('ब', Some('भ')), 'm' => ('म', None),
            'y' => ('य', None), 'r' => ('र', None), 'l' => ('ल', None),
            'v' | 'w' => ('व', None), 'ś' => ('श', None), 'ṣ' => ('ष', None),
            's' => ('स', None), 'h' => ('ह', None),
            _ => return None,
        };
        Some(match breathy {
            Some(letter) if aspirated => Consonant { letter, aspirated: true },
            _ => Consonant { letter: plain, aspirated: false },
        })
    }

    fn get_vowel(&self, c: char, next: Option<char>) -> Option<Vowel> {
        let (letter, sign, digraph) = match (c, next) {
            ('a', Some('i')) => ('ऐ', Some('ै'), true),
            ('a', Some('u')) => ('औ', Some('ौ'), true),
            ('a', _) => ('अ', None, false),
            ('ā', _) => ('आ', Some('ा'), false),
            ('i', _) => ('इ', Some('ि'), false),
            ('ī', _) => ('ई', Some('ी'), false),
            ('u', _) => ('उ', Some('ु'), false),
            ('ū', _) => ('ऊ', Some('ू'), false),
            ('ṛ', _) => ('ऋ', Some('ृ'), false),
            ('ṝ', _) => ('ॠ', Some('ॄ'), false),
            ('ḷ', _) => ('ऌ', Some('ॢ'), false),
            ('ḹ', _) => ('ॡ', Some('ॣ'), false),
            ('e', _) => ('ए', Some('े'), false),
            ('o', _) => ('ओ', Some('ो'), false),
            _ => return None,
        };
        Some(Vowel { letter, sign, digraph })
    }
}

struct Consonant {
    letter: char,
    aspirated: bool,
}

struct Vowel {
    letter: char,
    sign: Option<char>,
    digraph: bool,
}

/// Folds a grapheme cluster into one lowercase IAST letter. Decomposed
/// sequences (base + combining marks) map to their precomposed letter.
fn compose(grapheme: &str) -> char {
    let mut chars = grapheme.chars();
    let base = match chars.next() {
        Some(c) => c.to_lowercase().next().unwrap_or(c),
        None => return ' ',
    };
    let marks: Vec<char> = chars.collect();
    match (base, marks.as_slice()) {
        (_, []) => base,
        ('a', [MACRON]) => 'ā',
        ('i', [MACRON]) => 'ī',
        ('u', [MACRON]) => 'ū',
        ('r', [DOT_BELOW] | [RING_BELOW]) => 'ṛ',
        ('r', [DOT_BELOW, MACRON] | [RING_BELOW, MACRON]) => 'ṝ',
        ('ṛ', [MACRON]) => 'ṝ',
        ('l', [DOT_BELOW] | [RING_BELOW]) => 'ḷ',
        ('l', [DOT_BELOW, MACRON] | [RING_BELOW, MACRON]) => 'ḹ',
        ('ḷ', [MACRON]) => 'ḹ',
        ('m', [DOT_BELOW]) => 'ṃ',
        ('m', [DOT_ABOVE]) => 'ṁ',
        // No precomposed m̐ exists; the Devanagari sign stands in for it.
        ('m', [CANDRABINDU_ABOVE]) => CANDRABINDU,
        ('h', [DOT_BELOW]) => 'ḥ',
        ('n', [DOT_ABOVE]) => 'ṅ',
        ('n', [TILDE]) => 'ñ',
        ('n', [DOT_BELOW]) => 'ṇ',
        ('t', [DOT_BELOW]) => 'ṭ',
        ('d', [DOT_BELOW]) => 'ḍ',
        ('s', [ACUTE]) => 'ś',
        ('s', [DOT_BELOW]) => 'ṣ',
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_precomposed_iast() {
        let conv = IastConverter::new();
        assert_eq!(conv.transliterate("vāgarthāviva"), "वागर्थाविव");
        assert_eq!(conv.transliterate("jagataḥ pitarau"), "जगतः पितरौ");
        assert_eq!(conv.transliterate("saṃpṛktau"), "संपृक्तौ");
    }

    #[test]
    fn converts_decomposed_iast() {
        let conv = IastConverter::new();
        assert_eq!(conv.transliterate("va\u{0304}k"), "वाक्");
        assert_eq!(conv.transliterate("s\u{0301}iva"), "शिव");
    }

    #[test]
    fn candrabindu_is_a_mark_not_a_consonant() {
        let conv = IastConverter::new();
        assert_eq!(conv.transliterate("tām\u{0310}"), "ताँ");
        assert_eq!(conv.transliterate("ham\u{0310}sa"), "हँस");
    }

    #[test]
    fn aspirates_and_diphthongs() {
        let conv = IastConverter::new();
        assert_eq!(conv.transliterate("bhaktaiḥ"), "भक्तैः");
        assert_eq!(conv.transliterate("ghaṭa"), "घट");
        assert_eq!(conv.transliterate("kaustubha"), "कौस्तुभ");
    }

    #[test]
    fn offsets_point_into_source() {
        let conv = IastConverter::new();
        let out = conv.to_devanagari("kā");
        // क at 0, ा from the grapheme starting at byte 1
        assert_eq!(out, vec![(0, 'क'), (1, 'ा')]);
    }

    #[test]
    fn dandas_from_pipes() {
        let conv = IastConverter::new();
        assert_eq!(conv.transliterate("na |"), "न ।");
        assert_eq!(conv.transliterate("na ||"), "न ॥");
    }

    #[test]
    fn script_detection() {
        assert_eq!(InputScript::Auto.resolve("वाक्"), InputScript::Devanagari);
        assert_eq!(InputScript::Auto.resolve("vāk ।"), InputScript::Iast);
        assert_eq!(InputScript::Iast.resolve("वाक्"), InputScript::Iast);
    }
}
