// File: src/core/syllabifier.rs
use crate::core::converter::{IastConverter, InputScript};
use crate::core::types::{Coda, SyllableUnit};

/// How the syllabifier treats a single Devanagari character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Consonant,
    Vowel,
    VowelSign,
    Virama,
    Anusvara,
    Visarga,
    Candrabindu,
    Nukta,
    /// Vedic accent marks; they ride on the preceding nucleus.
    Accent,
    /// Spaces, dandas, digits, punctuation, joiners.
    Skip,
    /// A letter outside the Devanagari inventory, scanned as a nucleus.
    Other,
}

pub(crate) fn char_class(c: char) -> CharClass {
    match c {
        '\u{0915}'..='\u{0939}' | '\u{0958}'..='\u{095F}' | '\u{0979}'..='\u{097F}' => {
            CharClass::Consonant
        }
        '\u{0904}'..='\u{0914}' | '\u{0960}' | '\u{0961}' | '\u{0972}'..='\u{0977}' => CharClass::Vowel,
        '\u{093A}' | '\u{093B}' | '\u{093E}'..='\u{094C}' | '\u{094E}' | '\u{094F}'
        | '\u{0955}'..='\u{0957}' | '\u{0962}' | '\u{0963}' => CharClass::VowelSign,
        '\u{094D}' => CharClass::Virama,
        '\u{0902}' => CharClass::Anusvara,
        '\u{0903}' => CharClass::Visarga,
        '\u{0900}' | '\u{0901}' => CharClass::Candrabindu,
        '\u{093C}' => CharClass::Nukta,
        '\u{0951}'..='\u{0954}' => CharClass::Accent,
        '\u{093D}' | '\u{0964}'..='\u{0971}' | '\u{200C}' | '\u{200D}' => CharClass::Skip,
        c if c.is_alphabetic() => CharClass::Other,
        _ => CharClass::Skip,
    }
}

/// Maps a dependent vowel sign to its independent letter. Anything else is
/// returned unchanged.
fn independent_form(sign: char) -> char {
    match sign {
        'ा' => 'आ', 'ि' => 'इ', 'ी' => 'ई', 'ु' => 'उ', 'ू' => 'ऊ',
        'ृ' => 'ऋ', 'ॄ' => 'ॠ', 'ॢ' => 'ऌ', 'ॣ' => 'ॡ',
        'ॅ' => 'ऍ', 'ॆ' => 'ऎ', 'े' => 'ए', 'ै' => 'ऐ',
        'ॉ' => 'ऑ', 'ॊ' => 'ऒ', 'ो' => 'ओ', 'ौ' => 'औ',
        other => other,
    }
}

/// Splits one line of verse into syllables.
///
/// The line is normalized to Devanagari once (romanized input goes through
/// [`IastConverter`]); every call to [`Syllabifier::syllables`] then walks it
/// lazily from the start.
#[derive(Debug, Clone)]
pub struct Syllabifier {
    chars: Vec<(usize, char)>,
    source_len: usize,
}

impl Syllabifier {
    pub fn new(line: &str, script: InputScript) -> Self {
        let chars = match script.resolve(line) {
            InputScript::Iast => IastConverter::new().to_devanagari(line),
            _ => line.char_indices().collect(),
        };
        Self { chars, source_len: line.len() }
    }

    pub fn syllables(&self) -> Syllables<'_> {
        Syllables {
            chars: &self.chars,
            pos: 0,
            source_len: self.source_len,
        }
    }
}

/// Syllabifies a line with script auto-detection.
pub fn syllabify(line: &str) -> Vec<SyllableUnit> {
    Syllabifier::new(line, InputScript::Auto).syllables().collect()
}

/// Lazy left-to-right syllable walk over a normalized line.
#[derive(Debug, Clone)]
pub struct Syllables<'a> {
    chars: &'a [(usize, char)],
    pos: usize,
    source_len: usize,
}

impl<'a> Syllables<'a> {
    fn class_at(&self, i: usize) -> Option<CharClass> {
        self.chars.get(i).map(|&(_, c)| char_class(c))
    }

    /// First index after `i` that is not a nukta.
    fn skip_nukta(&self, mut i: usize) -> usize {
        while self.class_at(i) == Some(CharClass::Nukta) {
            i += 1;
        }
        i
    }

    /// Looks ahead from `from` for another nucleus. When none exists, returns
    /// the virāma-joined consonants left on the line and the index of the last
    /// character they use.
    fn trailing_consonants(&self, from: usize) -> Option<(String, Option<usize>)> {
        let mut consonants = String::new();
        let mut last = None;
        let mut k = from;
        while let Some(&(_, c)) = self.chars.get(k) {
            match char_class(c) {
                CharClass::Consonant => {
                    let n = self.skip_nukta(k + 1);
                    if self.class_at(n) != Some(CharClass::Virama) {
                        return None;
                    }
                    consonants.push(c);
                    last = Some(n);
                    k = n + 1;
                }
                CharClass::Vowel | CharClass::VowelSign | CharClass::Other => return None,
                _ => k += 1,
            }
        }
        Some((consonants, last))
    }
}

impl<'a> Iterator for Syllables<'a> {
    type Item = SyllableUnit;

    fn next(&mut self) -> Option<SyllableUnit> {
        let mut onset = String::new();
        let mut start = None;
        let mut i = self.pos;

        // Onset and nucleus.
        let (vowel, vowel_offset, mut last) = loop {
            let Some(&(offset, c)) = self.chars.get(i) else {
                self.pos = self.chars.len();
                return None;
            };
            match char_class(c) {
                CharClass::Consonant => {
                    start.get_or_insert(offset);
                    onset.push(c);
                    let j = self.skip_nukta(i + 1);
                    match self.chars.get(j).map(|&(o, c)| (o, c, char_class(c))) {
                        Some((_, _, CharClass::Virama)) => i = j + 1,
                        Some((o, sign, CharClass::VowelSign)) => break (independent_form(sign), o, j),
                        _ => break ('अ', offset, j - 1),
                    }
                }
                CharClass::Vowel | CharClass::Other => {
                    start.get_or_insert(offset);
                    break (c, offset, i);
                }
                CharClass::VowelSign => {
                    start.get_or_insert(offset);
                    break (independent_form(c), offset, i);
                }
                _ => i += 1,
            }
        };

        // Marks riding on the nucleus.
        let mut coda = Coda::default();
        while let Some(class) = self.class_at(last + 1) {
            match class {
                CharClass::Anusvara => coda.anusvara = true,
                CharClass::Visarga => coda.visarga = true,
                CharClass::Candrabindu | CharClass::Accent => {}
                _ => break,
            }
            last += 1;
        }

        // Consonants with no vowel after them close the final syllable.
        match self.trailing_consonants(last + 1) {
            Some((consonants, cons_last)) => {
                if let Some(cons_last) = cons_last {
                    coda.consonants = consonants;
                    coda.virama = true;
                    last = cons_last;
                }
                self.pos = self.chars.len();
            }
            None => self.pos = last + 1,
        }

        let end = self
            .chars
            .get(last + 1)
            .map(|&(o, _)| o)
            .unwrap_or(self.source_len);

        Some(SyllableUnit {
            start: start.unwrap_or(vowel_offset),
            end,
            onset,
            vowel,
            vowel_offset,
            coda,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        syllabify(line)
            .iter()
            .map(|s| s.text(line).trim().to_string())
            .collect()
    }

    #[test]
    fn splits_first_half_verse() {
        let line = "वागर्थाविव संपृक्तौ वागर्थप्रतिपत्तये।";
        let units = syllabify(line);
        assert_eq!(units.len(), 16);
        assert_eq!(
            texts(line),
            vec![
                "वा", "ग", "र्था", "वि", "व", "सं", "पृ", "क्तौ", "वा", "ग", "र्थ", "प्र", "ति",
                "प", "त्त", "ये"
            ]
        );
        assert!(units[5].coda.anusvara);
        assert_eq!(units[7].onset, "कत");
        assert_eq!(units[7].vowel, 'औ');
    }

    #[test]
    fn inherent_vowel_and_visarga() {
        let units = syllabify("जगतः");
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].vowel, 'अ');
        assert!(units[2].coda.visarga);
    }

    #[test]
    fn final_consonant_becomes_coda() {
        let line = "वाक्";
        let units = syllabify(line);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].coda.consonants, "क");
        assert!(units[0].coda.virama);
        assert_eq!(units[0].end, line.len());
    }

    #[test]
    fn consonant_before_vowel_initial_word_is_onset() {
        let units = syllabify("वाक् अस्ति");
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].coda.consonants, "");
        assert_eq!(units[1].onset, "क");
        assert_eq!(units[1].vowel, 'अ');
    }

    #[test]
    fn punctuation_only_line_is_empty() {
        assert!(syllabify("॥ १ ॥").is_empty());
        assert!(syllabify("").is_empty());
        assert!(syllabify("क्").is_empty());
    }

    #[test]
    fn iterator_is_restartable() {
        let s = Syllabifier::new("रामः", InputScript::Auto);
        let first: Vec<_> = s.syllables().collect();
        let second: Vec<_> = s.syllables().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn romanized_spans_point_into_source() {
        let line = "vāgarthāviva";
        let s = Syllabifier::new(line, InputScript::Auto);
        let spans: Vec<&str> = s.syllables().map(|u| u.text(line)).collect();
        assert_eq!(spans, vec!["vā", "ga", "rthā", "vi", "va"]);
    }

    #[test]
    fn unknown_letter_is_its_own_nucleus() {
        let units = syllabify("ॐ नमः");
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].vowel, 'ॐ');
    }
}
