// File: src/core/classifier.rs
use crate::core::types::{Diagnostic, DiagnosticKind, LineIndex, SyllableUnit, Weight, WeightSequence};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VowelLength {
    Short,
    Long,
}

/// Length of an independent Devanagari vowel. Diphthongs count as long.
pub fn vowel_length(vowel: char) -> Option<VowelLength> {
    match vowel {
        'अ' | 'इ' | 'उ' | 'ऋ' | 'ऌ' | 'ऎ' | 'ऒ' => Some(VowelLength::Short),
        'आ' | 'ई' | 'ऊ' | 'ॠ' | 'ॡ' | 'ए' | 'ऐ' | 'ओ' | 'औ' | 'ऍ' | 'ऑ' => Some(VowelLength::Long),
        _ => None,
    }
}

/// A syllable together with what its rules may look at on the same line.
#[derive(Debug, Clone, Copy)]
pub struct SyllableContext<'a> {
    pub unit: &'a SyllableUnit,
    /// Consonants between this nucleus and the next one on the line,
    /// counting the syllable's own coda.
    pub following_consonants: usize,
    pub is_line_final: bool,
}

impl<'a> SyllableContext<'a> {
    pub fn vowel_length(&self) -> Option<VowelLength> {
        vowel_length(self.unit.vowel)
    }

    fn is_short(&self) -> bool {
        self.vowel_length() == Some(VowelLength::Short)
    }
}

/// One predicate → weight rule.
#[derive(Clone, Copy)]
pub struct WeightRule {
    pub name: &'static str,
    pub applies: fn(&SyllableContext<'_>) -> bool,
    pub weight: Weight,
}

impl std::fmt::Debug for WeightRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightRule")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

fn short_before_cluster(ctx: &SyllableContext<'_>) -> bool {
    ctx.is_short() && ctx.following_consonants >= 2
}

fn short_with_nasal_or_aspirate(ctx: &SyllableContext<'_>) -> bool {
    ctx.is_short() && (ctx.unit.coda.anusvara || ctx.unit.coda.visarga)
}

fn long_vowel(ctx: &SyllableContext<'_>) -> bool {
    ctx.vowel_length() == Some(VowelLength::Long)
}

fn always(_: &SyllableContext<'_>) -> bool {
    true
}

/// Evaluated top to bottom; the first rule that applies decides.
pub const WEIGHT_RULES: [WeightRule; 4] = [
    WeightRule {
        name: "short vowel before consonant cluster",
        applies: short_before_cluster,
        weight: Weight::Heavy,
    },
    WeightRule {
        name: "short vowel with anusvara or visarga",
        applies: short_with_nasal_or_aspirate,
        weight: Weight::Heavy,
    },
    WeightRule {
        name: "long vowel or diphthong",
        applies: long_vowel,
        weight: Weight::Heavy,
    },
    WeightRule {
        name: "light by default",
        applies: always,
        weight: Weight::Light,
    },
];

/// Weights of a line plus anything worth reporting about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub sequence: WeightSequence,
    pub diagnostics: Vec<Diagnostic>,
}

/// Assigns laghu/guru to the syllables of one line.
#[derive(Debug, Clone, Copy)]
pub struct WeightClassifier {
    rules: &'static [WeightRule],
}

impl Default for WeightClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightClassifier {
    pub fn new() -> Self {
        Self { rules: &WEIGHT_RULES }
    }

    pub fn rules(&self) -> &[WeightRule] {
        self.rules
    }

    /// Weight from rules 1-4 alone, before the line-final override.
    pub fn weigh(&self, ctx: &SyllableContext<'_>) -> Weight {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(ctx))
            .map(|rule| rule.weight)
            .unwrap_or(Weight::Light)
    }

    /// Classifies a line. The final syllable is always scanned guru.
    pub fn classify_line(&self, line: LineIndex, units: &[SyllableUnit]) -> Classification {
        let mut weights = Vec::with_capacity(units.len());
        let mut diagnostics = Vec::new();

        for (i, unit) in units.iter().enumerate() {
            let next_onset = units.get(i + 1).map_or(0, |next| next.onset_len());
            let ctx = SyllableContext {
                unit,
                following_consonants: unit.coda_len() + next_onset,
                is_line_final: i + 1 == units.len(),
            };

            if ctx.vowel_length().is_none() {
                diagnostics.push(Diagnostic::new(
                    line,
                    unit.vowel_offset,
                    DiagnosticKind::UnrecognizedGrapheme { grapheme: unit.vowel },
                ));
            }

            let weight = if ctx.is_line_final {
                Weight::Heavy
            } else {
                self.weigh(&ctx)
            };
            weights.push(weight);
        }

        Classification {
            sequence: WeightSequence::new(line, weights),
            diagnostics,
        }
    }
}
