// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a line within the verse being analyzed.
pub type LineIndex = usize;

/// Prosodic weight of a single syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weight {
    /// Laghu.
    Light,
    /// Guru.
    Heavy,
}

impl Weight {
    /// The conventional `L` / `G` symbol.
    pub fn symbol(self) -> char {
        match self {
            Weight::Light => 'L',
            Weight::Heavy => 'G',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'L' | 'l' => Some(Weight::Light),
            'G' | 'g' => Some(Weight::Heavy),
            _ => None,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Marks that close a syllable after its vowel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coda {
    pub anusvara: bool,
    pub visarga: bool,
    /// A virāma-terminated consonant closes the syllable (line end only).
    pub virama: bool,
    /// Trailing consonants with no following vowel on the line.
    pub consonants: String,
}

/// One syllable: leading consonant cluster, vowel nucleus and coda.
///
/// `start..end` is a byte range into the source line as the caller wrote it,
/// also for romanized input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyllableUnit {
    pub start: usize,
    pub end: usize,
    /// Onset consonants in Devanagari, without virāma signs.
    pub onset: String,
    /// Vowel nucleus as an independent Devanagari vowel letter. The inherent
    /// vowel is reported as `अ`. Unknown nuclei keep the source character.
    pub vowel: char,
    /// Byte offset of the nucleus in the source line.
    pub vowel_offset: usize,
    pub coda: Coda,
}

impl SyllableUnit {
    pub fn onset_len(&self) -> usize {
        self.onset.chars().count()
    }

    pub fn coda_len(&self) -> usize {
        self.coda.consonants.chars().count()
    }

    /// The source slice this syllable was read from.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// Weights of one line, in syllable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightSequence {
    pub line: LineIndex,
    pub weights: Vec<Weight>,
}

impl WeightSequence {
    pub fn new(line: LineIndex, weights: Vec<Weight>) -> Self {
        Self { line, weights }
    }

    /// Builds a sequence from an `L`/`G` string; other characters are ignored.
    pub fn from_pattern(line: LineIndex, pattern: &str) -> Self {
        Self::new(line, pattern.chars().filter_map(Weight::from_symbol).collect())
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn heavy_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w == Weight::Heavy).count()
    }

    pub fn light_count(&self) -> usize {
        self.len() - self.heavy_count()
    }

    pub fn pattern(&self) -> String {
        self.weights.iter().map(|w| w.symbol()).collect()
    }
}

/// What a [`Diagnostic`] is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A nucleus the classifier has no vowel length for; scanned light.
    UnrecognizedGrapheme { grapheme: char },
    /// A line that produced no syllables.
    EmptyLine,
    /// No catalog template can be aligned with this many lines.
    QuarterCountMismatch { lines: usize },
}

/// A non-fatal note attached to an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: LineIndex,
    /// Byte offset into the line, 0 when the note concerns the whole line.
    pub offset: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(line: LineIndex, offset: usize, kind: DiagnosticKind) -> Self {
        Self { line, offset, kind }
    }

    pub fn note(&self) -> String {
        match &self.kind {
            DiagnosticKind::UnrecognizedGrapheme { grapheme } => {
                format!("unrecognized grapheme {grapheme:?} (U+{:04X}) scanned as laghu", *grapheme as u32)
            }
            DiagnosticKind::EmptyLine => "line contains no vowel nucleus".to_string(),
            DiagnosticKind::QuarterCountMismatch { lines } => {
                format!("no meter in the catalog can be aligned with {lines} line(s)")
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, offset {}: {}", self.line + 1, self.offset, self.note())
    }
}
