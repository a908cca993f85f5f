use crate::config::AnalyzerConfig;
use crate::core::catalog::{MeterCatalog, MeterSummary};
use crate::core::classifier::WeightClassifier;
use crate::core::matcher::{MatchResult, Matcher};
use crate::core::stats::VerseStatistics;
use crate::core::syllabifier::Syllabifier;
use crate::core::types::{Diagnostic, DiagnosticKind, LineIndex, SyllableUnit, WeightSequence};
use crate::error::Result;
use serde::Serialize;

/// Scansion of a single line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineAnalysis {
    pub index: LineIndex,
    pub text: String,
    pub syllables: Vec<SyllableUnit>,
    pub weights: WeightSequence,
}

impl LineAnalysis {
    /// Syllables as written in the source line.
    pub fn syllable_texts(&self) -> Vec<&str> {
        self.syllables.iter().map(|s| s.text(&self.text).trim()).collect()
    }
}

/// Everything the engine has to say about one verse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerseAnalysis {
    pub lines: Vec<LineAnalysis>,
    pub result: MatchResult,
    pub statistics: VerseStatistics,
    pub diagnostics: Vec<Diagnostic>,
}

impl VerseAnalysis {
    pub fn sequences(&self) -> Vec<&WeightSequence> {
        self.lines.iter().map(|l| &l.weights).collect()
    }
}

// The engine owns its catalog; nothing in it changes after construction, so
// a shared reference can analyze verses from any number of threads.
pub struct ChandasEngine {
    catalog: MeterCatalog,
    config: AnalyzerConfig,
    classifier: WeightClassifier,
}

impl ChandasEngine {
    pub fn new(catalog: MeterCatalog, config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            classifier: WeightClassifier::new(),
        })
    }

    pub fn with_builtin_catalog(config: AnalyzerConfig) -> Result<Self> {
        Self::new(MeterCatalog::builtin()?, config)
    }

    pub fn catalog(&self) -> &MeterCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.catalog, self.config.acceptance_threshold)
    }

    /// Scans each line, identifies the meter and counts weights. Lines are
    /// taken as given; an empty or punctuation-only line yields an empty
    /// weight sequence.
    pub fn analyze_verse<S: AsRef<str>>(&self, lines: &[S]) -> VerseAnalysis {
        let mut diagnostics = Vec::new();

        let lines: Vec<LineAnalysis> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let text = line.as_ref();
                let syllables: Vec<SyllableUnit> =
                    Syllabifier::new(text, self.config.script).syllables().collect();
                let classification = self.classifier.classify_line(index, &syllables);

                if syllables.is_empty() {
                    diagnostics.push(Diagnostic::new(index, 0, DiagnosticKind::EmptyLine));
                }
                diagnostics.extend(classification.diagnostics);

                LineAnalysis {
                    index,
                    text: text.to_string(),
                    syllables,
                    weights: classification.sequence,
                }
            })
            .collect();

        let sequences: Vec<WeightSequence> = lines.iter().map(|l| l.weights.clone()).collect();
        let matcher = self.matcher();
        if !sequences.is_empty() && !matcher.accepts_line_count(sequences.len()) {
            diagnostics.push(Diagnostic::new(
                0,
                0,
                DiagnosticKind::QuarterCountMismatch {
                    lines: sequences.len(),
                },
            ));
        }

        VerseAnalysis {
            result: matcher.match_verse(&sequences),
            statistics: VerseStatistics::from_sequences(&sequences),
            lines,
            diagnostics,
        }
    }

    /// Like [`analyze_verse`](Self::analyze_verse) for a verse pasted as one
    /// block: blank lines and verse-number lines (`॥ १ ॥`) are dropped.
    pub fn analyze_text(&self, verse: &str) -> VerseAnalysis {
        let lines: Vec<&str> = verse
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('॥'))
            .collect();
        self.analyze_verse(&lines)
    }

    /// Matches weight sequences that were scanned elsewhere.
    pub fn identify(&self, sequences: &[WeightSequence]) -> MatchResult {
        self.matcher().match_verse(sequences)
    }

    pub fn list_meters(&self) -> Vec<MeterSummary> {
        self.catalog.summaries()
    }

    pub fn meter_info(&self, name: &str) -> Option<MeterSummary> {
        self.catalog.get(name).map(|t| t.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ChandasEngine {
        ChandasEngine::with_builtin_catalog(AnalyzerConfig::default()).unwrap()
    }

    #[test]
    fn identifies_anustup() {
        let analysis = engine().analyze_verse(&[
            "वागर्थाविव संपृक्तौ वागर्थप्रतिपत्तये।",
            "जगतः पितरौ वन्दे पार्वतीपरमेश्वरौ॥",
        ]);
        assert_eq!(analysis.result.meter_name(), Some("Anuṣṭup"));
        assert!(analysis.result.confidence() >= 0.85);
        assert_eq!(analysis.statistics.total_syllables, 32);
        assert_eq!(analysis.statistics.lines, 2);
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn analyze_text_drops_blank_and_number_lines() {
        let text = "\nवागर्थाविव संपृक्तौ वागर्थप्रतिपत्तये।\n\nजगतः पितरौ वन्दे पार्वतीपरमेश्वरौ॥\n॥ १ ॥\n";
        let analysis = engine().analyze_text(text);
        assert_eq!(analysis.lines.len(), 2);
        assert_eq!(analysis.result.meter_name(), Some("Anuṣṭup"));
    }

    #[test]
    fn line_count_no_template_accepts() {
        let analysis = engine().analyze_verse(&["रामः", "रामः", "रामः"]);
        assert!(!analysis.result.is_identified());
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::QuarterCountMismatch { lines: 3 }));
    }

    #[test]
    fn empty_line_is_reported_not_fatal() {
        let analysis = engine().analyze_verse(&["।।"]);
        assert!(analysis.lines[0].weights.is_empty());
        assert_eq!(analysis.result, MatchResult::Unidentified { closest: None });
        assert_eq!(analysis.diagnostics[0].kind, DiagnosticKind::EmptyLine);
    }

    #[test]
    fn meter_info_lookup() {
        let info = engine().meter_info("Mandākrāntā").unwrap();
        assert_eq!(info.quarter_lengths, vec![17; 4]);
        assert_eq!(info.syllable_count, 68);
        assert!(engine().meter_info("Unknown").is_none());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = AnalyzerConfig::default().with_threshold(2.0);
        assert!(ChandasEngine::with_builtin_catalog(config).is_err());
    }
}
