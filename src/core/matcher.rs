// File: src/core/matcher.rs
use crate::core::catalog::{MeterCatalog, MeterTemplate, PositionConstraint, Quarter};
use crate::core::types::{LineIndex, Weight, WeightSequence};
use serde::Serialize;
use tracing::{debug, trace};

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.85;

/// Absorbs float noise from averaging; scores this close count as equal.
const SCORE_TOLERANCE: f64 = 1e-9;

/// A position where the observed weight breaks the template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub quarter: usize,
    pub line: LineIndex,
    /// Position within the quarter.
    pub position: usize,
    /// Position within the line.
    pub line_position: usize,
    pub expected: PositionConstraint,
    pub observed: Weight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterScore {
    pub quarter: usize,
    pub line: LineIndex,
    pub score: f64,
    pub observed_len: usize,
    pub expected_len: usize,
    /// Which permissible pattern of the quarter scored best.
    pub alternative: usize,
}

/// Confidence for one input line: the mean of its quarter scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineScore {
    pub line: LineIndex,
    pub score: f64,
}

/// A template scored against a verse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMeter {
    pub name: String,
    /// Mean of the quarter scores; quarters of lines with no syllables are
    /// left out.
    pub score: f64,
    pub line_scores: Vec<LineScore>,
    pub quarters: Vec<QuarterScore>,
    pub mismatches: Vec<Mismatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    Identified(ScoredMeter),
    /// Nothing reached the threshold. `closest` is the best template that
    /// could be aligned with the verse at all.
    Unidentified { closest: Option<ScoredMeter> },
}

impl MatchResult {
    /// Name of the identified meter; `None` for unidentified verses.
    pub fn meter_name(&self) -> Option<&str> {
        match self {
            MatchResult::Identified(m) => Some(&m.name),
            MatchResult::Unidentified { .. } => None,
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, MatchResult::Identified(_))
    }

    /// The identified meter or the closest candidate.
    pub fn best(&self) -> Option<&ScoredMeter> {
        match self {
            MatchResult::Identified(m) => Some(m),
            MatchResult::Unidentified { closest } => closest.as_ref(),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.best().map_or(0.0, |m| m.score)
    }
}

/// One stretch of observed weights aligned with a template quarter.
struct ObservedQuarter<'a> {
    line: LineIndex,
    offset: usize,
    weights: &'a [Weight],
    /// The whole source line scanned to nothing.
    blank_line: bool,
}

/// Scores verses against every template of a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'c> {
    catalog: &'c MeterCatalog,
    threshold: f64,
}

impl<'c> Matcher<'c> {
    pub fn new(catalog: &'c MeterCatalog, threshold: f64) -> Self {
        Self { catalog, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether any template can be aligned with a verse of `lines` lines.
    pub fn accepts_line_count(&self, lines: usize) -> bool {
        self.catalog.iter().any(|t| aligns(t.quarter_count(), lines))
    }

    /// Picks the best-scoring template. Ties go to the one declared first.
    pub fn match_verse(&self, lines: &[WeightSequence]) -> MatchResult {
        let mut best: Option<ScoredMeter> = None;
        for template in self.catalog {
            let Some(scored) = self.score_template(template, lines) else {
                continue;
            };
            trace!(meter = %scored.name, score = scored.score, "template scored");
            if best.as_ref().map_or(true, |b| scored.score > b.score + SCORE_TOLERANCE) {
                best = Some(scored);
            }
        }

        match best {
            Some(m) if m.score + SCORE_TOLERANCE >= self.threshold => {
                debug!(meter = %m.name, score = m.score, "meter identified");
                MatchResult::Identified(m)
            }
            closest => {
                debug!(
                    closest = closest.as_ref().map(|m| m.name.as_str()),
                    "no meter above threshold"
                );
                MatchResult::Unidentified { closest }
            }
        }
    }

    /// Scores one template. `None` when the verse cannot be aligned with its
    /// quarters or every line is empty. A quarter left empty because its line
    /// ran short scores zero.
    pub fn score_template(
        &self,
        template: &MeterTemplate,
        lines: &[WeightSequence],
    ) -> Option<ScoredMeter> {
        let observed = layout(template, lines)?;

        let mut quarters = Vec::with_capacity(observed.len());
        let mut mismatches = Vec::new();
        let mut sum = 0.0;
        let mut counted = 0usize;

        for (i, (quarter, obs)) in template.quarters().iter().zip(&observed).enumerate() {
            let (alternative, score) = best_alternative(quarter, obs.weights);
            quarters.push(QuarterScore {
                quarter: i,
                line: obs.line,
                score,
                observed_len: obs.weights.len(),
                expected_len: quarter.len(),
                alternative,
            });
            if obs.blank_line {
                continue;
            }
            sum += score;
            counted += 1;

            let pattern = &quarter.alternatives()[alternative];
            for (position, (&expected, &observed)) in
                pattern.positions().iter().zip(obs.weights).enumerate()
            {
                if !expected.accepts(observed) {
                    mismatches.push(Mismatch {
                        quarter: i,
                        line: obs.line,
                        position,
                        line_position: obs.offset + position,
                        expected,
                        observed,
                    });
                }
            }
        }

        if counted == 0 {
            return None;
        }

        let per_line = quarters.len() / lines.len();
        let line_scores = lines
            .iter()
            .zip(quarters.chunks(per_line))
            .map(|(seq, qs)| LineScore {
                line: seq.line,
                score: if seq.is_empty() {
                    0.0
                } else {
                    qs.iter().map(|q| q.score).sum::<f64>() / qs.len() as f64
                },
            })
            .collect();

        Some(ScoredMeter {
            name: template.name().to_string(),
            score: sum / counted as f64,
            line_scores,
            quarters,
            mismatches,
        })
    }
}

fn aligns(quarters: usize, lines: usize) -> bool {
    lines > 0 && quarters % lines == 0
}

/// Assigns observed weights to template quarters. A line holds
/// `quarters / lines` consecutive quarters, cut at the template's quarter
/// lengths; the last quarter of a line takes whatever remains.
fn layout<'a>(template: &MeterTemplate, lines: &'a [WeightSequence]) -> Option<Vec<ObservedQuarter<'a>>> {
    let q = template.quarter_count();
    if !aligns(q, lines.len()) {
        return None;
    }
    let per_line = q / lines.len();
    let lengths = template.quarter_lengths();

    let mut out = Vec::with_capacity(q);
    for (li, seq) in lines.iter().enumerate() {
        let mut offset = 0;
        for k in 0..per_line {
            let end = if k + 1 == per_line {
                seq.len()
            } else {
                (offset + lengths[li * per_line + k]).min(seq.len())
            };
            out.push(ObservedQuarter {
                line: seq.line,
                offset,
                weights: &seq.weights[offset..end],
                blank_line: seq.is_empty(),
            });
            offset = end;
        }
    }
    Some(out)
}

/// Best (index, score) over the quarter's permissible patterns.
///
/// A pattern scores `matches / max(observed, expected)`: matches over the
/// shorter length, scaled by the shorter/longer length fraction.
fn best_alternative(quarter: &Quarter, observed: &[Weight]) -> (usize, f64) {
    let mut best = (0, 0.0);
    for (i, pattern) in quarter.alternatives().iter().enumerate() {
        let longest = pattern.len().max(observed.len());
        if longest == 0 {
            continue;
        }
        let matches = pattern
            .positions()
            .iter()
            .zip(observed)
            .filter(|(expected, obs)| expected.accepts(**obs))
            .count();
        let score = matches as f64 / longest as f64;
        if score > best.1 {
            best = (i, score);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{MeterClass, WeightPattern};

    fn template(name: &str, class: MeterClass, quarters: &[&[&str]]) -> MeterTemplate {
        let declared = quarters
            .iter()
            .map(|alts| {
                Quarter::new(
                    alts.iter()
                        .map(|p| p.parse::<WeightPattern>().unwrap())
                        .collect(),
                )
            })
            .collect();
        MeterTemplate::new(name, class, None, declared).unwrap()
    }

    fn catalog(templates: Vec<MeterTemplate>) -> MeterCatalog {
        MeterCatalog::from_templates(templates).unwrap()
    }

    fn lines(patterns: &[&str]) -> Vec<WeightSequence> {
        patterns
            .iter()
            .enumerate()
            .map(|(i, p)| WeightSequence::from_pattern(i, p))
            .collect()
    }

    #[test]
    fn exact_match_is_identified() {
        let cat = catalog(vec![template("Indravajrā", MeterClass::Sama, &[&["GGLGGLLGLGX"]])]);
        let verse = lines(&["GGLGGLLGLGG"; 4]);
        let result = Matcher::new(&cat, DEFAULT_ACCEPTANCE_THRESHOLD).match_verse(&verse);
        assert_eq!(result.meter_name(), Some("Indravajrā"));
        assert_eq!(result.confidence(), 1.0);
        assert!(result.best().unwrap().mismatches.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        // 17 of 20 positions agree: exactly 0.85.
        let cat = catalog(vec![template("Twenty", MeterClass::Vishama, &[&["GGGGGGGGGGGGGGGGGGGG"]])]);
        let verse = lines(&["LLLGGGGGGGGGGGGGGGGG"]);
        let result = Matcher::new(&cat, 0.85).match_verse(&verse);
        assert!(result.is_identified());
        assert_eq!(result.confidence(), 0.85);
    }

    #[test]
    fn just_below_threshold_is_unidentified() {
        // 8499 of 10000 positions agree: 0.8499.
        let expected = "G".repeat(10_000);
        let observed = format!("{}{}", "L".repeat(1_501), "G".repeat(8_499));
        let cat = catalog(vec![template("Long", MeterClass::Vishama, &[&[expected.as_str()]])]);
        let verse = lines(&[observed.as_str()]);
        let result = Matcher::new(&cat, 0.85).match_verse(&verse);
        match result {
            MatchResult::Unidentified { closest: Some(c) } => {
                assert_eq!(c.name, "Long");
                assert!((c.score - 0.8499).abs() < 1e-12);
                assert_eq!(c.mismatches.len(), 1_501);
                assert_eq!(c.mismatches[0].expected, PositionConstraint::Fixed(Weight::Heavy));
                assert_eq!(c.mismatches[0].observed, Weight::Light);
            }
            other => panic!("expected closest candidate, got {other:?}"),
        }
    }

    #[test]
    fn ties_go_to_first_declared() {
        let a = template("First", MeterClass::Sama, &[&["GLGX"]]);
        let b = template("Second", MeterClass::Sama, &[&["GLGX"]]);
        let verse = lines(&["GLGG"; 4]);

        let cat = catalog(vec![a.clone(), b.clone()]);
        assert_eq!(Matcher::new(&cat, 0.85).match_verse(&verse).meter_name(), Some("First"));

        let cat = catalog(vec![b, a]);
        assert_eq!(Matcher::new(&cat, 0.85).match_verse(&verse).meter_name(), Some("Second"));
    }

    #[test]
    fn quarter_count_mismatch_disqualifies() {
        let cat = catalog(vec![template("Four", MeterClass::Sama, &[&["GGX"]])]);
        let verse = lines(&["GGG", "GGG", "GGG"]);
        let matcher = Matcher::new(&cat, 0.85);
        assert!(!matcher.accepts_line_count(3));
        assert_eq!(matcher.match_verse(&verse), MatchResult::Unidentified { closest: None });
    }

    #[test]
    fn half_verse_lines_are_split_by_template_lengths() {
        let cat = catalog(vec![template("Pair", MeterClass::Ardhasama, &[&["LLX"], &["GGGX"]])]);
        let verse = lines(&["LLGGGGG", "LLGGLGG"]);
        let scored = Matcher::new(&cat, 0.85)
            .score_template(cat.get("Pair").unwrap(), &verse)
            .unwrap();
        assert_eq!(scored.quarters.len(), 4);
        assert_eq!(scored.quarters[1].observed_len, 4);
        assert_eq!(scored.mismatches.len(), 1);
        let miss = &scored.mismatches[0];
        assert_eq!((miss.quarter, miss.line, miss.position, miss.line_position), (3, 1, 1, 4));
        assert!((scored.score - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_is_penalized() {
        let cat = catalog(vec![template("Eight", MeterClass::Vishama, &[&["GGGGGGGG"]])]);
        let verse = lines(&["GGGG"]);
        let result = Matcher::new(&cat, 0.85).match_verse(&verse);
        assert_eq!(result.meter_name(), None);
        let closest = result.best().unwrap();
        assert_eq!(closest.score, 0.5);
        assert_eq!(closest.quarters[0].expected_len, 8);
    }

    #[test]
    fn best_alternative_wins() {
        let cat = catalog(vec![template("Mixed", MeterClass::Sama, &[&["GGLX", "LGLX"]])]);
        let verse = lines(&["LGLG"; 4]);
        let scored = Matcher::new(&cat, 0.85)
            .score_template(cat.get("Mixed").unwrap(), &verse)
            .unwrap();
        assert_eq!(scored.score, 1.0);
        assert!(scored.quarters.iter().all(|q| q.alternative == 1));
    }

    #[test]
    fn empty_quarters_are_skipped() {
        let cat = catalog(vec![template("Four", MeterClass::Sama, &[&["GLX"]])]);
        let verse = lines(&["GLG", "", "GLG", "GLG"]);
        let result = Matcher::new(&cat, 0.85).match_verse(&verse);
        assert_eq!(result.meter_name(), Some("Four"));
        let scores = &result.best().unwrap().line_scores;
        assert_eq!(scores[1], LineScore { line: 1, score: 0.0 });
        assert_eq!(scores[0], LineScore { line: 0, score: 1.0 });

        let all_empty = lines(&["", "", "", ""]);
        assert_eq!(
            Matcher::new(&cat, 0.85).match_verse(&all_empty),
            MatchResult::Unidentified { closest: None }
        );
    }

    #[test]
    fn short_line_does_not_fill_missing_quarters() {
        let cat = catalog(vec![template(
            "Śloka",
            MeterClass::Ardhasama,
            &[&["XXXXLGGX"], &["XXXXLGLX"]],
        )]);
        let matcher = Matcher::new(&cat, DEFAULT_ACCEPTANCE_THRESHOLD);

        // A single quarter on one line leaves three quarters with nothing.
        let one = lines(&["GGGGLGGG"]);
        match matcher.match_verse(&one) {
            MatchResult::Unidentified { closest: Some(c) } => {
                assert_eq!(c.score, 0.25);
                assert_eq!(c.quarters[1].observed_len, 0);
                assert_eq!(c.quarters[1].score, 0.0);
                assert_eq!(c.line_scores, vec![LineScore { line: 0, score: 0.25 }]);
            }
            other => panic!("expected a closest candidate, got {other:?}"),
        }

        // Two half-length lines: the second quarter of each line is empty.
        let two = lines(&["GGGGLGGG", "GGGGLGGG"]);
        let result = matcher.match_verse(&two);
        assert!(!result.is_identified());
        assert_eq!(result.confidence(), 0.5);
    }

    #[test]
    fn line_scores_follow_input_lines() {
        let cat = catalog(vec![template("Pair", MeterClass::Ardhasama, &[&["LLX"], &["GGGX"]])]);
        let verse = lines(&["LLGGGGG", "LLGGLGG"]);
        let scored = Matcher::new(&cat, 0.85)
            .score_template(cat.get("Pair").unwrap(), &verse)
            .unwrap();
        assert_eq!(scored.line_scores.len(), 2);
        assert_eq!(scored.line_scores[0].score, 1.0);
        assert!((scored.line_scores[1].score - 0.875).abs() < 1e-12);
    }
}
