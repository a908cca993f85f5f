use crate::core::types::WeightSequence;
use serde::Serialize;

/// Laghu/guru counts over one or more lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerseStatistics {
    pub total_syllables: usize,
    pub guru: usize,
    pub laghu: usize,
    pub lines: usize,
}

impl VerseStatistics {
    pub fn from_sequences<'a, I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = &'a WeightSequence>,
    {
        sequences
            .into_iter()
            .fold(Self::default(), |acc, seq| {
                acc.merge(Self {
                    total_syllables: seq.len(),
                    guru: seq.heavy_count(),
                    laghu: seq.light_count(),
                    lines: 1,
                })
            })
    }

    /// Sums counts, e.g. across several verses.
    pub fn merge(self, other: Self) -> Self {
        Self {
            total_syllables: self.total_syllables + other.total_syllables,
            guru: self.guru + other.guru,
            laghu: self.laghu + other.laghu,
            lines: self.lines + other.lines,
        }
    }

    pub fn guru_percentage(&self) -> f64 {
        if self.total_syllables == 0 {
            0.0
        } else {
            self.guru as f64 / self.total_syllables as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_guru_and_laghu() {
        let seqs = vec![
            WeightSequence::from_pattern(0, "GLLGLLGL"),
            WeightSequence::from_pattern(1, "LLGLLGLG"),
        ];
        let stats = VerseStatistics::from_sequences(&seqs);
        assert_eq!(
            stats,
            VerseStatistics {
                total_syllables: 16,
                guru: 6,
                laghu: 10,
                lines: 2
            }
        );
        assert_eq!(stats.guru_percentage(), 37.5);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = VerseStatistics::from_sequences(&Vec::<WeightSequence>::new());
        assert_eq!(stats, VerseStatistics::default());
        assert_eq!(stats.guru_percentage(), 0.0);
    }

    #[test]
    fn empty_lines_still_count_as_lines() {
        let seqs = [WeightSequence::from_pattern(0, ""), WeightSequence::from_pattern(1, "G")];
        let stats = VerseStatistics::from_sequences(seqs.iter());
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.total_syllables, 1);
    }

    #[test]
    fn merge_accumulates_verses() {
        let a = VerseStatistics::from_sequences(&[WeightSequence::from_pattern(0, "GL")]);
        let b = VerseStatistics::from_sequences(&[WeightSequence::from_pattern(0, "GGG")]);
        let total = a.merge(b);
        assert_eq!((total.total_syllables, total.guru, total.laghu, total.lines), (5, 4, 1, 2));
    }
}
