// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;

pub use crate::config::AnalyzerConfig;
pub use crate::core::catalog::{MeterCatalog, MeterClass, MeterSummary, MeterTemplate};
pub use crate::core::converter::InputScript;
pub use crate::core::engine::{ChandasEngine, LineAnalysis, VerseAnalysis};
pub use crate::core::matcher::{LineScore, MatchResult, Mismatch, ScoredMeter};
pub use crate::core::stats::VerseStatistics;
pub use crate::core::types::{Diagnostic, DiagnosticKind, SyllableUnit, Weight, WeightSequence};
pub use crate::error::{ChandasError, Result};
