// File: src/core/catalog.rs
use crate::core::types::Weight;
use crate::error::{ChandasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Format version of the catalog data this build reads and writes.
pub const CATALOG_VERSION: u32 = 1;

const BUILTIN_CATALOG: &str = include_str!("../../data/meters.json");

/// What a template allows at one syllable position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionConstraint {
    Fixed(Weight),
    /// Either weight is allowed (anceps).
    Either,
}

impl PositionConstraint {
    pub fn accepts(self, observed: Weight) -> bool {
        match self {
            PositionConstraint::Fixed(w) => w == observed,
            PositionConstraint::Either => true,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            PositionConstraint::Fixed(w) => w.symbol(),
            PositionConstraint::Either => 'X',
        }
    }
}

/// A fixed-length sequence of position constraints, written `L`/`G`/`X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeightPattern {
    positions: Vec<PositionConstraint>,
}

impl WeightPattern {
    pub fn new(positions: Vec<PositionConstraint>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[PositionConstraint] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromStr for WeightPattern {
    type Err = String;

    /// Whitespace and `|` may be used to group syllables; they carry no meaning.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut positions = Vec::with_capacity(s.len());
        for c in s.chars() {
            let constraint = match c {
                'X' | 'x' => PositionConstraint::Either,
                c if c.is_whitespace() || c == '|' => continue,
                c => match Weight::from_symbol(c) {
                    Some(w) => PositionConstraint::Fixed(w),
                    None => return Err(format!("unexpected symbol {c:?} in pattern {s:?}")),
                },
            };
            positions.push(constraint);
        }
        Ok(Self { positions })
    }
}

impl fmt::Display for WeightPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.positions {
            write!(f, "{}", p.symbol())?;
        }
        Ok(())
    }
}

/// One pāda: one or more permissible patterns of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quarter {
    alternatives: Vec<WeightPattern>,
}

impl Quarter {
    pub fn new(alternatives: Vec<WeightPattern>) -> Self {
        Self { alternatives }
    }

    pub fn single(pattern: WeightPattern) -> Self {
        Self::new(vec![pattern])
    }

    pub fn alternatives(&self) -> &[WeightPattern] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.first().map_or(0, WeightPattern::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How the declared quarters expand into the verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterClass {
    /// One quarter, repeated four times.
    Sama,
    /// Two quarters, alternating a-b-a-b.
    Ardhasama,
    /// Every quarter listed explicitly.
    Vishama,
}

/// A named meter with its quarters already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterTemplate {
    name: String,
    class: MeterClass,
    description: Option<String>,
    quarters: Vec<Quarter>,
}

impl MeterTemplate {
    /// Builds a template from its declared quarters, expanding them by class.
    pub fn new(
        name: impl Into<String>,
        class: MeterClass,
        description: Option<String>,
        declared: Vec<Quarter>,
    ) -> Result<Self> {
        let name = name.into();
        let malformed = |reason: String| ChandasError::MalformedTemplate {
            meter: name.clone(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(malformed("meter name is empty".into()));
        }

        let quarters = match (class, declared.len()) {
            (MeterClass::Sama, 1) => vec![declared[0].clone(); 4],
            (MeterClass::Ardhasama, 2) => {
                let (a, b) = (&declared[0], &declared[1]);
                vec![a.clone(), b.clone(), a.clone(), b.clone()]
            }
            (MeterClass::Vishama, n) if n > 0 => declared,
            (class, n) => {
                return Err(malformed(format!("{class:?} meter declares {n} quarter(s)")));
            }
        };

        for (i, quarter) in quarters.iter().enumerate() {
            if quarter.alternatives.is_empty() || quarter.is_empty() {
                return Err(malformed(format!("quarter {} has no positions", i + 1)));
            }
            if quarter.alternatives.iter().any(|p| p.len() != quarter.len()) {
                return Err(malformed(format!(
                    "quarter {} mixes patterns of different lengths",
                    i + 1
                )));
            }
        }

        Ok(Self {
            name,
            class,
            description,
            quarters,
        })
    }

    pub fn from_record(record: &MeterRecord) -> Result<Self> {
        let declared = record
            .quarters
            .iter()
            .map(|alternatives| {
                alternatives
                    .iter()
                    .map(|p| p.parse::<WeightPattern>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(Quarter::new)
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|reason| ChandasError::MalformedTemplate {
                meter: record.name.clone(),
                reason,
            })?;
        Self::new(
            record.name.clone(),
            record.class,
            record.description.clone(),
            declared,
        )
    }

    /// The declared (unexpanded) form of this template.
    pub fn to_record(&self) -> MeterRecord {
        let declared = match self.class {
            MeterClass::Sama => &self.quarters[..1],
            MeterClass::Ardhasama => &self.quarters[..2],
            MeterClass::Vishama => &self.quarters[..],
        };
        MeterRecord {
            name: self.name.clone(),
            class: self.class,
            description: self.description.clone(),
            quarters: declared
                .iter()
                .map(|q| q.alternatives.iter().map(|p| p.to_string()).collect())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> MeterClass {
        self.class
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    pub fn quarter_count(&self) -> usize {
        self.quarters.len()
    }

    pub fn quarter_lengths(&self) -> Vec<usize> {
        self.quarters.iter().map(Quarter::len).collect()
    }

    pub fn syllable_count(&self) -> usize {
        self.quarters.iter().map(Quarter::len).sum()
    }

    pub fn summary(&self) -> MeterSummary {
        MeterSummary {
            name: self.name.clone(),
            class: self.class,
            description: self.description.clone(),
            quarter_count: self.quarter_count(),
            quarter_lengths: self.quarter_lengths(),
            syllable_count: self.syllable_count(),
        }
    }
}

/// On-disk form of one meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterRecord {
    pub name: String,
    pub class: MeterClass,
    #[serde(default)]
    pub description: Option<String>,
    /// Declared quarters, each a list of permissible `L`/`G`/`X` patterns.
    pub quarters: Vec<Vec<String>>,
}

/// On-disk form of a whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: u32,
    pub meters: Vec<MeterRecord>,
}

/// Catalog introspection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeterSummary {
    pub name: String,
    pub class: MeterClass,
    pub description: Option<String>,
    pub quarter_count: usize,
    pub quarter_lengths: Vec<usize>,
    pub syllable_count: usize,
}

/// Read-only registry of meter templates in declaration order.
#[derive(Debug, Clone)]
pub struct MeterCatalog {
    version: u32,
    templates: Vec<MeterTemplate>,
    by_name: HashMap<String, usize>,
}

impl MeterCatalog {
    /// Builds a catalog; names must be unique.
    pub fn from_templates(templates: Vec<MeterTemplate>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(templates.len());
        for (i, template) in templates.iter().enumerate() {
            if by_name.insert(template.name.clone(), i).is_some() {
                return Err(ChandasError::DuplicateMeter {
                    name: template.name.clone(),
                });
            }
        }
        debug!(meters = templates.len(), "meter catalog loaded");
        Ok(Self {
            version: CATALOG_VERSION,
            templates,
            by_name,
        })
    }

    pub fn from_file(file: &CatalogFile) -> Result<Self> {
        if file.version != CATALOG_VERSION {
            return Err(ChandasError::UnsupportedCatalogVersion {
                found: file.version,
                expected: CATALOG_VERSION,
            });
        }
        let templates = file
            .meters
            .iter()
            .map(MeterTemplate::from_record)
            .collect::<Result<Vec<_>>>()?;
        Self::from_templates(templates)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(&file)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            version: self.version,
            meters: self.templates.iter().map(MeterTemplate::to_record).collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&MeterTemplate> {
        self.by_name.get(name).map(|&i| &self.templates[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeterTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn summaries(&self) -> Vec<MeterSummary> {
        self.templates.iter().map(MeterTemplate::summary).collect()
    }
}

impl<'a> IntoIterator for &'a MeterCatalog {
    type Item = &'a MeterTemplate;
    type IntoIter = std::slice::Iter<'a, MeterTemplate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
