//! Quality layer: scoring a subgroup from its confusion table.
//!
//! ```text
//!   covered rows ──► ConfusionTable (p, n, P, N)
//!                          │
//!                          ▼
//!                  QualityMeasure::evaluate ──► f64 score
//!                          │
//!                          ▼
//!        caller compares against minimum_value()
//! ```
//!
//! Measures are pure: the same table always gives a bit-identical score and
//! degenerate tables give non-finite scores instead of errors.

pub mod measures;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::data::model::{Dataset, Instance};
use crate::error::QualityError;

pub use measures::{
    Accuracy, Laplace, Precision, Sensitivity, Specificity, WeightedRelativeAccuracy,
};

// ---------------------------------------------------------------------------
// QualityMeasure
// ---------------------------------------------------------------------------

/// A heuristic scoring the confusion table of a candidate subgroup.
///
/// `p`/`n` are the positives/negatives the subgroup covers, `P`/`N` the
/// totals in the dataset. Implementations must be deterministic and must not
/// panic on degenerate counts.
pub trait QualityMeasure: Send + Sync {
    #[allow(non_snake_case)]
    fn evaluate(&self, p: f64, n: f64, P: f64, N: f64) -> f64;

    /// The evaluated expression, for reports.
    fn formula(&self) -> &str;

    /// Display name; also the key [`measure_by_name`] looks up.
    fn name(&self) -> &str;

    /// Scores below this are uninteresting. Carried, never enforced here.
    fn minimum_value(&self) -> f64;

    fn evaluate_table(&self, table: &ConfusionTable) -> f64 {
        self.evaluate(table.p, table.n, table.big_p, table.big_n)
    }
}

impl std::fmt::Debug for dyn QualityMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityMeasure")
            .field("name", &self.name())
            .field("minimum_value", &self.minimum_value())
            .finish()
    }
}

/// Caller-side acceptance policy: a finite score at or above the measure's
/// minimum value.
pub fn passes_threshold(measure: &dyn QualityMeasure, score: f64) -> bool {
    score.is_finite() && score >= measure.minimum_value()
}

// ---------------------------------------------------------------------------
// ConfusionTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfusionTable {
    /// Positives covered by the subgroup.
    pub p: f64,
    /// Negatives covered by the subgroup.
    pub n: f64,
    /// Positives in the dataset.
    #[serde(rename = "P")]
    pub big_p: f64,
    /// Negatives in the dataset.
    #[serde(rename = "N")]
    pub big_n: f64,
}

impl ConfusionTable {
    /// Checked constructor: `0 <= p <= P`, `0 <= n <= N`, `P + N > 0`.
    #[allow(non_snake_case)]
    pub fn new(p: f64, n: f64, P: f64, N: f64) -> Result<Self, QualityError> {
        let in_range = |covered: f64, total: f64| 0.0 <= covered && covered <= total;
        if !(in_range(p, P) && in_range(n, N) && (P > 0.0 || N > 0.0)) {
            return Err(QualityError::InvalidConfusionTable {
                p,
                n,
                big_p: P,
                big_n: N,
            });
        }
        Ok(Self {
            p,
            n,
            big_p: P,
            big_n: N,
        })
    }

    /// Count positives and negatives among `covered` rows and over the whole
    /// dataset, using `target.matches_target_value`.
    ///
    /// Indices past the end of the dataset are ignored and a repeated index
    /// counts once, so `p <= P` and `n <= N` always hold.
    pub fn for_coverage(dataset: &Dataset, target: &dyn Attribute, covered: &[usize]) -> Self {
        let instances = dataset.instances();
        let unique: BTreeSet<usize> = covered.iter().copied().collect();
        let (p, n) = split_counts(target, unique.into_iter().filter_map(|i| instances.get(i)));
        let (big_p, big_n) = split_counts(target, instances.iter());
        Self { p, n, big_p, big_n }
    }

    /// Size of the subgroup.
    pub fn coverage(&self) -> f64 {
        self.p + self.n
    }

    pub fn total(&self) -> f64 {
        self.big_p + self.big_n
    }
}

/// (positives, negatives) among `rows`.
fn split_counts<'a>(target: &dyn Attribute, rows: impl Iterator<Item = &'a Instance>) -> (f64, f64) {
    rows.fold((0.0, 0.0), |(pos, neg), row| {
        if target.matches_target_value(row) {
            (pos + 1.0, neg)
        } else {
            (pos, neg + 1.0)
        }
    })
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type Constructor = fn(f64) -> Box<dyn QualityMeasure>;

fn boxed<M: QualityMeasure + 'static>(measure: M) -> Box<dyn QualityMeasure> {
    Box::new(measure)
}

const REGISTRY: [(&str, Constructor); 6] = [
    (WeightedRelativeAccuracy::NAME, |m| boxed(WeightedRelativeAccuracy::new(m))),
    (Sensitivity::NAME, |m| boxed(Sensitivity::new(m))),
    (Precision::NAME, |m| boxed(Precision::new(m))),
    (Specificity::NAME, |m| boxed(Specificity::new(m))),
    (Accuracy::NAME, |m| boxed(Accuracy::new(m))),
    (Laplace::NAME, |m| boxed(Laplace::new(m))),
];

/// Names accepted by [`measure_by_name`].
pub fn available_measures() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

/// Look a measure up by display name, ignoring case and surrounding spaces.
pub fn measure_by_name(
    name: &str,
    minimum_value: f64,
) -> Result<Box<dyn QualityMeasure>, QualityError> {
    let wanted = name.trim();
    REGISTRY
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(wanted))
        .map(|(_, build)| build(minimum_value))
        .ok_or_else(|| QualityError::UnknownMeasure {
            name: wanted.to_string(),
            available: available_measures().join(", "),
        })
}

// ---------------------------------------------------------------------------
// MeasureConfig
// ---------------------------------------------------------------------------

/// Which measure a search uses, as read from a JSON config.
///
/// ```json
/// { "measure": "Weighted Relative Accuracy", "minimum_value": 0.01 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    pub measure: String,
    /// Absent means every finite score is accepted.
    #[serde(default)]
    pub minimum_value: Option<f64>,
}

impl MeasureConfig {
    pub fn build(&self) -> Result<Box<dyn QualityMeasure>, QualityError> {
        measure_by_name(
            &self.measure,
            self.minimum_value.unwrap_or(f64::NEG_INFINITY),
        )
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            measure: WeightedRelativeAccuracy::NAME.to_string(),
            minimum_value: None,
        }
    }
}
