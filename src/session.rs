use serde::Serialize;

use crate::data::filter::{covered_indices, Condition};
use crate::data::model::Dataset;
use crate::error::AttributeError;
use crate::quality::{passes_threshold, ConfusionTable, QualityMeasure};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One search configuration: a dataset with its class column, the target
/// value counted as positive and the measure used to score subgroups.
///
/// Changing the target needs `&mut self`, so it cannot overlap with an
/// evaluation. Evaluations take `&self` and may run from several threads.
#[derive(Debug)]
pub struct Session {
    dataset: Dataset,
    measure: Box<dyn QualityMeasure>,
}

/// Score of one subgroup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub table: ConfusionTable,
    pub score: f64,
    /// Finite and at or above the measure's minimum value.
    pub accepted: bool,
}

impl Session {
    pub fn new(dataset: Dataset, measure: Box<dyn QualityMeasure>) -> Self {
        Self { dataset, measure }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn measure(&self) -> &dyn QualityMeasure {
        &*self.measure
    }

    /// Designate the class value treated as positive.
    pub fn set_target_value(&mut self, raw: &str) -> Result<(), AttributeError> {
        let class = self.dataset.class_attribute_mut();
        class.set_target_value(raw)?;
        log::info!(
            "target of '{}' set to {}",
            class.name(),
            class
                .target_value()
                .map_or_else(|| "<none>".to_string(), |v| v.to_string())
        );
        Ok(())
    }

    /// The whole dataset as one subgroup: `p == P`, `n == N`.
    pub fn class_distribution(&self) -> ConfusionTable {
        let all: Vec<usize> = (0..self.dataset.len()).collect();
        ConfusionTable::for_coverage(&self.dataset, self.dataset.class_attribute(), &all)
    }

    /// Score the subgroup described by the conjunction of `conditions`.
    pub fn evaluate(&self, conditions: &[Condition]) -> Evaluation {
        let covered = covered_indices(&self.dataset, conditions);
        let table =
            ConfusionTable::for_coverage(&self.dataset, self.dataset.class_attribute(), &covered);
        let score = self.measure.evaluate_table(&table);
        if !score.is_finite() {
            log::debug!("non-finite {} score for {table:?}", self.measure.name());
        }
        Evaluation {
            table,
            score,
            accepted: passes_threshold(&*self.measure, score),
        }
    }
}
