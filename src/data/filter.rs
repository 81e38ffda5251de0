use std::fmt;

use crate::attribute::Attribute;
use crate::comparison::Comparison;
use crate::error::AttributeError;

use super::model::{Cell, Dataset, Instance};

// ---------------------------------------------------------------------------
// Condition: one `attribute <op> value` test
// ---------------------------------------------------------------------------

/// A single test on one attribute. A subgroup is a conjunction of these.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    attribute_id: usize,
    attribute_name: String,
    comparison: Comparison,
    value: Cell,
}

impl Condition {
    /// Build a condition, converting `raw` through the attribute.
    ///
    /// Fails when the attribute does not declare `comparison`, when `raw`
    /// does not convert, or when `raw` is the missing-value token.
    pub fn new(
        attribute: &dyn Attribute,
        comparison: Comparison,
        raw: &str,
    ) -> Result<Self, AttributeError> {
        if !attribute.supports(comparison) {
            return Err(AttributeError::UnsupportedComparison {
                attribute: attribute.name().to_string(),
                kind: attribute.kind(),
                comparison,
            });
        }
        let value = attribute.convert_cell(raw)?;
        if value.is_missing() {
            return Err(AttributeError::MissingConditionValue {
                attribute: attribute.name().to_string(),
            });
        }
        Ok(Self {
            attribute_id: attribute.id(),
            attribute_name: attribute.name().to_string(),
            comparison,
            value,
        })
    }

    /// Parse `"name<op>value"` against the dataset's schema.
    pub fn parse(dataset: &Dataset, text: &str) -> anyhow::Result<Self> {
        let (name, comparison, raw) = Comparison::split_condition(text)
            .ok_or_else(|| anyhow::anyhow!("cannot parse condition '{text}'"))?;
        let attribute = dataset
            .attribute_by_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown attribute '{name}' in '{text}'"))?;
        Ok(Self::new(attribute, comparison, raw)?)
    }

    pub fn attribute_id(&self) -> usize {
        self.attribute_id
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn value(&self) -> &Cell {
        &self.value
    }

    /// Whether `instance` satisfies the condition. A missing cell never does.
    ///
    /// # Panics
    ///
    /// Panics if the condition was built against a different schema.
    pub fn matches(&self, dataset: &Dataset, instance: &Instance) -> bool {
        let attribute = match dataset.attribute(self.attribute_id) {
            Some(a) if a.name() == self.attribute_name => a,
            _ => panic!(
                "condition on '{}' does not belong to dataset '{}'",
                self.attribute_name, dataset.relation
            ),
        };
        match instance.cell(self.attribute_id) {
            None | Some(Cell::Missing) => false,
            Some(cell) => self
                .comparison
                .holds(attribute.compare_cells(cell, &self.value)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute_name, self.comparison, self.value)
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

/// Return indices of instances that satisfy every condition.
///
/// An empty condition list covers the whole dataset.
pub fn covered_indices(dataset: &Dataset, conditions: &[Condition]) -> Vec<usize> {
    dataset
        .instances()
        .iter()
        .enumerate()
        .filter(|(_, instance)| conditions.iter().all(|c| c.matches(dataset, instance)))
        .map(|(i, _)| i)
        .collect()
}
