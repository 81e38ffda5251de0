use std::collections::HashSet;
use std::fmt;

use anyhow::{bail, Context, Result};

use crate::attribute::{Attribute, MISSING_TOKEN};

// ---------------------------------------------------------------------------
// Value – a converted token, present or missing
// ---------------------------------------------------------------------------

/// Result of converting or extracting a value in an attribute's native type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T> {
    Present(T),
    Missing,
}

impl<T> Value<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Value::Present(v) => Some(v),
            Value::Missing => None,
        }
    }

    pub fn map_or<U>(self, default: U, f: impl FnOnce(T) -> U) -> U {
        match self {
            Value::Present(v) => f(v),
            Value::Missing => default,
        }
    }

    /// Order with every missing value before every present one. Two missing
    /// values are equal, which keeps the order total.
    pub fn cmp_missing_first(
        &self,
        other: &Self,
        present: impl FnOnce(&T, &T) -> std::cmp::Ordering,
    ) -> std::cmp::Ordering {
        use std::cmp::Ordering::*;
        match (self, other) {
            (Value::Missing, Value::Missing) => Equal,
            (Value::Missing, Value::Present(_)) => Less,
            (Value::Present(_), Value::Missing) => Greater,
            (Value::Present(a), Value::Present(b)) => present(a, b),
        }
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Value::Present)
    }
}

// ---------------------------------------------------------------------------
// Cell – one stored value in a row
// ---------------------------------------------------------------------------

/// Row storage for a single column. The variant must agree with the
/// attribute at the same position.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Numeric(f64),
    Nominal(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Short description used in type-mismatch errors.
    pub fn describe(&self) -> String {
        match self {
            Cell::Numeric(v) => format!("numeric value {v}"),
            Cell::Nominal(s) => format!("nominal value '{s}'"),
            Cell::Missing => "missing value".to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{v}"),
            Cell::Nominal(s) => write!(f, "{s}"),
            Cell::Missing => write!(f, "{MISSING_TOKEN}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Instance – one row of the dataset
// ---------------------------------------------------------------------------

/// A row of cells indexed by attribute id, plus the row's class value.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    values: Vec<Cell>,
    target_value: Cell,
}

impl Instance {
    pub fn new(values: Vec<Cell>, target_value: Cell) -> Self {
        Self {
            values,
            target_value,
        }
    }

    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.values.get(id)
    }

    pub fn target_value(&self) -> &Cell {
        &self.target_value
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – schema plus rows
// ---------------------------------------------------------------------------

/// A loaded dataset: one attribute per column and one instance per row.
#[derive(Debug)]
pub struct Dataset {
    /// `@relation` name, or the file stem for formats without one.
    pub relation: String,
    attributes: Vec<Box<dyn Attribute>>,
    instances: Vec<Instance>,
    class_index: usize,
}

impl Dataset {
    /// Assemble a dataset, checking that ids follow column order, names are
    /// unique and every row has one cell per attribute, each of that
    /// attribute's type. Row class values are checked against the class
    /// attribute.
    pub fn new(
        relation: impl Into<String>,
        attributes: Vec<Box<dyn Attribute>>,
        instances: Vec<Instance>,
        class_index: usize,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for (position, attribute) in attributes.iter().enumerate() {
            if attribute.id() != position {
                bail!(
                    "attribute '{}' has id {} but sits at column {position}",
                    attribute.name(),
                    attribute.id()
                );
            }
            if !seen.insert(attribute.name().to_string()) {
                bail!("duplicate attribute name '{}'", attribute.name());
            }
        }
        if class_index >= attributes.len() {
            bail!(
                "class index {class_index} out of range for {} attributes",
                attributes.len()
            );
        }
        for (row, instance) in instances.iter().enumerate() {
            if instance.len() != attributes.len() {
                bail!(
                    "row {row} has {} cells, expected {}",
                    instance.len(),
                    attributes.len()
                );
            }
            for (attribute, cell) in attributes.iter().zip(&instance.values) {
                attribute
                    .check_cell(cell)
                    .with_context(|| format!("row {row}"))?;
            }
            attributes[class_index]
                .check_cell(instance.target_value())
                .with_context(|| format!("row {row}: class value"))?;
        }
        Ok(Self {
            relation: relation.into(),
            attributes,
            instances,
            class_index,
        })
    }

    pub fn attributes(&self) -> &[Box<dyn Attribute>] {
        &self.attributes
    }

    pub fn attribute(&self, id: usize) -> Option<&dyn Attribute> {
        self.attributes.get(id).map(|a| &**a)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&dyn Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .map(|a| &**a)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn class_attribute(&self) -> &dyn Attribute {
        &*self.attributes[self.class_index]
    }

    /// Mutable access for [`Attribute::set_target_value`].
    pub fn class_attribute_mut(&mut self) -> &mut dyn Attribute {
        &mut *self.attributes[self.class_index]
    }

    /// Attributes a condition may be placed on (everything but the class).
    pub fn descriptive_attributes(&self) -> impl Iterator<Item = &dyn Attribute> {
        let class_index = self.class_index;
        self.attributes
            .iter()
            .filter(move |a| a.id() != class_index)
            .map(|a| &**a)
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@relation {}", crate::attribute::quote_token(&self.relation))?;
        for attribute in &self.attributes {
            writeln!(f, "{attribute}")?;
        }
        Ok(())
    }
}
