//! Type-erased dataset columns.
//!
//! Search code works against [`Attribute`] (object safe, stored as
//! `Box<dyn Attribute>` in a [`Dataset`](crate::data::model::Dataset)).
//! Code that knows the concrete column type can use [`TypedAttribute`] to get
//! values in their native representation.
//!
//! Every variant honours the same missing-value contract: the raw token `"?"`
//! converts to [`Value::Missing`], and missing values sort before any present
//! value.

mod nominal;
mod numeric;

pub use nominal::NominalAttribute;
pub use numeric::NumericAttribute;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comparison::Comparison;
use crate::data::model::{Cell, Instance, Value};
use crate::error::AttributeError;

/// Raw token marking an absent cell in every supported input format.
pub const MISSING_TOKEN: &str = "?";

// ---------------------------------------------------------------------------
// AttributeKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Numeric,
    Nominal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Numeric => write!(f, "numeric"),
            AttributeKind::Nominal => write!(f, "nominal"),
        }
    }
}

// ---------------------------------------------------------------------------
// AttributeHeader – state shared by every variant
// ---------------------------------------------------------------------------

/// Identity of a column plus the class value it is matched against.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeHeader {
    name: String,
    id: usize,
    target_value: Option<Cell>,
}

impl AttributeHeader {
    pub fn new(name: impl Into<String>, id: usize) -> Result<Self, AttributeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AttributeError::EmptyName { id });
        }
        Ok(Self {
            name,
            id,
            target_value: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn target_value(&self) -> Option<&Cell> {
        self.target_value.as_ref()
    }

    fn assign_target(&mut self, target: Option<Cell>) {
        self.target_value = target;
    }

    /// Render the name the way ARFF headers expect it.
    fn quoted_name(&self) -> String {
        quote_token(&self.name)
    }
}

/// Quote a name or nominal value when it contains separators or would read
/// back as the missing marker.
pub(crate) fn quote_token(token: &str) -> String {
    if token.is_empty()
        || token == MISSING_TOKEN
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '{' | '}' | '\'' | '"' | '%'))
    {
        format!("'{}'", token.replace('\'', "\\'"))
    } else {
        token.to_string()
    }
}

// ---------------------------------------------------------------------------
// Attribute – the object-safe contract
// ---------------------------------------------------------------------------

/// A dataset column, independent of its value type.
///
/// Implementations must be cheap to share across search workers: everything
/// except [`Attribute::set_target_value`] takes `&self`.
pub trait Attribute: fmt::Debug + fmt::Display + Send + Sync {
    fn header(&self) -> &AttributeHeader;

    fn header_mut(&mut self) -> &mut AttributeHeader;

    fn kind(&self) -> AttributeKind;

    /// Operators a refinement step may use against this attribute.
    fn comparisons(&self) -> &'static [Comparison];

    /// Parse a raw token into row storage. `"?"` yields [`Cell::Missing`].
    fn convert_cell(&self, raw: &str) -> Result<Cell, AttributeError>;

    /// Parse a token that is taken verbatim, such as a quoted ARFF value.
    /// `"?"` is an ordinary value here, never [`Cell::Missing`].
    fn convert_literal(&self, raw: &str) -> Result<Cell, AttributeError>;

    /// Order two cells of this column, missing first.
    ///
    /// # Panics
    ///
    /// Panics if either cell is not of this attribute's type.
    fn compare_cells(&self, a: &Cell, b: &Cell) -> Ordering;

    /// Whether `cell` can be stored in this column. Missing cells always can.
    fn check_cell(&self, cell: &Cell) -> Result<(), AttributeError>;

    fn name(&self) -> &str {
        self.header().name()
    }

    fn id(&self) -> usize {
        self.header().id()
    }

    fn target_value(&self) -> Option<&Cell> {
        self.header().target_value()
    }

    /// Designate the class value counted as positive. `"?"` clears it.
    ///
    /// Takes `&mut self`, so no evaluation can run while the target changes.
    fn set_target_value(&mut self, raw: &str) -> Result<(), AttributeError> {
        let cell = self.convert_cell(raw)?;
        let target = (!cell.is_missing()).then_some(cell);
        self.header_mut().assign_target(target);
        Ok(())
    }

    fn supports(&self, comparison: Comparison) -> bool {
        self.comparisons().contains(&comparison)
    }

    /// Order two instances by this attribute's value, missing first.
    ///
    /// # Panics
    ///
    /// Panics if an instance stores no value of this attribute's type at
    /// [`Attribute::id`]: the dataset and attribute set disagree.
    fn compare(&self, a: &Instance, b: &Instance) -> Ordering {
        self.compare_cells(cell_or_panic(self, a), cell_or_panic(self, b))
    }

    /// [`Attribute::compare`] as a closure for `sort_by`.
    fn comparator(&self) -> Box<dyn Fn(&Instance, &Instance) -> Ordering + '_> {
        Box::new(move |a: &Instance, b: &Instance| self.compare(a, b))
    }

    /// Whether the row's class value equals the configured target value.
    /// Unset targets and missing row targets never match.
    fn matches_target_value(&self, instance: &Instance) -> bool {
        match (self.target_value(), instance.target_value()) {
            (None, _) | (_, Cell::Missing) => false,
            (Some(target), actual) => target == actual,
        }
    }
}

// ---------------------------------------------------------------------------
// TypedAttribute – native value access
// ---------------------------------------------------------------------------

pub trait TypedAttribute: Attribute {
    type Native;

    /// Reinterpret a stored cell as this attribute's native type.
    fn decode(&self, cell: &Cell) -> Result<Value<Self::Native>, AttributeError>;

    /// Parse a raw token. `"?"` yields [`Value::Missing`]; anything else that
    /// does not parse is an [`AttributeError::Format`].
    fn convert_value(&self, raw: &str) -> Result<Value<Self::Native>, AttributeError>;

    fn value(&self, instance: &Instance) -> Result<Value<Self::Native>, AttributeError> {
        let cell = instance
            .cell(self.id())
            .ok_or_else(|| out_of_row(self.header(), instance))?;
        self.decode(cell)
    }
}

fn out_of_row(header: &AttributeHeader, instance: &Instance) -> AttributeError {
    AttributeError::TypeMismatch {
        attribute: header.name().to_string(),
        id: header.id(),
        found: format!("only {} cells", instance.len()),
    }
}

fn cell_or_panic<'a, A: Attribute + ?Sized>(attribute: &A, instance: &'a Instance) -> &'a Cell {
    match instance.cell(attribute.id()) {
        Some(cell) => cell,
        None => panic!("{}", out_of_row(attribute.header(), instance)),
    }
}

fn mismatch(header: &AttributeHeader, cell: &Cell) -> AttributeError {
    AttributeError::TypeMismatch {
        attribute: header.name().to_string(),
        id: header.id(),
        found: cell.describe(),
    }
}

/// Decode both cells through `attribute` and order them missing first,
/// panicking on a type mismatch.
fn compare_decoded<A, F>(attribute: &A, a: &Cell, b: &Cell, order: F) -> Ordering
where
    A: TypedAttribute + ?Sized,
    F: FnOnce(&A::Native, &A::Native) -> Ordering,
{
    let decode = |cell: &Cell| match attribute.decode(cell) {
        Ok(value) => value,
        Err(e) => panic!("{e}"),
    };
    decode(a).cmp_missing_first(&decode(b), order)
}
