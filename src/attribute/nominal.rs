use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use super::{
    mismatch, quote_token, Attribute, AttributeHeader, AttributeKind, TypedAttribute,
    MISSING_TOKEN,
};
use crate::comparison::Comparison;
use crate::data::model::{Cell, Value};
use crate::error::AttributeError;

const NOMINAL_COMPARISONS: [Comparison; 2] = [Comparison::Eq, Comparison::Neq];

/// A categorical column with a declared domain.
///
/// Values order by their position in the declaration, which is also the
/// order ARFF headers list them in.
#[derive(Debug, Clone, PartialEq)]
pub struct NominalAttribute {
    header: AttributeHeader,
    domain: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NominalAttribute {
    /// Build from a declared domain. Repeated values keep their first position.
    pub fn new<I, S>(name: impl Into<String>, id: usize, domain: I) -> Result<Self, AttributeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header = AttributeHeader::new(name, id)?;
        let mut values = Vec::new();
        let mut positions = HashMap::new();
        for value in domain {
            let value = value.into();
            if !positions.contains_key(&value) {
                positions.insert(value.clone(), values.len());
                values.push(value);
            }
        }
        Ok(Self {
            header,
            domain: values,
            positions,
        })
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Position of `value` in the declared domain.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.positions.get(value).copied()
    }

    fn lookup(&self, token: &str) -> Result<String, AttributeError> {
        if self.positions.contains_key(token) {
            Ok(token.to_string())
        } else {
            Err(AttributeError::Format {
                attribute: self.header.name().to_string(),
                token: token.to_string(),
                reason: format!("not one of {{{}}}", self.domain.join(",")),
            })
        }
    }

    /// [`TypedAttribute::decode`] without copying the label.
    fn borrow_value<'c>(&self, cell: &'c Cell) -> Result<Value<&'c str>, AttributeError> {
        match cell {
            Cell::Nominal(v) => Ok(Value::Present(v.as_str())),
            Cell::Missing => Ok(Value::Missing),
            other => Err(mismatch(&self.header, other)),
        }
    }
}

impl Attribute for NominalAttribute {
    fn header(&self) -> &AttributeHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AttributeHeader {
        &mut self.header
    }

    fn kind(&self) -> AttributeKind {
        AttributeKind::Nominal
    }

    fn comparisons(&self) -> &'static [Comparison] {
        &NOMINAL_COMPARISONS
    }

    fn convert_cell(&self, raw: &str) -> Result<Cell, AttributeError> {
        Ok(self.convert_value(raw)?.map_or(Cell::Missing, Cell::Nominal))
    }

    fn convert_literal(&self, raw: &str) -> Result<Cell, AttributeError> {
        self.lookup(raw).map(Cell::Nominal)
    }

    fn compare_cells(&self, a: &Cell, b: &Cell) -> Ordering {
        let (a, b) = match (self.borrow_value(a), self.borrow_value(b)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => panic!("{e}"),
        };
        // Values outside the domain only come from hand-built rows; they
        // sort after the declared values, by text.
        a.cmp_missing_first(&b, |x, y| {
            let rank = |v: &str| self.position(v).unwrap_or(usize::MAX);
            rank(x).cmp(&rank(y)).then_with(|| x.cmp(y))
        })
    }

    fn check_cell(&self, cell: &Cell) -> Result<(), AttributeError> {
        self.borrow_value(cell).map(|_| ())
    }
}

impl TypedAttribute for NominalAttribute {
    type Native = String;

    fn decode(&self, cell: &Cell) -> Result<Value<String>, AttributeError> {
        Ok(self.borrow_value(cell)?.map_or(Value::Missing, |v| Value::Present(v.to_string())))
    }

    fn convert_value(&self, raw: &str) -> Result<Value<String>, AttributeError> {
        let token = raw.trim();
        if token == MISSING_TOKEN {
            return Ok(Value::Missing);
        }
        self.lookup(token).map(Value::Present)
    }
}

impl fmt::Display for NominalAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.domain.iter().map(|v| quote_token(v)).collect();
        write!(
            f,
            "@attribute {} {{{}}}",
            self.header.quoted_name(),
            values.join(",")
        )
    }
}
