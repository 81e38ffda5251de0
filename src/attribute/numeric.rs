use std::cmp::Ordering;
use std::fmt;

use super::{compare_decoded, mismatch, Attribute, AttributeHeader, AttributeKind, TypedAttribute, MISSING_TOKEN};
use crate::comparison::Comparison;
use crate::data::model::{Cell, Value};
use crate::error::AttributeError;

const NUMERIC_COMPARISONS: [Comparison; 4] = [
    Comparison::Eq,
    Comparison::Neq,
    Comparison::LtEq,
    Comparison::GtEq,
];

/// A continuous, ordered column stored as `f64`.
///
/// `NaN` is rejected at conversion time. Present values are ordered with
/// [`f64::total_cmp`], so a `NaN` built by hand still sorts deterministically
/// (after `+inf`).
#[derive(Debug, Clone, PartialEq)]
pub struct NumericAttribute {
    header: AttributeHeader,
}

impl NumericAttribute {
    pub fn new(name: impl Into<String>, id: usize) -> Result<Self, AttributeError> {
        Ok(Self {
            header: AttributeHeader::new(name, id)?,
        })
    }

    fn parse_number(&self, token: &str) -> Result<f64, AttributeError> {
        let parsed: f64 = token
            .parse()
            .map_err(|e: std::num::ParseFloatError| self.format_error(token, e.to_string()))?;
        if parsed.is_nan() {
            return Err(self.format_error(token, "NaN is not a numeric value"));
        }
        Ok(parsed)
    }

    fn format_error(&self, token: &str, reason: impl Into<String>) -> AttributeError {
        AttributeError::Format {
            attribute: self.header.name().to_string(),
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

impl Attribute for NumericAttribute {
    fn header(&self) -> &AttributeHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AttributeHeader {
        &mut self.header
    }

    fn kind(&self) -> AttributeKind {
        AttributeKind::Numeric
    }

    fn comparisons(&self) -> &'static [Comparison] {
        &NUMERIC_COMPARISONS
    }

    fn convert_cell(&self, raw: &str) -> Result<Cell, AttributeError> {
        Ok(self.convert_value(raw)?.map_or(Cell::Missing, Cell::Numeric))
    }

    fn convert_literal(&self, raw: &str) -> Result<Cell, AttributeError> {
        self.parse_number(raw.trim()).map(Cell::Numeric)
    }

    fn compare_cells(&self, a: &Cell, b: &Cell) -> Ordering {
        compare_decoded(self, a, b, |x, y| x.total_cmp(y))
    }

    fn check_cell(&self, cell: &Cell) -> Result<(), AttributeError> {
        self.decode(cell).map(|_| ())
    }
}

impl TypedAttribute for NumericAttribute {
    type Native = f64;

    fn decode(&self, cell: &Cell) -> Result<Value<f64>, AttributeError> {
        match cell {
            Cell::Numeric(v) => Ok(Value::Present(*v)),
            Cell::Missing => Ok(Value::Missing),
            other => Err(mismatch(&self.header, other)),
        }
    }

    fn convert_value(&self, raw: &str) -> Result<Value<f64>, AttributeError> {
        let token = raw.trim();
        if token == MISSING_TOKEN {
            return Ok(Value::Missing);
        }
        self.parse_number(token).map(Value::Present)
    }
}

impl fmt::Display for NumericAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@attribute {} numeric", self.header.quoted_name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::Instance;

    fn attr() -> NumericAttribute {
        NumericAttribute::new("weight", 0).unwrap()
    }

    fn row(v: Cell) -> Instance {
        Instance::new(vec![v], Cell::Missing)
    }

    #[test]
    fn converts_numbers_and_missing() {
        let a = attr();
        assert_eq!(a.convert_value("3.25"), Ok(Value::Present(3.25)));
        assert_eq!(a.convert_value(" -1e3 "), Ok(Value::Present(-1000.0)));
        assert_eq!(a.convert_value("?"), Ok(Value::Missing));
        assert_eq!(a.convert_cell("?"), Ok(Cell::Missing));
    }

    #[test]
    fn malformed_tokens_are_format_errors() {
        let a = attr();
        for bad in ["abc", "", "1.2.3", "NaN"] {
            match a.convert_value(bad) {
                Err(AttributeError::Format { attribute, .. }) => assert_eq!(attribute, "weight"),
                other => panic!("expected format error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn literal_question_mark_is_not_a_number() {
        let a = attr();
        assert_eq!(a.convert_literal(" 2.5"), Ok(Cell::Numeric(2.5)));
        assert!(matches!(
            a.convert_literal("?"),
            Err(AttributeError::Format { .. })
        ));
    }

    #[test]
    fn checks_cell_types() {
        let a = attr();
        assert_eq!(a.check_cell(&Cell::Numeric(1.0)), Ok(()));
        assert_eq!(a.check_cell(&Cell::Missing), Ok(()));
        assert!(matches!(
            a.check_cell(&Cell::Nominal("1".into())),
            Err(AttributeError::TypeMismatch { id: 0, .. })
        ));
    }

    #[test]
    fn comparisons_are_the_ordered_operators() {
        let got: BTreeSet<Comparison> = attr().comparisons().iter().copied().collect();
        let want: BTreeSet<Comparison> = [
            Comparison::Eq,
            Comparison::Neq,
            Comparison::LtEq,
            Comparison::GtEq,
        ]
        .into_iter()
        .collect();
        assert_eq!(got, want);
        assert!(!attr().supports(Comparison::Lt));
    }

    #[test]
    fn missing_sorts_before_present() {
        let a = attr();
        let missing = row(Cell::Missing);
        let five = row(Cell::Numeric(5.0));
        assert_eq!(a.compare(&missing, &five), Ordering::Less);
        assert_eq!(a.compare(&five, &missing), Ordering::Greater);
        assert_eq!(a.compare(&missing, &missing), Ordering::Equal);
    }

    #[test]
    fn present_values_sort_ascending() {
        let a = attr();
        let three = row(Cell::Numeric(3.0));
        let seven = row(Cell::Numeric(7.0));
        assert_eq!(a.compare(&three, &seven), Ordering::Less);
        assert_eq!(a.compare(&seven, &three), Ordering::Greater);
        assert_eq!(a.compare(&seven, &seven), Ordering::Equal);
    }

    #[test]
    fn comparator_sorts_rows() {
        let a = attr();
        let mut rows = vec![
            row(Cell::Numeric(2.0)),
            row(Cell::Missing),
            row(Cell::Numeric(-1.0)),
            row(Cell::Missing),
            row(Cell::Numeric(f64::INFINITY)),
        ];
        rows.sort_by(a.comparator());
        let values: Vec<Value<f64>> = rows.iter().map(|r| a.value(r).unwrap()).collect();
        assert_eq!(
            values,
            vec![
                Value::Missing,
                Value::Missing,
                Value::Present(-1.0),
                Value::Present(2.0),
                Value::Present(f64::INFINITY),
            ]
        );
    }

    #[test]
    fn value_reports_type_mismatch() {
        let a = attr();
        let nominal = row(Cell::Nominal("red".into()));
        assert!(matches!(
            a.value(&nominal),
            Err(AttributeError::TypeMismatch { id: 0, .. })
        ));
        let short = Instance::new(vec![], Cell::Missing);
        assert!(matches!(
            a.value(&short),
            Err(AttributeError::TypeMismatch { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "weight")]
    fn comparator_panics_on_mismatch() {
        let a = attr();
        a.compare(&row(Cell::Nominal("x".into())), &row(Cell::Numeric(1.0)));
    }

    #[test]
    fn target_value_uses_value_equality() {
        let mut a = attr();
        let hit = Instance::new(vec![Cell::Numeric(1.0)], Cell::Numeric(1.0));
        let miss = Instance::new(vec![Cell::Numeric(1.0)], Cell::Numeric(0.0));
        assert!(!a.matches_target_value(&hit));

        a.set_target_value("1.0").unwrap();
        assert!(a.matches_target_value(&hit));
        assert!(!a.matches_target_value(&miss));
        assert!(!a.matches_target_value(&row(Cell::Missing)));

        a.set_target_value("?").unwrap();
        assert_eq!(a.target_value(), None);
    }

    #[test]
    fn renders_declaration() {
        assert_eq!(attr().to_string(), "@attribute weight numeric");
        let spaced = NumericAttribute::new("body mass", 1).unwrap();
        assert_eq!(spaced.to_string(), "@attribute 'body mass' numeric");
    }
}
