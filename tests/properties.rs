use std::cmp::Ordering;

use proptest::prelude::*;
use rusty_subgroup::quality::{available_measures, Sensitivity, WeightedRelativeAccuracy};
use rusty_subgroup::{
    measure_by_name, Attribute, Cell, Instance, NominalAttribute, NumericAttribute,
    QualityMeasure, TypedAttribute, Value,
};

fn numeric() -> NumericAttribute {
    NumericAttribute::new("x", 0).unwrap()
}

fn row(cell: Cell) -> Instance {
    Instance::new(vec![cell], Cell::Missing)
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        1 => Just(Cell::Missing),
        4 => prop::num::f64::NORMAL.prop_map(Cell::Numeric),
    ]
}

proptest! {
    /// Rendering a converted number and converting it again gives it back.
    #[test]
    fn numeric_tokens_round_trip(v in prop::num::f64::NORMAL | prop::num::f64::ZERO) {
        let a = numeric();
        let first = a.convert_value(&v.to_string()).unwrap();
        let rendered = match &first {
            Value::Present(x) => x.to_string(),
            Value::Missing => unreachable!(),
        };
        prop_assert_eq!(a.convert_value(&rendered).unwrap(), first);
    }

    /// The comparator is a total order with missing values first.
    #[test]
    fn comparator_is_antisymmetric(a in cell_strategy(), b in cell_strategy()) {
        let attr = numeric();
        let (ra, rb) = (row(a.clone()), row(b.clone()));
        let ab = attr.compare(&ra, &rb);
        let ba = attr.compare(&rb, &ra);
        prop_assert_eq!(ab, ba.reverse());
        if a.is_missing() && !b.is_missing() {
            prop_assert_eq!(ab, Ordering::Less);
        }
    }

    /// Sorting never places a present value before a missing one.
    #[test]
    fn sorted_rows_start_with_missing(cells in prop::collection::vec(cell_strategy(), 0..40)) {
        let attr = numeric();
        let mut rows: Vec<Instance> = cells.into_iter().map(row).collect();
        rows.sort_by(attr.comparator());
        let first_present = rows
            .iter()
            .position(|r| !r.cell(0).unwrap().is_missing())
            .unwrap_or(rows.len());
        prop_assert!(rows[first_present..].iter().all(|r| !r.cell(0).unwrap().is_missing()));
        let values: Vec<f64> = rows[first_present..]
            .iter()
            .filter_map(|r| r.cell(0).unwrap().as_f64())
            .collect();
        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Every registered measure is pure and never panics on valid tables.
    #[test]
    fn measures_are_deterministic(
        p in 0u32..200, n in 0u32..200, extra_p in 0u32..200, extra_n in 0u32..200,
    ) {
        let (p, n) = (p as f64, n as f64);
        let (big_p, big_n) = (p + extra_p as f64, n + extra_n as f64);
        for name in available_measures() {
            let m = measure_by_name(name, 0.0).unwrap();
            let first = m.evaluate(p, n, big_p, big_n);
            let second = m.evaluate(p, n, big_p, big_n);
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }
    }

    /// Covering more positives never lowers sensitivity or WRA.
    #[test]
    fn more_positives_is_better(p in 0u32..50, n in 0u32..50, big_p in 50u32..100, big_n in 50u32..100) {
        let (p, n, big_p, big_n) = (p as f64, n as f64, big_p as f64, big_n as f64);
        let s = Sensitivity::default();
        prop_assert!(s.evaluate(p + 1.0, n, big_p, big_n) >= s.evaluate(p, n, big_p, big_n));
        if p + n > 0.0 {
            let wra = WeightedRelativeAccuracy::default();
            prop_assert!(wra.evaluate(p + 1.0, n, big_p, big_n) >= wra.evaluate(p, n, big_p, big_n));
        }
    }
}

#[test]
fn missing_token_is_missing_for_every_variant() {
    let attributes: Vec<Box<dyn Attribute>> = vec![
        Box::new(numeric()),
        Box::new(NominalAttribute::new("y", 1, ["a", "b"]).unwrap()),
    ];
    for attribute in &attributes {
        assert_eq!(attribute.convert_cell("?").unwrap(), Cell::Missing);
    }
}

#[test]
fn sensitivity_boundary_is_non_finite() {
    let s = Sensitivity::default();
    let score = s.evaluate(0.0, 0.0, 0.0, 60.0);
    let kept: Vec<f64> = [score, 0.5].into_iter().filter(|v| v.is_finite()).collect();
    assert_eq!(kept, vec![0.5]);
}
