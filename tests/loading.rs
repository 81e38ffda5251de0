use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_subgroup::{
    load_file, measure_by_name, AttributeKind, Cell, Condition, LoadOptions, Session,
};

const CONTACT_LENSES: &str = "\
@relation contact-lenses

@attribute age {young, pre-presbyopic, presbyopic}
@attribute tear-rate numeric
@attribute astigmatism {no, yes}
@attribute lenses {soft, hard, none}

@data
young, 3.1, no, soft
young, 1.2, yes, none
pre-presbyopic, 3.3, yes, hard
presbyopic, ?, no, none
presbyopic, 2.8, no, soft
young, 2.9, yes, hard
";

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn loads_arff_and_scores_a_subgroup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "lenses.arff", CONTACT_LENSES);

    let dataset = load_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(dataset.relation, "contact-lenses");
    assert_eq!(dataset.len(), 6);
    assert_eq!(dataset.class_attribute().name(), "lenses");
    assert_eq!(
        dataset.attribute(1).unwrap().to_string(),
        "@attribute tear-rate numeric"
    );

    let cond = Condition::parse(&dataset, "tear-rate >= 2.85").unwrap();
    let mut session = Session::new(dataset, measure_by_name("Precision", 0.5).unwrap());
    session.set_target_value("hard").unwrap();

    let eval = session.evaluate(&[cond]);
    // tear-rate >= 2.85 covers rows 0, 2 and 5; the missing row is excluded.
    assert_eq!((eval.table.p, eval.table.n), (2.0, 1.0));
    assert_eq!((eval.table.big_p, eval.table.big_n), (2.0, 4.0));
    assert!(eval.accepted);
}

#[test]
fn sorting_instances_puts_missing_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "lenses.arff", CONTACT_LENSES);
    let dataset = load_file(&path, &LoadOptions::default()).unwrap();

    let tear_rate = dataset.attribute_by_name("tear-rate").unwrap();
    let mut rows: Vec<_> = dataset.instances().to_vec();
    rows.sort_by(tear_rate.comparator());
    let sorted: Vec<Option<f64>> = rows.iter().map(|r| r.cell(1).unwrap().as_f64()).collect();
    assert_eq!(
        sorted,
        vec![None, Some(1.2), Some(2.8), Some(2.9), Some(3.1), Some(3.3)]
    );
}

#[test]
fn csv_respects_class_option() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "churn.csv",
        "plan,monthly,churned,tenure\nbasic,20,yes,3\npro,45.5,no,20\nbasic,?,no,14\n",
    );
    let options = LoadOptions {
        class_attribute: Some("churned".to_string()),
    };
    let dataset = load_file(&path, &options).unwrap();
    assert_eq!(dataset.relation, "churn");
    assert_eq!(dataset.class_attribute().name(), "churned");
    assert_eq!(
        dataset.instances()[0].target_value(),
        &Cell::Nominal("yes".to_string())
    );
    assert_eq!(
        dataset.attribute_by_name("tenure").unwrap().kind(),
        AttributeKind::Numeric
    );
    assert_eq!(dataset.instances()[2].cell(1), Some(&Cell::Missing));
}

#[test]
fn loads_parquet_columns_by_arrow_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensors.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("reading", DataType::Float64, true),
        Field::new("count", DataType::Int64, false),
        Field::new("faulty", DataType::Boolean, false),
        Field::new("site", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(vec![Some(1.5), None, Some(f64::NAN)])),
        Arc::new(Int64Array::from(vec![3, 7, 11])),
        Arc::new(BooleanArray::from(vec![true, false, true])),
        Arc::new(StringArray::from(vec![Some("a"), Some("b"), None])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let options = LoadOptions {
        class_attribute: Some("faulty".to_string()),
    };
    let dataset = load_file(&path, &options).unwrap();
    let kinds: Vec<AttributeKind> = dataset.attributes().iter().map(|a| a.kind()).collect();
    assert_eq!(
        kinds,
        [
            AttributeKind::Numeric,
            AttributeKind::Numeric,
            AttributeKind::Nominal,
            AttributeKind::Nominal
        ]
    );

    let rows = dataset.instances();
    assert_eq!(rows[0].cell(0), Some(&Cell::Numeric(1.5)));
    assert_eq!(rows[1].cell(0), Some(&Cell::Missing));
    assert_eq!(rows[2].cell(0), Some(&Cell::Missing));
    assert_eq!(rows[2].cell(1), Some(&Cell::Numeric(11.0)));
    assert_eq!(rows[2].cell(3), Some(&Cell::Missing));
    assert_eq!(rows[0].target_value(), &Cell::Nominal("true".to_string()));
}

#[test]
fn unsupported_extension_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "data.xlsx", "");
    let err = load_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(err.to_string().contains(".xlsx"));
}
