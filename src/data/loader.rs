use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use super::model::{Cell, Dataset, Instance};
use crate::attribute::{Attribute, NominalAttribute, NumericAttribute, MISSING_TOKEN};
use crate::error::AttributeError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// How to interpret a loaded table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Column holding the class label. Defaults to the last column.
    #[serde(default)]
    pub class_attribute: Option<String>,
}

/// Load a dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.arff`    – Weka ARFF with `numeric`/`real`/`integer` and nominal attributes
/// * `.csv`     – header row; column types are inferred
/// * `.parquet` – numeric columns become numeric attributes, text and
///   boolean columns nominal ones
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "arff" => {
            let text = std::fs::read_to_string(path).context("reading ARFF file")?;
            parse_arff(&text)?
        }
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(file, &file_stem(path))?
        }
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let dataset = build_dataset(table, options)
        .with_context(|| format!("building dataset from {}", path.display()))?;
    log::info!(
        "loaded '{}' from {}: {} instances, {} attributes, class '{}'",
        dataset.relation,
        path.display(),
        dataset.len(),
        dataset.attributes().len(),
        dataset.class_attribute().name()
    );
    Ok(dataset)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

// ---------------------------------------------------------------------------
// Raw table – shared by every format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColumnType {
    Numeric,
    /// Domain declared by the file.
    Nominal(Vec<String>),
    /// Nominal, domain taken from the data in order of first appearance.
    NominalFromData,
    /// Numeric when every present token parses, nominal otherwise.
    Infer,
}

/// One unconverted cell.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawToken {
    /// Null in the source file.
    Missing,
    /// Bare text; `"?"` marks a missing value.
    Token(String),
    /// Taken verbatim: quoted ARFF values and typed Parquet values.
    Literal(String),
}

impl RawToken {
    fn is_missing(&self) -> bool {
        match self {
            RawToken::Missing => true,
            RawToken::Token(t) => t.trim() == MISSING_TOKEN,
            RawToken::Literal(_) => false,
        }
    }

    fn text(&self) -> &str {
        match self {
            RawToken::Missing => MISSING_TOKEN,
            RawToken::Token(t) => t.trim(),
            RawToken::Literal(t) => t,
        }
    }

    fn convert(&self, attribute: &dyn Attribute) -> Result<Cell, AttributeError> {
        match self {
            RawToken::Missing => Ok(Cell::Missing),
            RawToken::Token(t) => attribute.convert_cell(t),
            RawToken::Literal(t) => attribute.convert_literal(t),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RawTable {
    pub relation: String,
    pub columns: Vec<(String, ColumnType)>,
    pub rows: Vec<Vec<RawToken>>,
}

/// Create attributes from the column declarations and convert every token
/// through them.
pub(crate) fn build_dataset(table: RawTable, options: &LoadOptions) -> Result<Dataset> {
    let RawTable {
        relation,
        columns,
        rows,
    } = table;
    if columns.is_empty() {
        bail!("no attributes declared");
    }

    for (row_no, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            bail!(
                "row {row_no}: {} values but {} attributes",
                row.len(),
                columns.len()
            );
        }
    }

    let mut attributes: Vec<Box<dyn Attribute>> = Vec::with_capacity(columns.len());
    for (id, (name, kind)) in columns.into_iter().enumerate() {
        let present = || {
            rows.iter()
                .map(move |r| &r[id])
                .filter(|t| !t.is_missing())
        };
        let attribute: Box<dyn Attribute> = match kind {
            ColumnType::Numeric => Box::new(NumericAttribute::new(name, id)?),
            ColumnType::Nominal(domain) => Box::new(NominalAttribute::new(name, id, domain)?),
            ColumnType::NominalFromData => {
                Box::new(NominalAttribute::new(name, id, present().map(RawToken::text))?)
            }
            ColumnType::Infer => {
                let numeric = NumericAttribute::new(name.clone(), id)?;
                if present().all(|t| numeric.convert_literal(t.text()).is_ok()) {
                    Box::new(numeric)
                } else {
                    log::debug!("column '{name}' is not numeric, treating it as nominal");
                    Box::new(NominalAttribute::new(name, id, present().map(RawToken::text))?)
                }
            }
        };
        attributes.push(attribute);
    }

    let class_index = match &options.class_attribute {
        Some(name) => attributes
            .iter()
            .position(|a| a.name() == name)
            .with_context(|| format!("class attribute '{name}' not found"))?,
        None => attributes.len() - 1,
    };

    let mut instances = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let cells = attributes
            .iter()
            .zip(row)
            .map(|(attribute, token)| {
                token
                    .convert(&**attribute)
                    .with_context(|| format!("row {row_no}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let target = cells[class_index].clone();
        instances.push(Instance::new(cells, target));
    }

    Dataset::new(relation, attributes, instances, class_index)
}

// ---------------------------------------------------------------------------
// ARFF loader
// ---------------------------------------------------------------------------

/// Parse an ARFF document:
///
/// ```text
/// % comment
/// @relation weather
/// @attribute temperature numeric
/// @attribute outlook {sunny, overcast, rainy}
/// @attribute play {yes, no}
/// @data
/// 85, sunny, no
/// ?, rainy, yes
/// ```
///
/// Names and nominal values may be quoted. Sparse rows and `string`
/// or `date` attributes are not supported.
pub(crate) fn parse_arff(text: &str) -> Result<RawTable> {
    let mut relation = String::from("dataset");
    let mut columns = Vec::new();
    let mut lines = text.lines().enumerate();
    let mut saw_data = false;

    for (line_no, line) in lines.by_ref() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let (keyword, rest) = split_keyword(line);
        match keyword.to_ascii_lowercase().as_str() {
            "@relation" => relation = split_name(rest).0,
            "@attribute" => {
                let (name, kind) = split_name(rest);
                let kind = parse_attribute_type(kind)
                    .with_context(|| format!("line {}: attribute '{name}'", line_no + 1))?;
                columns.push((name, kind));
            }
            "@data" => {
                saw_data = true;
                break;
            }
            other => bail!("line {}: unexpected '{other}' in ARFF header", line_no + 1),
        }
    }
    if !saw_data {
        bail!("ARFF file has no @data section");
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        if line.starts_with('{') {
            bail!("line {}: sparse rows are not supported", line_no + 1);
        }
        rows.push(split_arff_values(line).with_context(|| format!("line {}", line_no + 1))?);
    }

    log::debug!(
        "parsed ARFF relation '{relation}': {} attributes, {} rows",
        columns.len(),
        rows.len()
    );
    Ok(RawTable {
        relation,
        columns,
        rows,
    })
}

/// Split a comma-separated ARFF line. Values may be quoted with `'` or `"`,
/// with `\\` escaping the next character inside quotes. Quoted values come
/// back as [`RawToken::Literal`], so `'?'` is the text `?`, not a missing value.
fn split_arff_values(line: &str) -> Result<Vec<RawToken>> {
    let mut values = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut value = String::new();
        if let Some(quote) = chars.next_if(|c| *c == '\'' || *c == '"') {
            loop {
                match chars.next() {
                    None => bail!("unterminated quote in '{line}'"),
                    Some('\\') => value.extend(chars.next()),
                    Some(c) if c == quote => break,
                    Some(c) => value.push(c),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            match chars.next() {
                None => {
                    values.push(RawToken::Literal(value));
                    return Ok(values);
                }
                Some(',') => values.push(RawToken::Literal(value)),
                Some(c) => bail!("unexpected '{c}' after quoted value in '{line}'"),
            }
        } else {
            let mut last = true;
            for c in chars.by_ref() {
                if c == ',' {
                    last = false;
                    break;
                }
                value.push(c);
            }
            values.push(RawToken::Token(value.trim_end().to_string()));
            if last {
                return Ok(values);
            }
        }
    }
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

/// Split a possibly quoted leading name from the rest of the line.
fn split_name(text: &str) -> (String, &str) {
    let text = text.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = text.strip_prefix(quote) {
            if let Some(end) = inner.find(quote) {
                return (inner[..end].to_string(), inner[end + 1..].trim());
            }
        }
    }
    let (name, rest) = split_keyword(text);
    (name.to_string(), rest)
}

fn parse_attribute_type(text: &str) -> Result<ColumnType> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .context("unterminated nominal domain")?;
        let domain: Vec<String> = split_arff_values(inner)?
            .iter()
            .map(|v| v.text().to_string())
            .collect();
        if domain.iter().all(|v| v.is_empty()) {
            bail!("empty nominal domain");
        }
        return Ok(ColumnType::Nominal(domain));
    }
    match text.to_ascii_lowercase().as_str() {
        "numeric" | "real" | "integer" => Ok(ColumnType::Numeric),
        other => bail!("unsupported attribute type '{other}'"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one row per instance.
/// Column types are inferred. Empty cells are missing, like `?`.
pub(crate) fn read_csv<R: std::io::Read>(input: R, relation: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let columns: Vec<(String, ColumnType)> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| (h.to_string(), ColumnType::Infer))
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|t| {
                    if t.is_empty() {
                        RawToken::Missing
                    } else {
                        RawToken::Token(t.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable {
        relation: relation.to_string(),
        columns,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
///
/// Integer and float columns become numeric attributes (nulls and `NaN` are
/// missing). Text, categorical and boolean columns become nominal attributes
/// whose domain is taken from the data.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();

    let columns: Vec<(String, ColumnType)> = schema
        .fields()
        .iter()
        .map(|field| {
            let kind = match field.data_type() {
                dt if dt.is_numeric() => ColumnType::Numeric,
                DataType::Utf8 | DataType::LargeUtf8 | DataType::Boolean | DataType::Dictionary(_, _) => {
                    ColumnType::NominalFromData
                }
                other => bail!("column '{}': unsupported type {other:?}", field.name()),
            };
            Ok((field.name().clone(), kind))
        })
        .collect::<Result<_>>()?;

    let reader = builder.build().context("building parquet reader")?;
    let mut rows: Vec<Vec<RawToken>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = rows.len();
        rows.extend((0..batch.num_rows()).map(|_| Vec::with_capacity(columns.len())));

        for (col_idx, (name, kind)) in columns.iter().enumerate() {
            let tokens = column_tokens(batch.column(col_idx), kind)
                .with_context(|| format!("column '{name}'"))?;
            for (row, token) in tokens.into_iter().enumerate() {
                rows[offset + row].push(token);
            }
        }
    }

    Ok(RawTable {
        relation: file_stem(path),
        columns,
        rows,
    })
}

/// Render one Arrow column as literal tokens, [`RawToken::Missing`] for nulls.
fn column_tokens(col: &arrow::array::ArrayRef, kind: &ColumnType) -> Result<Vec<RawToken>> {
    if *kind == ColumnType::Numeric {
        let cast = arrow::compute::cast(col, &DataType::Float64).context("casting to float64")?;
        let values = cast
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?;
        Ok(values
            .iter()
            .map(|v| match v {
                Some(v) if !v.is_nan() => RawToken::Literal(v.to_string()),
                _ => RawToken::Missing,
            })
            .collect())
    } else {
        let cast = arrow::compute::cast(col, &DataType::Utf8).context("casting to utf8")?;
        let values = cast.as_string::<i32>();
        Ok((0..values.len())
            .map(|row| {
                if values.is_null(row) {
                    RawToken::Missing
                } else {
                    RawToken::Literal(values.value(row).to_string())
                }
            })
            .collect())
    }
}
