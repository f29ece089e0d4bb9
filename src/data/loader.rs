use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, GrainTable};
use super::resolve::ColumnRole;

/// Index column written by `DataFrame.to_parquet()`.
const PANDAS_INDEX_COLUMN: &str = "__index_level_0__";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a grain table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – PGD export, first column is the row index
/// * `.json`    – `[{ "PGD Type": "M", "d(29Si/28Si)": -12.3, ... }, ...]`
/// * `.parquet` – flat numeric / string columns
pub fn load_file(path: &Path) -> Result<GrainTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    let ratios = table
        .column_names()
        .iter()
        .filter(|c| matches!(ColumnRole::of(c), ColumnRole::Ratio | ColumnRole::Delta))
        .count();
    info!(
        "Loaded {} grains with {} columns ({ratios} ratio columns) from {}",
        table.len(),
        table.column_names().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, first column is the row index
/// (`pd.read_csv(path, index_col=0)`). Every other column is kept as-is.
fn load_csv(path: &Path) -> Result<GrainTable> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

pub(crate) fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<GrainTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let Some((index_name, column_names)) = headers.split_first() else {
        bail!("CSV has no header row");
    };

    let mut index = Vec::new();
    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); column_names.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields but found {}",
                headers.len(),
                record.len()
            );
        }

        let mut fields = record.iter();
        index.push(CellValue::parse(fields.next().unwrap_or("")));
        for (col, value) in columns.iter_mut().zip(fields) {
            col.push(CellValue::parse(value));
        }
    }

    debug!("CSV: {} rows, {} columns", index.len(), column_names.len());
    GrainTable::new(
        index_name.clone(),
        index,
        column_names.iter().cloned().zip(columns).collect(),
    )
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "PGD Type": "M", "d(29Si/28Si)": 12.5, "err[d(29Si/28Si)]": 1.1 },
///   ...
/// ]
/// ```
///
/// A key missing from a record is a missing cell. The index is the record position.
fn load_json(path: &Path) -> Result<GrainTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
        }
    }

    let columns = column_names
        .iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| json_to_cell(rec.get(name)))
                .collect();
            (name.clone(), values)
        })
        .collect();
    let index = (0..records.len())
        .map(|i| CellValue::Number(i as f64))
        .collect();

    GrainTable::new("", index, columns)
}

fn json_to_cell(val: Option<&JsonValue>) -> CellValue {
    match val {
        Some(JsonValue::Number(n)) => n.as_f64().map_or(CellValue::Missing, CellValue::Number),
        Some(JsonValue::String(s)) => CellValue::Text(s.clone()),
        Some(JsonValue::Bool(b)) => CellValue::Text(b.to_string()),
        Some(JsonValue::Null) | None => CellValue::Missing,
        Some(other) => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing grain data.
///
/// Expected schema: one flat column per PGD header. Works with files written by
/// **Pandas** (`df.to_parquet()`, whose index lands in `__index_level_0__`) and by the
/// `generate_sample` tool.
fn load_parquet(path: &Path) -> Result<GrainTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); column_names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                values.push(
                    extract_cell(array, row)
                        .with_context(|| format!("column '{}'", column_names[col_idx]))?,
                );
            }
        }
    }

    let mut named: Vec<(String, Vec<CellValue>)> = column_names.into_iter().zip(columns).collect();
    let index_pos = named.iter().position(|(n, _)| n == PANDAS_INDEX_COLUMN);
    let index = match index_pos {
        Some(pos) => named.remove(pos).1,
        None => {
            let n_rows = named.first().map_or(0, |(_, v)| v.len());
            (0..n_rows).map(|i| CellValue::Number(i as f64)).collect()
        }
    };

    GrainTable::new("", index, named)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Missing);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            CellValue::Text(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            CellValue::Number(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            CellValue::Number(arr.value(row) as f64)
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            number_or_missing(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            number_or_missing(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Text(arr.value(row).to_string())
        }
        other => bail!("Unsupported column type {other:?}"),
    };
    Ok(cell)
}

fn number_or_missing(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Missing
    } else {
        CellValue::Number(v)
    }
}
