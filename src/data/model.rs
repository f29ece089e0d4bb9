use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the grain table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what a Pandas column of the PGD can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl CellValue {
    /// Parse a raw text field the way `pd.read_csv` would type it.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() || matches!(s, "NaN" | "nan" | "NA" | "N/A" | "null") {
            return CellValue::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_nan() => CellValue::Missing,
            Ok(v) => CellValue::Number(v),
            Err(_) => CellValue::Text(s.to_string()),
        }
    }

    /// Numeric value of the cell. NaN never comes back out of here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Categorical form of the cell: text as-is, numbers in display form.
    ///
    /// Cells are typed one by one, so a type column holding `1` loads it as a number.
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Text(s) => Some(Cow::Borrowed(s)),
            CellValue::Number(v) if !v.is_nan() => Some(Cow::Owned(v.to_string())),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.as_f64().is_none() && self.as_str().is_none()
    }
}

// ---------------------------------------------------------------------------
// GrainTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Column-oriented table of grain measurements, aligned by row.
#[derive(Debug, Clone, PartialEq)]
pub struct GrainTable {
    /// Header of the index column (first CSV column); may be empty.
    index_name: String,
    /// Row labels, one per row.
    index: Vec<CellValue>,
    /// Ordered column names (excludes the index).
    column_names: Vec<String>,
    /// Cell data, `columns[i]` belongs to `column_names[i]`.
    columns: Vec<Vec<CellValue>>,
    /// column name → position in `columns`.
    positions: BTreeMap<String, usize>,
}

impl GrainTable {
    /// Assemble a table, checking that every column matches the index length.
    pub fn new(
        index_name: impl Into<String>,
        index: Vec<CellValue>,
        columns: Vec<(String, Vec<CellValue>)>,
    ) -> Result<Self> {
        let n_rows = index.len();
        let mut column_names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut positions = BTreeMap::new();

        for (name, values) in columns {
            if values.len() != n_rows {
                bail!(
                    "Column '{name}' has {} values but the index has {n_rows}",
                    values.len()
                );
            }
            if positions.insert(name.clone(), data.len()).is_some() {
                bail!("Duplicate column '{name}'");
            }
            column_names.push(name);
            data.push(values);
        }

        Ok(GrainTable {
            index_name: index_name.into(),
            index,
            column_names,
            columns: data,
            positions,
        })
    }

    /// Number of rows (grains).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[CellValue] {
        &self.index
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Cells of a column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.positions.get(name).map(|&i| self.columns[i].as_slice())
    }

    /// A new table holding only the given rows, in the given order.
    /// Every index in `rows` must be `< self.len()`.
    pub fn take(&self, rows: &[usize]) -> GrainTable {
        GrainTable {
            index_name: self.index_name.clone(),
            index: pick_rows(&self.index, rows),
            column_names: self.column_names.clone(),
            columns: self.columns.iter().map(|c| pick_rows(c, rows)).collect(),
            positions: self.positions.clone(),
        }
    }
}

fn pick_rows(values: &[CellValue], rows: &[usize]) -> Vec<CellValue> {
    rows.iter().map(|&r| values[r].clone()).collect()
}
