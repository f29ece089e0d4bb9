use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, warn};

use crate::config::DataSource;
use crate::data::filter::{rows_matching_type, rows_matching_value, Comparator, GrainTypes};
use crate::data::loader::load_file;
use crate::data::model::{CellValue, GrainTable};
use crate::data::resolve::{resolve_ratio_column, ColumnRef};
use crate::error::{Result, StarDustError};

/// Categorical column holding the grain classification.
pub const TYPE_COLUMN: &str = "PGD Type";

/// What to do with rows whose ratios are present but whose errors are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingErrors {
    /// Reject the whole row (the PGD tooling's historical behaviour).
    #[default]
    Drop,
    /// Keep the row and report the absent error as `NaN`.
    Keep,
}

/// Row-aligned values and uncertainties for a ratio-vs-ratio plot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_err: Vec<f64>,
    pub y_err: Vec<f64>,
}

impl RatioSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y, x_err, y_err)`
    pub fn into_tuple(self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.x, self.y, self.x_err, self.y_err)
    }
}

// ---------------------------------------------------------------------------
// StarDust – filtered view over the grain database
// ---------------------------------------------------------------------------

/// The grain database: a working table narrowed by filters, plus the table as loaded.
///
/// Filters are cumulative and only ever drop rows; [`StarDust::reset`] brings back
/// everything. Not meant for concurrent mutation: share it behind a single `Mutex`.
#[derive(Debug, Clone)]
pub struct StarDust {
    db: GrainTable,
    backup: GrainTable,
}

impl StarDust {
    /// Load the default PGD export from the data directory.
    pub fn new() -> Result<Self> {
        Self::from_source(&DataSource::default())
    }

    /// Load `file_name` from the data directory.
    pub fn with_file(file_name: &str) -> Result<Self> {
        Self::from_source(&DataSource::with_file(file_name))
    }

    pub fn from_source(source: &DataSource) -> Result<Self> {
        Self::from_path(source.path())
    }

    /// Load any supported file (csv, json, parquet).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = load_file(path).map_err(|source| StarDustError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_table(table))
    }

    pub fn from_table(table: GrainTable) -> Self {
        Self {
            backup: table.clone(),
            db: table,
        }
    }

    /// The working (filtered) table.
    pub fn table(&self) -> &GrainTable {
        &self.db
    }

    /// The table as it was loaded.
    pub fn backup(&self) -> &GrainTable {
        &self.backup
    }

    /// Rows left after filtering.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Distinct grain types present in the working table.
    pub fn grain_types(&self) -> BTreeSet<String> {
        self.db
            .column(TYPE_COLUMN)
            .unwrap_or_default()
            .iter()
            .filter_map(|c| c.label().map(|l| l.into_owned()))
            .collect()
    }

    /// Header of the `iso1 / iso2` ratio in the working table, delta form preferred.
    pub fn header_ratio(&self, iso1: &str, iso2: &str) -> Result<Option<ColumnRef>> {
        resolve_ratio_column(self.db.column_names(), iso1, iso2)
    }

    /// Keep only grains where `ratio(iso1 / iso2) <comparator> value` holds, or where the
    /// ratio's error satisfies it when `err` is set.
    ///
    /// `comparator` is one of `<`, `>`, `<=`, `=<`, `>=`, `=>`, `=`.
    ///
    /// ```no_run
    /// # fn main() -> stardust::Result<()> {
    /// let mut sd = stardust::StarDust::new()?;
    /// sd.filter_value(0.1, "Si-29", "Si-28", ">", false)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter_value(
        &mut self,
        value: f64,
        iso1: &str,
        iso2: &str,
        comparator: &str,
        err: bool,
    ) -> Result<()> {
        let comparator: Comparator = comparator.parse()?;
        self.filter_value_by(value, iso1, iso2, comparator, err)
    }

    /// [`StarDust::filter_value`] with an already parsed comparator.
    pub fn filter_value_by(
        &mut self,
        value: f64,
        iso1: &str,
        iso2: &str,
        comparator: Comparator,
        err: bool,
    ) -> Result<()> {
        let resolved = self.require_ratio(iso1, iso2)?;
        let target = if err {
            resolved.error_name()
        } else {
            resolved.name
        };
        let cells = self.require_column(&target)?;

        let rows = rows_matching_value(cells, comparator, value);
        debug!(
            "filter {target} {comparator} {value}: {} -> {} grains",
            self.db.len(),
            rows.len()
        );
        self.db = self.db.take(&rows);
        Ok(())
    }

    /// Keep only grains of the given type(s), e.g. `"M"` or `["X", "Y"]`.
    pub fn filter_type<T: GrainTypes>(&mut self, grain_type: T) -> Result<()> {
        let selected = grain_type.into_type_set();
        let cells = self.require_column(TYPE_COLUMN)?;

        let rows = rows_matching_type(cells, &selected);
        debug!(
            "filter {TYPE_COLUMN} in {selected:?}: {} -> {} grains",
            self.db.len(),
            rows.len()
        );
        if rows.is_empty() && !self.db.is_empty() {
            warn!("No grains of type {selected:?} left in the working table");
        }
        self.db = self.db.take(&rows);
        Ok(())
    }

    /// Drop all filters.
    pub fn reset(&mut self) {
        debug!("reset: {} -> {} grains", self.db.len(), self.backup.len());
        self.db = self.backup.clone();
    }

    /// Values and errors of two ratios, e.g. `("Si-29", "Si-28")` against
    /// `("Si-30", "Si-28")`, for all grains left after filtering.
    ///
    /// A grain is skipped when any of the four values is missing, including grains
    /// that simply have no reported error. Use [`StarDust::return_ratios_with`] with
    /// [`MissingErrors::Keep`] to retain those.
    pub fn return_ratios(&self, isos1: (&str, &str), isos2: (&str, &str)) -> Result<RatioSeries> {
        self.return_ratios_with(isos1, isos2, MissingErrors::Drop)
    }

    pub fn return_ratios_with(
        &self,
        isos1: (&str, &str),
        isos2: (&str, &str),
        missing_errors: MissingErrors,
    ) -> Result<RatioSeries> {
        let hdr_x = self.require_ratio(isos1.0, isos1.1)?;
        let hdr_y = self.require_ratio(isos2.0, isos2.1)?;

        let xs = self.require_column(&hdr_x.name)?;
        let ys = self.require_column(&hdr_y.name)?;
        let x_errs = self.error_column(&hdr_x, missing_errors)?;
        let y_errs = self.error_column(&hdr_y, missing_errors)?;

        let mut series = RatioSeries::default();
        for row in 0..self.db.len() {
            let (Some(x), Some(y)) = (xs[row].as_f64(), ys[row].as_f64()) else {
                continue;
            };
            let x_err = x_errs.and_then(|c| c[row].as_f64());
            let y_err = y_errs.and_then(|c| c[row].as_f64());
            let (x_err, y_err) = match (x_err, y_err) {
                (Some(xe), Some(ye)) => (xe, ye),
                (xe, ye) if missing_errors == MissingErrors::Keep => {
                    (xe.unwrap_or(f64::NAN), ye.unwrap_or(f64::NAN))
                }
                _ => continue,
            };
            series.x.push(x);
            series.y.push(y);
            series.x_err.push(x_err);
            series.y_err.push(y_err);
        }

        debug!(
            "ratios {} vs {}: {} of {} grains",
            hdr_x.name,
            hdr_y.name,
            series.len(),
            self.db.len()
        );
        Ok(series)
    }

    fn require_ratio(&self, iso1: &str, iso2: &str) -> Result<ColumnRef> {
        self.header_ratio(iso1, iso2)?
            .ok_or_else(|| StarDustError::column_not_found(format!("{iso1}/{iso2}")))
    }

    /// Error cells paired with `column`. With [`MissingErrors::Keep`] an absent error
    /// column reads as all-missing instead of failing.
    fn error_column(
        &self,
        column: &ColumnRef,
        missing_errors: MissingErrors,
    ) -> Result<Option<&[CellValue]>> {
        let name = column.error_name();
        if missing_errors == MissingErrors::Keep && !self.db.has_column(&name) {
            debug!("{name} not in the dataset, errors reported as NaN");
            return Ok(None);
        }
        self.require_column(&name).map(Some)
    }

    fn require_column(&self, name: &str) -> Result<&[CellValue]> {
        self.db
            .column(name)
            .ok_or_else(|| StarDustError::column_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::loader::read_csv;

    const GRAINS: &str = "\
id,PGD Type,d(29Si/28Si),err[d(29Si/28Si)],29Si/28Si,12C/13C,err[12C/13C]
1,M,10.0,2.0,0.052,60.0,1.0
2,X,-250.0,20.0,0.038,30.0,
3,M,45.0,5.0,0.053,85.0,2.0
4,Y,,,0.051,,
5,M,-5.0,1.0,0.050,55.0,0.5
";

    fn stardust() -> StarDust {
        StarDust::from_table(read_csv(csv::Reader::from_reader(GRAINS.as_bytes())).unwrap())
    }

    fn ids(sd: &StarDust) -> Vec<CellValue> {
        sd.table().index().to_vec()
    }

    fn id_cells(ids: &[f64]) -> Vec<CellValue> {
        ids.iter().map(|&i| CellValue::Number(i)).collect()
    }

    #[test]
    fn filter_value_uses_delta_column() {
        let mut sd = stardust();
        sd.filter_value(0.0, "Si-29", "Si-28", ">", false).unwrap();
        assert_eq!(ids(&sd), id_cells(&[1.0, 3.0]));
    }

    #[test]
    fn filter_value_on_errors() {
        let mut sd = stardust();
        sd.filter_value(5.0, "Si-29", "Si-28", "=<", true).unwrap();
        assert_eq!(ids(&sd), id_cells(&[1.0, 3.0, 5.0]));
        sd.filter_value(5.0, "Si-29", "Si-28", "=", true).unwrap();
        assert_eq!(ids(&sd), id_cells(&[3.0]));
    }

    #[test]
    fn invalid_comparator_leaves_table_untouched() {
        let mut sd = stardust();
        let err = sd.filter_value(0.0, "Si-29", "Si-28", "==", false).unwrap_err();
        assert!(matches!(err, StarDustError::InvalidArgument(_)));
        assert_eq!(sd.len(), 5);
    }

    #[test]
    fn unknown_pair_is_column_not_found() {
        let mut sd = stardust();
        let err = sd.filter_value(1.0, "N-14", "N-15", "<", false).unwrap_err();
        assert!(matches!(err, StarDustError::ColumnNotFound { .. }));
        let err = sd.filter_value(1.0, "Si29", "Si-28", "<", false).unwrap_err();
        assert!(matches!(err, StarDustError::Format { .. }));
        assert_eq!(sd.len(), 5);
    }

    #[test]
    fn filter_type_and_grain_types() {
        let mut sd = stardust();
        assert_eq!(
            sd.grain_types(),
            BTreeSet::from(["M".to_string(), "X".to_string(), "Y".to_string()])
        );
        sd.filter_type(["X", "Y"]).unwrap();
        assert_eq!(ids(&sd), id_cells(&[2.0, 4.0]));
        sd.filter_type(Vec::<String>::new()).unwrap();
        assert!(sd.is_empty());
        assert!(sd.grain_types().is_empty());
        sd.reset();
        assert_eq!(sd.len(), 5);
    }

    #[test]
    fn return_ratios_drops_incomplete_rows() {
        let mut sd = stardust();
        let series = sd.return_ratios(("C-12", "C-13"), ("Si-29", "Si-28")).unwrap();
        assert_eq!(series.x, vec![60.0, 85.0, 55.0]);
        assert_eq!(series.y, vec![10.0, 45.0, -5.0]);
        assert_eq!(series.x_err, vec![1.0, 2.0, 0.5]);
        assert_eq!(series.y_err, vec![2.0, 5.0, 1.0]);

        sd.filter_type("X").unwrap();
        assert!(sd.return_ratios(("C-12", "C-13"), ("Si-29", "Si-28")).unwrap().is_empty());
    }

    #[test]
    fn return_ratios_can_keep_rows_without_errors() {
        let sd = stardust();
        let series = sd
            .return_ratios_with(("C-12", "C-13"), ("Si-29", "Si-28"), MissingErrors::Keep)
            .unwrap();
        assert_eq!(series.x, vec![60.0, 30.0, 85.0, 55.0]);
        assert!(series.x_err[1].is_nan());
        assert_eq!(series.y_err[1], 20.0);
    }

    #[test]
    fn raw_ratio_without_error_column() {
        let table = read_csv(csv::Reader::from_reader(
            "id,30Si/28Si,29Si/28Si\n1,0.03,0.05\n".as_bytes(),
        ))
        .unwrap();
        let sd = StarDust::from_table(table);
        let err = sd.return_ratios(("Si-29", "Si-28"), ("Si-30", "Si-28")).unwrap_err();
        assert!(
            matches!(err, StarDustError::ColumnNotFound { ref column } if column == "err[29Si/28Si]")
        );
    }

    #[test]
    fn keep_mode_tolerates_absent_error_column() {
        let table = read_csv(csv::Reader::from_reader(
            "id,30Si/28Si,err[30Si/28Si],29Si/28Si\n1,0.03,0.001,0.05\n2,0.04,,\n".as_bytes(),
        ))
        .unwrap();
        let sd = StarDust::from_table(table);
        let series = sd
            .return_ratios_with(("Si-29", "Si-28"), ("Si-30", "Si-28"), MissingErrors::Keep)
            .unwrap();
        assert_eq!(series.x, vec![0.05]);
        assert_eq!(series.y, vec![0.03]);
        assert!(series.x_err[0].is_nan());
        assert_eq!(series.y_err, vec![0.001]);
    }

    #[test]
    fn missing_type_column() {
        let table =
            read_csv(csv::Reader::from_reader("id,12C/13C\n1,89.0\n".as_bytes())).unwrap();
        let mut sd = StarDust::from_table(table);
        assert!(matches!(
            sd.filter_type("M").unwrap_err(),
            StarDustError::ColumnNotFound { .. }
        ));
    }
}
