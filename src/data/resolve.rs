use crate::error::Result;
use crate::isotope::to_database_name;

// ---------------------------------------------------------------------------
// Column naming convention of the PGD
// ---------------------------------------------------------------------------

/// Raw ratio header, e.g. `29Si/28Si`.
pub fn ratio_column_name(nominator_db: &str, denominator_db: &str) -> String {
    format!("{nominator_db}/{denominator_db}")
}

/// Delta header wrapping a ratio header, e.g. `d(29Si/28Si)`.
pub fn delta_column_name(ratio: &str) -> String {
    format!("d({ratio})")
}

/// Error header paired with any value column, e.g. `err[d(29Si/28Si)]`.
pub fn error_column_name(column: &str) -> String {
    format!("err[{column}]")
}

/// What a header denotes according to the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Ratio,
    Delta,
    Error,
    Other,
}

impl ColumnRole {
    pub fn of(header: &str) -> Self {
        if header.starts_with("err[") && header.ends_with(']') {
            ColumnRole::Error
        } else if header.starts_with("d(") && header.ends_with(')') && header.contains('/') {
            ColumnRole::Delta
        } else if header.contains('/') {
            ColumnRole::Ratio
        } else {
            ColumnRole::Other
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A header found for an isotope pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: String,
    /// `true` when the column holds delta values rather than a raw ratio.
    pub is_delta: bool,
}

impl ColumnRef {
    /// Header of the uncertainty column paired with this one.
    pub fn error_name(&self) -> String {
        error_column_name(&self.name)
    }
}

/// Find the column holding `iso1 / iso2` among `columns`.
///
/// The delta column wins when both the delta and the raw ratio exist. `Ok(None)` means
/// the pair is not part of the schema; only malformed labels are errors.
pub fn resolve_ratio_column<S: AsRef<str>>(
    columns: &[S],
    iso1: &str,
    iso2: &str,
) -> Result<Option<ColumnRef>> {
    let ratio = ratio_column_name(&to_database_name(iso1)?, &to_database_name(iso2)?);
    let delta = delta_column_name(&ratio);
    let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);

    let found = if has(&delta) {
        Some(ColumnRef {
            name: delta,
            is_delta: true,
        })
    } else if has(&ratio) {
        Some(ColumnRef {
            name: ratio,
            is_delta: false,
        })
    } else {
        None
    };
    Ok(found)
}
