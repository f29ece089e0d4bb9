use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::StarDustError;

use super::model::CellValue;

// ---------------------------------------------------------------------------
// Comparator – the fixed set of value predicates
// ---------------------------------------------------------------------------

/// Comparison applied as `cell <op> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl FromStr for Comparator {
    type Err = StarDustError;

    /// Accepts `<`, `>`, `<=`, `=<`, `>=`, `=>` and `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Comparator::Less),
            ">" => Ok(Comparator::Greater),
            "<=" | "=<" => Ok(Comparator::LessOrEqual),
            ">=" | "=>" => Ok(Comparator::GreaterOrEqual),
            "=" => Ok(Comparator::Equal),
            other => Err(StarDustError::InvalidArgument(format!(
                "Comparator {other} is not valid."
            ))),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Comparator::Less => "<",
            Comparator::Greater => ">",
            Comparator::LessOrEqual => "<=",
            Comparator::GreaterOrEqual => ">=",
            Comparator::Equal => "=",
        };
        f.write_str(op)
    }
}

impl Comparator {
    /// Evaluate `lhs <op> rhs`.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::Less => lhs < rhs,
            Comparator::Greater => lhs > rhs,
            Comparator::LessOrEqual => lhs <= rhs,
            Comparator::GreaterOrEqual => lhs >= rhs,
            Comparator::Equal => lhs == rhs,
        }
    }

    /// Evaluate against a cell; missing and non-numeric cells never match.
    pub fn matches(self, cell: &CellValue, value: f64) -> bool {
        cell.as_f64().is_some_and(|v| self.holds(v, value))
    }
}

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Return indices of rows whose cell satisfies `cell <comparator> value`.
pub fn rows_matching_value(cells: &[CellValue], comparator: Comparator, value: f64) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| comparator.matches(cell, value))
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of rows whose type label is one of `selected`.
///
/// Labels are compared in their display form, so a numeric-looking type such as `1`
/// still matches `"1"`. An empty selection selects nothing.
pub fn rows_matching_type(cells: &[CellValue], selected: &BTreeSet<String>) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.label().is_some_and(|s| selected.contains(&*s)))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// GrainTypes – one type or many
// ---------------------------------------------------------------------------

/// Anything accepted as a grain-type selection: a single type or a list of them.
pub trait GrainTypes {
    fn into_type_set(self) -> BTreeSet<String>;
}

impl GrainTypes for &str {
    fn into_type_set(self) -> BTreeSet<String> {
        BTreeSet::from([self.to_string()])
    }
}

impl GrainTypes for String {
    fn into_type_set(self) -> BTreeSet<String> {
        BTreeSet::from([self])
    }
}

impl GrainTypes for &String {
    fn into_type_set(self) -> BTreeSet<String> {
        BTreeSet::from([self.clone()])
    }
}

impl<S: AsRef<str>> GrainTypes for &[S] {
    fn into_type_set(self) -> BTreeSet<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> GrainTypes for [S; N] {
    fn into_type_set(self) -> BTreeSet<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> GrainTypes for Vec<S> {
    fn into_type_set(self) -> BTreeSet<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> GrainTypes for &Vec<S> {
    fn into_type_set(self) -> BTreeSet<String> {
        self.as_slice().into_type_set()
    }
}
