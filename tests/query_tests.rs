//! End-to-end queries against a 10-grain PGD fixture.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use stardust::{CellValue, Comparator, DataSource, MissingErrors, StarDust, StarDustError};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pgd_sic_fixture.csv")
}

fn load() -> StarDust {
    StarDust::from_path(fixture_path()).unwrap()
}

fn ids(sd: &StarDust) -> Vec<String> {
    sd.table().index().iter().map(CellValue::to_string).collect()
}

#[test]
fn test_mainstream_scenario() {
    let mut sd = load();
    assert_eq!(sd.len(), 10);

    sd.filter_type("M").unwrap();
    assert_eq!(ids(&sd), ["SiC-01", "SiC-03", "SiC-05", "SiC-07"]);

    sd.filter_value(0.1, "Si-29", "Si-28", ">", false).unwrap();
    assert_eq!(sd.len(), 2);

    let (x, y, xerr, yerr) = sd
        .return_ratios(("Si-29", "Si-28"), ("Si-30", "Si-28"))
        .unwrap()
        .into_tuple();
    assert_eq!(x, vec![0.121, 0.145]);
    assert_eq!(y, vec![0.078, 0.091]);
    assert_eq!(xerr, vec![0.004, 0.005]);
    assert_eq!(yerr, vec![0.003, 0.004]);

    sd.reset();
    assert_eq!(sd.len(), 10);
    assert_eq!(sd.table(), sd.backup());
}

#[test]
fn test_every_remaining_row_satisfies_predicate() {
    let comparators = ["<", ">", "<=", "=<", ">=", "=>", "="];
    for value in [0.05, 0.099, 0.1, 0.2] {
        for text in comparators {
            let mut sd = load();
            sd.filter_value(value, "Si-29", "Si-28", text, false).unwrap();

            let op: Comparator = text.parse().unwrap();
            let before = load();
            let expected: Vec<CellValue> = before
                .table()
                .column("29Si/28Si")
                .unwrap()
                .iter()
                .zip(before.table().index())
                .filter(|(cell, _)| op.matches(cell, value))
                .map(|(_, id)| id.clone())
                .collect();
            assert_eq!(sd.table().index(), expected.as_slice(), "{text} {value}");
        }
    }
}

#[test]
fn test_consecutive_filters_intersect() {
    let mut chained = load();
    chained.filter_value(0.05, "Si-29", "Si-28", ">=", false).unwrap();
    chained.filter_value(0.04, "Si-30", "Si-28", "<", false).unwrap();

    let both = load();
    let si29 = both.table().column("29Si/28Si").unwrap();
    let si30 = both.table().column("30Si/28Si").unwrap();
    let expected: Vec<String> = (0..both.len())
        .filter(|&r| {
            Comparator::GreaterOrEqual.matches(&si29[r], 0.05)
                && Comparator::Less.matches(&si30[r], 0.04)
        })
        .map(|r| both.table().index()[r].to_string())
        .collect();

    assert_eq!(ids(&chained), expected);
    assert_eq!(ids(&chained), ["SiC-01", "SiC-04", "SiC-08"]);
}

#[test]
fn test_reset_after_many_filters() {
    let mut sd = load();
    let original = sd.table().clone();

    sd.filter_type(["M", "X"]).unwrap();
    sd.filter_value(0.003, "Si-29", "Si-28", "=>", true).unwrap();
    sd.filter_type("Q").unwrap();
    assert!(sd.is_empty());

    sd.reset();
    assert_eq!(sd.table(), &original);
    sd.reset();
    assert_eq!(sd.table(), &original);
}

#[test]
fn test_single_type_equals_list() {
    let mut single = load();
    single.filter_type("M").unwrap();

    let mut list = load();
    list.filter_type(vec!["M".to_string()]).unwrap();

    let mut slice = load();
    slice.filter_type(&["M"][..]).unwrap();

    assert_eq!(single.table(), list.table());
    assert_eq!(single.table(), slice.table());
}

#[test]
fn test_return_ratios_complete_rows_only() {
    let sd = load();
    let series = sd
        .return_ratios(("Si-29", "Si-28"), ("Si-30", "Si-28"))
        .unwrap();
    assert_eq!(series.len(), 9);
    for v in [&series.x, &series.y, &series.x_err, &series.y_err] {
        assert_eq!(v.len(), 9);
        assert!(v.iter().all(|x| !x.is_nan()));
    }

    let kept = sd
        .return_ratios_with(("Si-29", "Si-28"), ("Si-30", "Si-28"), MissingErrors::Keep)
        .unwrap();
    assert_eq!(kept.len(), 10);
    assert_eq!(kept.x[9], 0.049);
    assert!(kept.x_err[9].is_nan());
}

#[test]
fn test_errors_leave_state_untouched() {
    let mut sd = load();
    sd.filter_type("M").unwrap();

    assert!(matches!(
        sd.filter_value(0.1, "Si-29", "Si-28", "!=", false),
        Err(StarDustError::InvalidArgument(_))
    ));
    assert!(matches!(
        sd.filter_value(0.1, "C-12", "C-13", ">", false),
        Err(StarDustError::ColumnNotFound { .. })
    ));
    assert!(matches!(
        sd.filter_value(0.1, "Si29", "Si-28", ">", false),
        Err(StarDustError::Format { .. })
    ));
    assert!(matches!(
        sd.return_ratios(("C-12", "C-13"), ("Si-30", "Si-28")),
        Err(StarDustError::ColumnNotFound { .. })
    ));
    assert_eq!(sd.len(), 4);
}

#[test]
fn test_padded_comparator_is_rejected() {
    let mut sd = load();
    for text in [" > ", " >", "> ", "\t<="] {
        assert!(
            matches!(
                sd.filter_value(0.1, "Si-29", "Si-28", text, false),
                Err(StarDustError::InvalidArgument(_))
            ),
            "{text:?}"
        );
    }
    assert_eq!(sd.len(), 10);
}

#[test]
fn test_header_ratio_on_fixture() {
    let sd = load();
    let found = sd.header_ratio("Si-30", "Si-28").unwrap().unwrap();
    assert_eq!(found.name, "30Si/28Si");
    assert!(!found.is_delta);
    assert_eq!(sd.header_ratio("Si-28", "Si-30").unwrap(), None);
}

#[test]
fn test_load_errors() {
    let missing = StarDust::from_path("/nonexistent/PGD_SiC.csv").unwrap_err();
    assert!(matches!(missing, StarDustError::Load { .. }));

    let source = DataSource {
        data_dir: fixture_path().parent().unwrap().to_path_buf(),
        file_name: "pgd_sic_fixture.csv".into(),
    };
    assert_eq!(StarDust::from_source(&source).unwrap().len(), 10);
}
