//! Tests for target-AFR table loading and lookup

use mafscale_core::error::ScaleError;
use mafscale_core::table::AfrTable;

fn square_table() -> AfrTable {
    AfrTable::new(
        vec![0.0, 10.0],
        vec![0.0, 10.0],
        vec![vec![0.0, 10.0], vec![10.0, 20.0]],
    )
    .unwrap()
}

#[test]
fn bilinear_center() {
    let table = square_table();
    assert!((table.lookup(5.0, 5.0) - 10.0).abs() < 1e-12);
}

#[test]
fn exact_reference_hit() {
    let table = square_table();
    assert!((table.lookup(0.0, 0.0) - 0.0).abs() < 1e-12);
    assert!((table.lookup(10.0, 0.0) - 10.0).abs() < 1e-12);
}

#[test]
fn top_right_edge_is_held_flat() {
    let table = square_table();
    // Beyond the last references both index pairs collapse, so the corner
    // value is returned unchanged.
    assert!((table.lookup(25.0, 25.0) - 20.0).abs() < 1e-12);
}

#[test]
fn below_min_stays_in_first_neighborhood() {
    // With equal-valued first columns the blend cannot leave the edge
    // value, however far below the reference range x goes.
    let table = AfrTable::new(
        vec![0.0, 10.0],
        vec![0.0, 10.0],
        vec![vec![7.0, 7.0], vec![9.0, 9.0]],
    )
    .unwrap();
    assert!((table.lookup(-100.0, 0.0) - 7.0).abs() < 1e-12);

    // Distinct columns extend the first segment linearly.
    let table = square_table();
    assert!((table.lookup(-5.0, 0.0) - (-5.0)).abs() < 1e-12);
}

#[test]
fn single_column_inverse_lookup() {
    let table = AfrTable::new(vec![1.0], vec![0.0, 100.0], vec![vec![10.0], vec![20.0]]).unwrap();
    // Degenerate column axis solves for the row coordinate whose cell
    // value matches y.
    assert!((table.lookup(0.0, 15.0) - 50.0).abs() < 1e-12);
}

#[test]
fn single_row_inverse_lookup() {
    let table = AfrTable::new(vec![0.0, 100.0], vec![5.0], vec![vec![10.0, 20.0]]).unwrap();
    assert!((table.lookup(15.0, 0.0) - 50.0).abs() < 1e-12);
}

#[test]
fn single_cell_is_constant() {
    let table = AfrTable::new(vec![1.0], vec![1.0], vec![vec![14.7]]).unwrap();
    assert!((table.lookup(-3.0, 900.0) - 14.7).abs() < 1e-12);
}

#[test]
fn parses_rows_with_leading_row_reference() {
    let content = "AFR Target\n\
                   0.2\t0.5\t0.8\n\
                   800\t14.7\t14.7\t13.0\n\
                   2400\t14.7\t13.5\t12.5\n\
                   4000\t13.8\t12.8\t11.8\n\
                   \n\
                   trailing notes are ignored\n";

    let table = AfrTable::from_str(content).unwrap();
    assert!((table.lookup(0.5, 2400.0) - 13.5).abs() < 1e-12);
}

#[test]
fn parses_rows_without_row_reference() {
    // Rows exactly as wide as the column reference line carry no leading
    // row value; the reference is taken as 0. Equal cells keep the single
    // row out of the inverse-lookup branch.
    let content = "Title\n\
                   0.2\t0.5\t0.8\n\
                   14.7\t14.7\t14.7\n";

    let table = AfrTable::from_str(content).unwrap();
    assert!((table.lookup(0.35, 0.0) - 14.7).abs() < 1e-12);
}

#[test]
fn ragged_row_is_invalid() {
    let content = "Title\n\
                   0.2\t0.5\t0.8\n\
                   800\t14.7\t14.0\t13.0\t12.0\n";

    let err = AfrTable::from_str(content).unwrap_err();
    assert!(matches!(err, ScaleError::InvalidInput(_)));
}

#[test]
fn junk_cell_reports_its_line() {
    let content = "Title\n\
                   0.2\t0.5\n\
                   800\tbogus\t13.0\n";

    let err = AfrTable::from_str(content).unwrap_err();
    assert!(matches!(err, ScaleError::ParseError { line: 3, .. }));
}

#[test]
fn table_file_round_trip() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "Title\n0.2\t0.5\n800\t14.7\t14.0\n2400\t13.5\t13.0\n"
    )
    .unwrap();

    let table = AfrTable::from_file(file.path()).unwrap();
    assert!((table.lookup(0.2, 800.0) - 14.7).abs() < 1e-12);
}
