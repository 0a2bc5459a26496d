use std::path::PathBuf;

use delimited::csv::read_rows;
use delimited::Row;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn rows(name: &str) -> Vec<Row> {
    read_rows(data_path(name)).expect("read fixture")
}

#[test]
fn yields_one_row_per_record() {
    let rows = rows("people.csv");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].fields(), ["name", "age"]);
    assert_eq!(rows[1].fields(), ["Alice", "23"]);
    assert_eq!(rows[2].fields(), ["Bob", "thirty"]);
    assert_eq!(rows[3].fields(), ["Charlie", "25"]);
    assert_eq!(rows[4].fields(), ["Nim", "22"]);
}

#[test]
fn splits_on_commas_not_lines() {
    let rows = rows("good_parse.csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fields(), ["Tim", "Nelson", "CSCI 0320", "instructor"]);
    assert_eq!(rows[1].fields(), ["Nim", "Telson", "CSCI 0320", "student"]);
}

#[test]
fn quoted_commas_stay_in_one_field() {
    let rows = rows("name_with_commas.csv");
    assert_eq!(rows[0].fields(), ["name", "age", "email"]);
    assert_eq!(
        rows[1].fields(),
        ["the man, testing comma, comma man", "25", "the_man@brown.edu"]
    );
}

#[test]
fn empty_column_is_kept() {
    let rows = rows("empty_column.csv");
    assert_eq!(rows[0].fields(), ["Zach", "", "CSCI 0320", "Student"]);
}

#[test]
fn literal_quotes_inside_a_field() {
    let rows = rows("double_quotes.csv");
    assert_eq!(rows[0].fields(), ["Milos \"MJ\" Janjic", "20", "CS320"]);
}

#[test]
fn ending_comma_yields_trailing_empty_field() {
    let rows = rows("ending_comma.csv");
    assert_eq!(rows[0].fields(), ["Zach", "Quitkin", "2023", ""]);
}

#[test]
fn blank_line_separates_without_adding_a_row() {
    let rows = rows("newline.csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fields(), ["Zach", "Quitkin", "2023"]);
    assert_eq!(rows[1].fields(), ["Z_lined", "Q", "2023"]);
}

#[test]
fn quoted_newline_stays_in_one_field() {
    let rows = rows("quote_newline.csv");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields(), ["I am on\ntwo lines", "2022", "2020"]);
}

#[test]
fn thousands_separator_survives_quoting() {
    let rows = rows("thousand.csv");
    assert_eq!(rows[0].fields(), ["Number", "1,000"]);
}

#[test]
fn leading_whitespace_is_trimmed() {
    let rows = rows("leading.csv");
    assert_eq!(rows[0].fields(), ["Zach", "Quitkin"]);
}

#[test]
fn ending_whitespace_is_trimmed() {
    let rows = rows("ending.csv");
    assert_eq!(rows[0].fields(), ["Zach", "Quitkin"]);
}

#[test]
fn reparsing_yields_identical_rows() {
    assert_eq!(rows("people.csv"), rows("people.csv"));
}
