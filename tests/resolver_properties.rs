//! End-to-end behaviour of the query resolver on small tables.

use tabular_qa::resolver::{classify_columns, match_column, normalize, UNRECOGNIZED_QUERY_ANSWER};
use tabular_qa::{resolve, Cell, Column, Intent, Table};

fn sales_only() -> Table {
    Table::new(vec![Column::numeric("Sales", [10.0, 20.0, 20.0, 5.0])]).unwrap()
}

fn regional_sales() -> Table {
    Table::new(vec![
        Column::categorical("Region", ["A", "B", "C"]),
        Column::numeric("Sales", [20.0, 20.0, 5.0]),
    ])
    .unwrap()
}

#[test]
fn test_total_and_average_sales() {
    let table = sales_only();

    let total = resolve("total sales", &table).unwrap();
    assert_eq!(total.intent, Some(Intent::Sum));
    assert_eq!(total.answer, "Total Sales: 55");

    let average = resolve("average sales", &table).unwrap();
    assert_eq!(average.intent, Some(Intent::Average));
    assert_eq!(average.answer, "Average Sales: 13.75");
}

#[test]
fn test_priority_order_wins_over_token_order() {
    let table = sales_only();
    assert_eq!(resolve("total and average", &table).unwrap().intent, Some(Intent::Sum));
    assert_eq!(resolve("average and total", &table).unwrap().intent, Some(Intent::Sum));
}

#[test]
fn test_matcher_falls_back_to_first_numeric_column() {
    let table = Table::new(vec![
        Column::numeric("Price", [1.0]),
        Column::numeric("Qty", [2.0]),
    ])
    .unwrap();
    let classes = classify_columns(&table);
    let matched = match_column(&normalize("show data"), &classes.numeric).unwrap();
    assert_eq!(matched.name(), "Price");
}

#[test]
fn test_count_ignores_columns() {
    let with_numbers = sales_only();
    let text_only = Table::new(vec![Column::categorical("Name", ["a", "b"])]).unwrap();

    assert_eq!(resolve("How many rows?", &with_numbers).unwrap().answer, "4 rows");
    let result = resolve("number of rows", &text_only).unwrap();
    assert_eq!(result.answer, "2 rows");
    assert_eq!(result.intent, Some(Intent::Count));
}

#[test]
fn test_highest_reports_every_tied_row() {
    let result = resolve("highest sales", &regional_sales()).unwrap();
    assert_eq!(result.intent, Some(Intent::Max));
    assert!(result.answer.contains("20"));
    assert!(result.answer.contains('A') && result.answer.contains('B'));
    assert!(!result.answer.contains("C,") && !result.answer.contains(", C"));

    let details = result.details.expect("extremal rows are returned");
    let regions: Vec<_> = details.iter().map(|r| r.get("Region").cloned()).collect();
    assert_eq!(
        regions,
        vec![Some(Cell::Text("A".into())), Some(Cell::Text("B".into()))]
    );
    assert_eq!(details[0].get("Sales"), Some(&Cell::Number(20.0)));
}

#[test]
fn test_lowest_single_row() {
    let result = resolve("lowest sales", &regional_sales()).unwrap();
    assert_eq!(result.answer, "Region(s) [C] have lowest Sales = 5");
    assert_eq!(result.details.unwrap().len(), 1);
}

#[test]
fn test_no_numeric_column_is_a_normal_result() {
    let table = Table::new(vec![
        Column::categorical("Product", ["x", "y"]),
        Column::categorical("Region", ["A", "B"]),
    ])
    .unwrap();
    let result = resolve("average price", &table).unwrap();
    assert_eq!(result.answer, "No numeric column found for average.");
    assert!(result.error.is_none());
    assert!(result.details.is_none());
}

#[test]
fn test_unknown_intent_has_suggestion_and_no_type() {
    let result = resolve("hello there", &sales_only()).unwrap();
    assert_eq!(result.intent, None);
    assert_eq!(result.answer, UNRECOGNIZED_QUERY_ANSWER);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("type").is_none());
    assert_eq!(json["query"], "hello there");
}

#[test]
fn test_zero_row_table_does_not_fail() {
    let empty = Table::new(vec![
        Column::categorical("Region", Vec::<&str>::new()),
        Column::numeric("Sales", Vec::<f64>::new()),
    ])
    .unwrap();

    let highest = resolve("highest sales", &empty).unwrap();
    assert_eq!(highest.answer, "No numeric data in column Sales for maximum.");
    assert!(highest.details.is_none());

    assert_eq!(resolve("how many rows", &empty).unwrap().answer, "0 rows");
    assert_eq!(resolve("total sales", &empty).unwrap().answer, "Total Sales: 0");
}

#[test]
fn test_named_column_beats_fallback() {
    let table = Table::new(vec![
        Column::categorical("Store", ["s1", "s2"]),
        Column::numeric("Units", [3.0, 9.0]),
        Column::numeric("Revenue ($)", [100.0, 50.0]),
    ])
    .unwrap();
    let result = resolve("Which store has the highest revenue?", &table).unwrap();
    assert_eq!(result.answer, "Store(s) [s1] have highest Revenue ($) = 100");
}

#[test]
fn test_query_is_echoed_lowercase() {
    let result = resolve("TOTAL Sales", &sales_only()).unwrap();
    assert_eq!(result.query, "total sales");
}

#[test]
fn test_column_name_containing_keyword_still_follows_priority() {
    let table = Table::new(vec![Column::numeric("minimum_total", [4.0, 6.0])]).unwrap();
    let result = resolve("minimum_total", &table).unwrap();
    assert_eq!(result.intent, Some(Intent::Sum));
    assert_eq!(result.answer, "Total minimum_total: 10");
}
