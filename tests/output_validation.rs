//! Output Validation Tests
//!
//! Checks the console-facing contracts that every operation relies on:
//! - Rendered tables keep header, divider and rows the same width
//! - Every catalogued table renders with its full column list
//! - Statements only ever interpolate catalogued identifiers
//! - Error codes and messages stay stable

use pretty_assertions::assert_eq;

use partsdesk::output::{self, CELL_SEPARATOR};
use partsdesk::query;
use partsdesk::validate::validate;
use partsdesk::{Catalog, Condition, DeskError, ResultGrid};

fn line_widths(rendered: &str) -> Vec<usize> {
    rendered.lines().take_while(|l| !l.is_empty()).map(|l| l.chars().count()).collect()
}

// ============================================================================
// Table rendering
// ============================================================================

#[test]
fn test_rendered_lines_share_one_width() {
    let grid = ResultGrid::new(
        vec!["id".into(), "name".into(), "country".into()],
        vec![
            vec!["1".into(), "Texas Instruments".into(), "USA".into()],
            vec!["12".into(), "Ангстрем".into(), "Россия".into()],
            vec!["3".into(), String::new(), String::new()],
        ],
    );
    let rendered = output::render(&grid);

    let widths = line_widths(&rendered);
    assert_eq!(widths.len(), 5);
    assert!(widths.iter().all(|w| *w == widths[0]), "ragged lines: {widths:?}\n{rendered}");
    assert!(rendered.ends_with("\n\nFound records: 3\n"));
}

#[test]
fn test_every_catalog_table_renders_its_columns() {
    let catalog = Catalog::inventory().unwrap();
    for table in catalog.tables() {
        let grid = ResultGrid::new(table.columns().to_vec(), Vec::new());
        let rendered = output::render(&grid);
        let header = rendered.lines().next().unwrap_or_default();

        let names: Vec<&str> = header.split(CELL_SEPARATOR).map(str::trim_end).collect();
        assert_eq!(names, table.columns().iter().map(String::as_str).collect::<Vec<_>>());
        assert!(rendered.ends_with("Found records: 0\n"), "{}", table.name());
    }
}

#[test]
fn test_null_cells_render_as_blank() {
    let grid = ResultGrid::new(vec!["id".into(), "description".into()], vec![vec!["1".into()]]);
    assert_eq!(
        output::render_rows(&grid),
        format!("id | description\n---+------------\n1  | {}\n", " ".repeat(11))
    );
}

// ============================================================================
// Statement text
// ============================================================================

#[test]
fn test_operator_values_never_reach_sql_text() {
    let catalog = Catalog::inventory().unwrap();
    let components = catalog.table("components").unwrap();
    let value = validate("Резистор 10 кОм", "name").unwrap();

    let filter = query::filter(components, &[Condition::new("name", value.clone())]);
    assert!(!filter.sql.contains("Резистор"));
    assert_eq!(filter.params, vec!["Резистор 10 кОм".to_string()]);

    let update = query::update(components, "name", &value, &[validate("7", "price").unwrap()]);
    assert!(!update.sql.contains("Резистор"));
    assert_eq!(update.params_json(), r#"["Резистор 10 кОм","7"]"#);
}

#[test]
fn test_insert_uses_data_columns_for_every_table() {
    let catalog = Catalog::inventory().unwrap();
    for table in catalog.tables() {
        let values: Vec<_> =
            table.data_columns().iter().map(|c| validate("1", c).unwrap()).collect();
        let statement = query::insert(table, &values);

        assert!(statement.sql.starts_with(&format!("INSERT INTO {} (", table.name())));
        assert!(!statement.sql.contains("(id"), "{}", statement.sql);
        assert_eq!(statement.params.len(), table.data_columns().len());
        assert!(statement.sql.ends_with(&format!("${})", values.len())));
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_all_error_codes_are_consistent() {
    let errors = vec![
        (DeskError::invalid_characters("name"), "INVALID_CHARACTERS"),
        (DeskError::not_a_number("price"), "NOT_A_NUMBER"),
        (DeskError::invalid_menu_choice("enter a number from 0 to 5"), "INVALID_MENU_CHOICE"),
        (DeskError::connection_failed("refused"), "CONNECTION_FAILED"),
        (DeskError::execution_error("syntax"), "EXECUTION_ERROR"),
        (DeskError::NoMatchingRows, "NO_MATCHING_ROWS"),
        (DeskError::config_error("DB_PORT"), "CONFIG_ERROR"),
    ];

    for (error, code) in errors {
        assert_eq!(error.error_code(), code);
        assert!(!error.message().is_empty());
        // Hard errors are echoed to the console by the session log
        let echoed = partsdesk::logging::is_error_message(&error.message());
        assert_eq!(echoed, code != "NO_MATCHING_ROWS", "{code}");
    }
}
