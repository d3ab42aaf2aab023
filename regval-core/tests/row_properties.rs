//! Property tests for row-level guarantees: clean rows stay clean, a blanked
//! required column yields exactly one error, a short or long row yields
//! exactly one issue for its line.

use std::sync::Arc;

use futures::executor::block_on;
use proptest::prelude::*;
use regval_core::{
    EngineOptions, FieldDefinition, FieldType, Layout, LayoutRegistry, MemoryOrganizationStore,
    NewOrganization, OrganizationRole, OrganizationStore, Severity, ValidationEngine, Validator,
};

const HEADER: &str = "id,amount,booked_on,reference,channel";

fn layout() -> Layout {
    Layout::new(
        "Mixed",
        "1.0",
        vec![
            FieldDefinition::new("id", FieldType::Integer),
            FieldDefinition::new("amount", FieldType::Decimal),
            FieldDefinition::new("booked_on", FieldType::Date),
            FieldDefinition::new("reference", FieldType::String).with_max_length(10),
            FieldDefinition::new(
                "channel",
                FieldType::Enum {
                    allowed: vec!["APP".into(), "WEB".into(), "BRANCH".into()],
                },
            ),
        ],
    )
}

fn engine() -> (ValidationEngine, i64) {
    let mut registry = LayoutRegistry::new();
    registry
        .register(Validator::new("mixed", "TEST", layout()))
        .unwrap();
    let store = Arc::new(MemoryOrganizationStore::new());
    let org = block_on(store.create(NewOrganization {
        name: "Prop Bank".into(),
        role: OrganizationRole::ReportingInstitution,
        tax_id: "12345678000190".into(),
    }))
    .unwrap();
    (
        ValidationEngine::new(Arc::new(registry), store, EngineOptions::default()),
        org.id,
    )
}

fn valid_row() -> impl Strategy<Value = Vec<String>> {
    (
        any::<i64>(),
        (-1_000_000i64..1_000_000, 0u32..100),
        (1900i32..2100, 1u32..=12, 1u32..=28),
        "[A-Za-z0-9]{1,10}",
        prop::sample::select(vec!["APP", "WEB", "BRANCH"]),
    )
        .prop_map(|(id, (units, cents), (y, m, d), reference, channel)| {
            vec![
                id.to_string(),
                format!("{units}.{cents:02}"),
                format!("{y:04}-{m:02}-{d:02}"),
                reference,
                channel.to_string(),
            ]
        })
}

fn file_of(rows: &[Vec<String>]) -> String {
    let mut file = String::from(HEADER);
    file.push('\n');
    for row in rows {
        file.push_str(&row.join(","));
        file.push('\n');
    }
    file
}

proptest! {
    #[test]
    fn valid_rows_produce_no_issues(rows in prop::collection::vec(valid_row(), 1..20)) {
        let (engine, org) = engine();
        let result = block_on(engine.validate_bytes(org, "mixed", file_of(&rows).as_bytes())).unwrap();
        prop_assert!(result.issues.is_empty(), "{:?}", result.issues);
        prop_assert_eq!(result.rows_processed, rows.len() as u64);
    }

    #[test]
    fn blank_required_column_is_exactly_one_error(
        row in valid_row(),
        column in 0usize..5,
    ) {
        let (engine, org) = engine();
        let mut row = row;
        row[column] = String::new();
        let result = block_on(engine.validate_bytes(org, "mixed", file_of(&[row]).as_bytes())).unwrap();

        let expected_column = layout().fields[column].name.clone();
        prop_assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        prop_assert_eq!(issue.severity, Severity::Error);
        prop_assert_eq!(issue.line_number, Some(1));
        prop_assert_eq!(issue.column_name.as_deref(), Some(expected_column.as_str()));
        prop_assert_eq!(issue.message.as_str(), "missing required value");
    }

    #[test]
    fn misaligned_row_is_exactly_one_issue(
        rows in prop::collection::vec(valid_row(), 2..10),
        bad_index in 0usize..10,
        keep in 1usize..5,
        extra in prop::collection::vec("[a-z]{0,4}", 0..4),
    ) {
        let (engine, org) = engine();
        let bad_index = bad_index % rows.len();
        let mut rows = rows;
        if extra.is_empty() {
            rows[bad_index].truncate(keep);
        } else {
            rows[bad_index].extend(extra);
        }
        let found = rows[bad_index].len();
        let result = block_on(engine.validate_bytes(org, "mixed", file_of(&rows).as_bytes())).unwrap();

        prop_assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
        let issue = &result.issues[0];
        prop_assert_eq!(issue.line_number, Some(bad_index as u64 + 1));
        prop_assert_eq!(issue.column_name.as_deref(), None);
        prop_assert_eq!(issue.message.clone(), format!("expected 5 columns, found {found}"));
        prop_assert_eq!(result.rows_processed, rows.len() as u64);
    }
}
