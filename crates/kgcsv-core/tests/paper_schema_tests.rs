use kgcsv_core::schemes::paper_csv;
use kgcsv_core::{CsvError, SchemaBasedCsvRecordParser, TypeId, TypedValue};

fn typed(namespace: Option<&str>, value: &str, ty: TypeId) -> TypedValue {
    TypedValue::new(namespace.map(str::to_string), Some(value.to_string()), ty)
}

#[test]
fn doi_column_is_validated() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser.parse_header(&["paper:title", "paper:doi"]).unwrap();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers[1].key(), "paper:doi");

    let values = parser
        .parse_record(&["Some Title", "10.1000/182"], 2, &headers)
        .unwrap();
    assert_eq!(
        values,
        vec![
            typed(None, "Some Title", TypeId::STRING),
            typed(None, "10.1000/182", TypeId::STRING),
        ]
    );

    let err = parser
        .parse_record(&["Some Title", "not-a-doi"], 3, &headers)
        .unwrap_err();
    let causes = err.into_causes();
    assert_eq!(causes.len(), 1);
    assert!(
        matches!(&causes[0], CsvError::InvalidValue { value, row: 3, column: 2, .. } if value == "not-a-doi"),
        "{causes:?}"
    );
}

#[test]
fn resource_values_are_not_membership_checked() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser.parse_header(&["orkg:P32"]).unwrap();
    let values = parser.parse_record(&["resource:R123"], 2, &headers).unwrap();
    assert_eq!(values, vec![typed(Some("resource"), "R123", TypeId::RESOURCE)]);
}

#[test]
fn orkg_values_must_be_thing_ids() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser.parse_header(&["orkg:P32"]).unwrap();

    let values = parser.parse_record(&["orkg:R12"], 2, &headers).unwrap();
    assert_eq!(values, vec![typed(Some("orkg"), "R12", TypeId::RESOURCE)]);

    let err = parser
        .parse_record(&["orkg:not an id"], 2, &headers)
        .unwrap_err();
    assert!(matches!(
        err.into_causes().as_slice(),
        [CsvError::InvalidValue { column: 1, .. }]
    ));
}

#[test]
fn duplicate_paper_titles_are_reported_once() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let err = parser
        .parse_header(&["paper:title", "paper:title", "orkg:P32", "orkg:P32"])
        .unwrap_err();
    let CsvError::DuplicateHeaders { duplicates } = err else {
        panic!("expected duplicate headers, got {err:?}");
    };
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates["paper:title"], vec![1, 2]);
}

#[test]
fn column_count_mismatch_yields_no_values() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser.parse_header(&["a", "b", "c"]).unwrap();
    assert_eq!(
        parser.parse_record(&["1", "2"], 4, &headers),
        Err(CsvError::InconsistentColumnCount {
            actual: 2,
            expected: 3,
            row: 4,
        })
    );
}

#[test]
fn absolute_iris_are_column_labels() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser
        .parse_header(&["https://example.org/predicate", "paper:url"])
        .unwrap();
    assert_eq!(headers[0].namespace, None);
    assert_eq!(headers[0].name, "https://example.org/predicate");

    let values = parser
        .parse_record(&["plain text", "https://doi.org/10.1000/182"], 2, &headers)
        .unwrap();
    assert_eq!(values[1], typed(None, "https://doi.org/10.1000/182", TypeId::URI));
}

#[test]
fn predicate_headers_must_be_ids() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let err = parser.parse_header(&["orkg:has part"]).unwrap_err();
    assert!(matches!(
        err.into_causes().as_slice(),
        [CsvError::InvalidValue { row: 1, column: 1, .. }]
    ));
}

#[test]
fn paper_fields_enforce_their_constraints() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser
        .parse_header(&[
            "paper:title",
            "paper:publication_month",
            "paper:publication_year",
            "paper:research_field",
            "contribution:extraction_method",
        ])
        .unwrap();
    assert_eq!(headers[1].column_type, Some(TypeId::INTEGER));
    assert_eq!(headers[3].column_type, Some(TypeId::RESOURCE));

    let ok = parser.parse_record(&["T", "7", "2021", "R11", "manual"], 2, &headers);
    assert!(ok.is_ok(), "{ok:?}");

    let err = parser
        .parse_record(&["T", "13", "twenty", "R11", "SEMI"], 3, &headers)
        .unwrap_err();
    let columns: Vec<_> = err.into_causes().iter().filter_map(CsvError::column).collect();
    assert_eq!(columns, vec![2, 3, 5]);
}

#[test]
fn value_type_conflicting_with_paper_field_is_rejected() {
    let schema = paper_csv().unwrap();
    let parser = SchemaBasedCsvRecordParser::new(&schema);
    let headers = parser.parse_header(&["paper:publication_year"]).unwrap();
    let err = parser
        .parse_record(&["2021<text>"], 2, &headers)
        .unwrap_err();
    assert_eq!(
        err.into_causes(),
        vec![CsvError::UnexpectedValueType {
            actual: TypeId::STRING,
            expected: TypeId::INTEGER,
            row: 2,
            column: 1,
        }]
    );
}
