//! Row pipeline: header once, then every data row through the parser.
//!
//! Rows are independent. In parallel mode they are spread over the rayon
//! pool; either way results come back in item order, and a failing row only
//! contributes its own problems to the report.

use crate::reader::{CsvSource, SourceRow};
use kgcsv_core::{
    CsvError, CsvHeader, CsvSchema, ProblemDetail, SchemaBasedCsvRecordParser, TypedCsvRecord,
};
use rayon::prelude::*;
use serde::Serialize;

/// A single problem located in the source. `item_number` is `None` for
/// problems in the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowProblem {
    pub item_number: Option<u64>,
    pub line_number: u64,
    pub problem: ProblemDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub headers: Vec<CsvHeader>,
    pub records: Vec<TypedCsvRecord>,
    pub problems: Vec<RowProblem>,
    pub rows_read: u64,
}

impl ImportReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn header_failed(&self) -> bool {
        self.problems.iter().any(|p| p.item_number.is_none())
    }

    pub fn valid_rows(&self) -> usize {
        self.records.len()
    }

    /// Number of data rows with at least one problem.
    pub fn invalid_rows(&self) -> usize {
        let mut items: Vec<u64> = self.problems.iter().filter_map(|p| p.item_number).collect();
        items.dedup();
        items.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    parser: SchemaBasedCsvRecordParser<'a>,
    parallel: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(schema: &'a CsvSchema) -> Self {
        Self {
            parser: SchemaBasedCsvRecordParser::new(schema),
            parallel: true,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(&self, source: &CsvSource) -> ImportReport {
        let mut report = ImportReport {
            rows_read: source.rows.len() as u64,
            ..ImportReport::default()
        };

        let headers = match self.parser.parse_header(&source.header) {
            Ok(headers) => headers,
            Err(err) => {
                report.problems = located(err, None, source.header_line);
                tracing::warn!(
                    problems = report.problems.len(),
                    "csv header invalid, rows skipped"
                );
                return report;
            }
        };

        let outcomes: Vec<Result<TypedCsvRecord, Vec<RowProblem>>> = if self.parallel {
            source
                .rows
                .par_iter()
                .map(|row| self.parse_row(row, &headers))
                .collect()
        } else {
            source
                .rows
                .iter()
                .map(|row| self.parse_row(row, &headers))
                .collect()
        };

        for outcome in outcomes {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(problems) => report.problems.extend(problems),
            }
        }
        report.headers = headers;

        if report.is_valid() {
            tracing::info!(rows = report.rows_read, "csv import validated");
        } else {
            tracing::warn!(
                rows = report.rows_read,
                invalid_rows = report.invalid_rows(),
                problems = report.problems.len(),
                "csv import has invalid rows"
            );
        }
        report
    }

    fn parse_row(
        &self,
        row: &SourceRow,
        headers: &[CsvHeader],
    ) -> Result<TypedCsvRecord, Vec<RowProblem>> {
        self.parser
            .parse_record(&row.values, row.record_row(), headers)
            .map(|values| TypedCsvRecord {
                item_number: row.item_number,
                line_number: row.line_number,
                values,
            })
            .map_err(|err| {
                tracing::debug!(item = row.item_number, error = %err, "row rejected");
                located(err, Some(row.item_number), row.line_number)
            })
    }
}

fn located(err: CsvError, item_number: Option<u64>, line_number: u64) -> Vec<RowProblem> {
    err.problems()
        .into_iter()
        .map(|problem| RowProblem {
            item_number,
            line_number,
            problem,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_csv, CsvReadOptions};
    use kgcsv_core::schemes::paper_csv;

    fn source(input: &str) -> CsvSource {
        read_csv(input.as_bytes(), &CsvReadOptions::default()).unwrap()
    }

    #[test]
    fn valid_source_yields_records() {
        let schema = paper_csv().unwrap();
        let report = Pipeline::new(&schema).run(&source(
            "paper:title,paper:publication_year\nFirst,2020\nSecond,2021\n",
        ));
        assert!(report.is_valid());
        assert_eq!(report.headers.len(), 2);
        assert_eq!(report.valid_rows(), 2);
        assert_eq!(report.records[1].item_number, 2);
        assert_eq!(report.records[1].line_number, 3);
    }

    #[test]
    fn header_failure_skips_rows() {
        let schema = paper_csv().unwrap();
        let report = Pipeline::new(&schema).run(&source("paper:subtitle,nope:x\nA,B\n"));
        assert!(report.header_failed());
        assert!(report.records.is_empty());
        assert_eq!(report.problems.len(), 2);
        assert_eq!(report.rows_read, 1);
    }

    #[test]
    fn problems_are_located_per_cause() {
        let schema = paper_csv().unwrap();
        let report = Pipeline::new(&schema).parallel(false).run(&source(
            "paper:title,paper:publication_year,paper:publication_month\n\
             ok,2020,1\n\
             bad,twenty,13\n\
             short\n",
        ));
        assert_eq!(report.valid_rows(), 1);
        assert_eq!(report.invalid_rows(), 2);
        let located: Vec<_> = report
            .problems
            .iter()
            .map(|p| (p.item_number, p.line_number, p.problem.problem_type.as_str()))
            .collect();
        assert_eq!(
            located,
            vec![
                (Some(2), 3, "kgcsv:problem:invalid_csv_value"),
                (Some(2), 3, "kgcsv:problem:invalid_csv_value"),
                (Some(3), 4, "kgcsv:problem:inconsistent_csv_column_count"),
            ]
        );
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let schema = paper_csv().unwrap();
        let mut input = String::from("paper:title,paper:publication_year\n");
        for i in 0..500 {
            if i % 7 == 0 {
                input.push_str(&format!("row {i},year {i}\n"));
            } else {
                input.push_str(&format!("row {i},{}\n", 1900 + i));
            }
        }
        let source = source(&input);
        let parallel = Pipeline::new(&schema).parallel(true).run(&source);
        let sequential = Pipeline::new(&schema).parallel(false).run(&source);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.invalid_rows(), 72);
    }
}
