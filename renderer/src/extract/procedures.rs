//! Stored-procedure profiling from `@Statistics PROCEDUREPROFILE` and
//! `@Statistics PROCEDUREDETAIL`.
//!
//! Execution-time columns arrive in nanoseconds and are surfaced in
//! milliseconds.

use common::models::metrics::{ProcedureDetail, ProcedureProfile};
use common::response::ResultTable;
use common::utils::nanos_to_millis;

use crate::columns::ColumnMap;

pub fn extract_profile(table: &ResultTable, target: &mut Vec<ProcedureProfile>) {
    let columns = ColumnMap::resolve(
        table,
        &[
            "PROCEDURE",
            "INVOCATIONS",
            "MIN",
            "MAX",
            "AVG",
            "WEIGHTED_PERC",
            "ABORTS",
            "FAILURES",
        ],
    );
    for row in &table.data {
        let Some(procedure) = columns.string(row, "PROCEDURE") else {
            continue;
        };
        target.push(ProcedureProfile {
            procedure,
            invocations: columns.i64(row, "INVOCATIONS").unwrap_or_default(),
            min_latency: nanos_to_millis(columns.f64(row, "MIN").unwrap_or_default()),
            max_latency: nanos_to_millis(columns.f64(row, "MAX").unwrap_or_default()),
            avg_latency: nanos_to_millis(columns.f64(row, "AVG").unwrap_or_default()),
            weighted_perc: columns.f64(row, "WEIGHTED_PERC").unwrap_or_default(),
            aborts: columns.i64(row, "ABORTS").unwrap_or_default(),
            failures: columns.i64(row, "FAILURES").unwrap_or_default(),
        });
    }
}

pub fn extract_detail(table: &ResultTable, target: &mut Vec<ProcedureDetail>) {
    let columns = ColumnMap::resolve(
        table,
        &[
            "PROCEDURE",
            "STATEMENT",
            "INVOCATIONS",
            "MIN_EXECUTION_TIME",
            "MAX_EXECUTION_TIME",
            "AVG_EXECUTION_TIME",
        ],
    );
    for row in &table.data {
        let Some(procedure) = columns.string(row, "PROCEDURE") else {
            continue;
        };
        target.push(ProcedureDetail {
            procedure,
            statement: columns.string(row, "STATEMENT").unwrap_or_default(),
            invocations: columns.i64(row, "INVOCATIONS").unwrap_or_default(),
            min_latency: nanos_to_millis(
                columns.f64(row, "MIN_EXECUTION_TIME").unwrap_or_default(),
            ),
            max_latency: nanos_to_millis(
                columns.f64(row, "MAX_EXECUTION_TIME").unwrap_or_default(),
            ),
            avg_latency: nanos_to_millis(
                columns.f64(row, "AVG_EXECUTION_TIME").unwrap_or_default(),
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_converts_nanoseconds_to_milliseconds() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "PROCEDURE", "type": 9},
                {"name": "INVOCATIONS", "type": 6},
                {"name": "MIN", "type": 6},
                {"name": "MAX", "type": 6},
                {"name": "AVG", "type": 6},
                {"name": "WEIGHTED_PERC", "type": 6}
            ],
            "data": [["InsertOrder", 1000, 1500000, 30000000, 4200000, 88.5]]
        }))
        .unwrap();

        let mut profile = Vec::new();
        extract_profile(&table, &mut profile);

        assert_eq!(profile[0].procedure, "InsertOrder");
        assert_eq!(profile[0].min_latency, 1.5);
        assert_eq!(profile[0].max_latency, 30.0);
        assert_eq!(profile[0].avg_latency, 4.2);
    }

    #[test]
    fn detail_keeps_statement_granularity() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "STATEMENT", "type": 9},
                {"name": "PROCEDURE", "type": 9},
                {"name": "INVOCATIONS", "type": 6},
                {"name": "MIN_EXECUTION_TIME", "type": 6},
                {"name": "MAX_EXECUTION_TIME", "type": 6},
                {"name": "AVG_EXECUTION_TIME", "type": 6}
            ],
            "data": [
                ["sql0", "InsertOrder", 10, 1000000, 2000000, 1500000],
                ["sql1", "InsertOrder", 10, 2000000, 4000000, 3000000]
            ]
        }))
        .unwrap();

        let mut detail = Vec::new();
        extract_detail(&table, &mut detail);
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[1].statement, "sql1");
        assert_eq!(detail[1].avg_latency, 3.0);
    }
}
