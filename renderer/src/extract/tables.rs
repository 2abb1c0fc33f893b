//! Table row statistics, schema catalog, and export-stream aggregation.

use std::collections::HashMap;

use common::models::catalog::{
    ColumnCatalogEntry, IndexStats, ProcedureCatalogEntry, RelationKind, SchemaCatalog,
    TableCatalogEntry,
};
use common::models::metrics::{ExporterStats, TableStats};
use common::response::ResultTable;

use crate::columns::ColumnMap;

/// Folds `@Statistics TABLE` rows into per-table row-count aggregates.
///
/// Rows arrive once per (host, site, partition). Replicated tables report
/// the same partition from every host, so a table whose rows all share one
/// partition id is classified as replicated; its tuple count is that single
/// partition's. Partitioned tables sum across distinct partitions.
pub fn extract_stats(table: &ResultTable, target: &mut HashMap<String, TableStats>) {
    let columns = ColumnMap::resolve(
        table,
        &["TABLE_NAME", "PARTITION_ID", "TUPLE_COUNT", "TABLE_TYPE"],
    );

    let mut partitions: HashMap<String, HashMap<i64, i64>> = HashMap::new();
    let mut kinds: HashMap<String, String> = HashMap::new();
    for row in &table.data {
        let Some(name) = columns.string(row, "TABLE_NAME") else {
            continue;
        };
        let partition = columns.i64(row, "PARTITION_ID").unwrap_or_default();
        let tuples = columns.i64(row, "TUPLE_COUNT").unwrap_or_default();
        let per_partition = partitions.entry(name.clone()).or_default();
        let entry = per_partition.entry(partition).or_insert(tuples);
        *entry = (*entry).max(tuples);
        if let Some(kind) = columns.string(row, "TABLE_TYPE") {
            kinds.insert(name, kind);
        }
    }

    for (name, per_partition) in partitions {
        let counts: Vec<i64> = per_partition.values().copied().collect();
        let partition_count = counts.len();
        let min = counts.iter().min().copied().unwrap_or_default();
        let max = counts.iter().max().copied().unwrap_or_default();
        let sum: i64 = counts.iter().sum();
        let avg = if partition_count > 0 {
            sum / partition_count as i64
        } else {
            0
        };
        let kind = kinds.get(&name).map(String::as_str).unwrap_or_default();
        let table_type = if kind == "StreamedTable" {
            "Stream"
        } else if partition_count == 1 {
            "Replicated"
        } else {
            "Partitioned"
        };
        let tuple_count = if table_type == "Partitioned" { sum } else { max };

        target.insert(
            name.clone(),
            TableStats {
                table_name: name,
                table_type: table_type.to_string(),
                min_rows: min,
                max_rows: max,
                avg_rows: avg,
                tuple_count,
                partition_count,
            },
        );
    }
}

/// Seeds catalog entries from `@SystemCatalog TABLES` rows.
pub fn extract_relations(table: &ResultTable, target: &mut SchemaCatalog) {
    let columns = ColumnMap::resolve(table, &["TABLE_NAME", "TABLE_TYPE", "REMARKS"]);
    for row in &table.data {
        let Some(name) = columns.string(row, "TABLE_NAME") else {
            continue;
        };
        let kind = match columns.str(row, "TABLE_TYPE") {
            Some("VIEW") => RelationKind::View,
            Some("EXPORT") => RelationKind::Stream,
            _ => RelationKind::Table,
        };
        target.relations.insert(
            name.clone(),
            TableCatalogEntry {
                name,
                kind,
                remarks: columns.string(row, "REMARKS").unwrap_or_default(),
                columns: Vec::new(),
                indexes: Vec::new(),
            },
        );
    }
}

/// Attaches `@SystemCatalog COLUMNS` rows to their relations. Rows for
/// unknown relations are dropped.
pub fn extract_columns(table: &ResultTable, target: &mut SchemaCatalog) {
    let columns = ColumnMap::resolve(
        table,
        &[
            "TABLE_NAME",
            "COLUMN_NAME",
            "TYPE_NAME",
            "COLUMN_SIZE",
            "IS_NULLABLE",
            "ORDINAL_POSITION",
        ],
    );
    for row in &table.data {
        let Some(table_name) = columns.string(row, "TABLE_NAME") else {
            continue;
        };
        let Some(relation) = target.relations.get_mut(&table_name) else {
            continue;
        };
        relation.columns.push(ColumnCatalogEntry {
            name: columns.string(row, "COLUMN_NAME").unwrap_or_default(),
            type_name: columns.string(row, "TYPE_NAME").unwrap_or_default(),
            size: columns.i64(row, "COLUMN_SIZE").unwrap_or_default(),
            nullable: columns
                .str(row, "IS_NULLABLE")
                .map(|v| v.eq_ignore_ascii_case("yes"))
                .unwrap_or_default(),
            ordinal: columns.i64(row, "ORDINAL_POSITION").unwrap_or_default(),
        });
    }
    for relation in target.relations.values_mut() {
        relation.columns.sort_by_key(|c| c.ordinal);
    }
}

/// Attaches `@Statistics INDEX` rows to their relations.
pub fn extract_indexes(table: &ResultTable, target: &mut SchemaCatalog) {
    let columns = ColumnMap::resolve(
        table,
        &[
            "INDEX_NAME",
            "TABLE_NAME",
            "ENTRY_COUNT",
            "MEMORY_ESTIMATE",
            "INDEX_TYPE",
            "IS_UNIQUE",
        ],
    );
    for row in &table.data {
        let Some(table_name) = columns.string(row, "TABLE_NAME") else {
            continue;
        };
        let Some(relation) = target.relations.get_mut(&table_name) else {
            continue;
        };
        relation.indexes.push(IndexStats {
            index_name: columns.string(row, "INDEX_NAME").unwrap_or_default(),
            table_name,
            entry_count: columns.i64(row, "ENTRY_COUNT").unwrap_or_default(),
            memory_estimate: columns.i64(row, "MEMORY_ESTIMATE").unwrap_or_default(),
            index_type: columns.string(row, "INDEX_TYPE").unwrap_or_default(),
            is_unique: columns.i64(row, "IS_UNIQUE").unwrap_or_default() == 1,
        });
    }
}

/// Collects `@SystemCatalog PROCEDURES` rows.
pub fn extract_procedures(table: &ResultTable, target: &mut SchemaCatalog) {
    let columns = ColumnMap::resolve(table, &["PROCEDURE_NAME", "REMARKS"]);
    for row in &table.data {
        let Some(name) = columns.string(row, "PROCEDURE_NAME") else {
            continue;
        };
        target.procedures.push(ProcedureCatalogEntry {
            name,
            remarks: columns.string(row, "REMARKS").unwrap_or_default(),
            parameter_types: Vec::new(),
        });
    }
}

/// Sums `@Statistics EXPORT` rows per source stream.
pub fn extract_exporters(table: &ResultTable, target: &mut HashMap<String, ExporterStats>) {
    let columns = ColumnMap::resolve(table, &["SOURCE", "TUPLE_COUNT", "TUPLE_PENDING", "ACTIVE"]);
    for row in &table.data {
        let Some(source) = columns.string(row, "SOURCE") else {
            continue;
        };
        let entry = target.entry(source.clone()).or_insert(ExporterStats {
            source_name: source,
            ..Default::default()
        });
        entry.tuple_count += columns.i64(row, "TUPLE_COUNT").unwrap_or_default();
        entry.tuple_pending += columns.i64(row, "TUPLE_PENDING").unwrap_or_default();
        entry.active |= columns
            .str(row, "ACTIVE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats_table(rows: serde_json::Value) -> ResultTable {
        serde_json::from_value(json!({
            "schema": [
                {"name": "HOST_ID", "type": 5},
                {"name": "TABLE_NAME", "type": 9},
                {"name": "PARTITION_ID", "type": 5},
                {"name": "TABLE_TYPE", "type": 9},
                {"name": "TUPLE_COUNT", "type": 6}
            ],
            "data": rows
        }))
        .unwrap()
    }

    #[test]
    fn partitioned_tables_sum_across_partitions() {
        let table = stats_table(json!([
            [0, "ORDERS", 0, "PersistentTable", 100],
            [0, "ORDERS", 1, "PersistentTable", 300],
            [1, "ORDERS", 2, "PersistentTable", 200]
        ]));

        let mut stats = HashMap::new();
        extract_stats(&table, &mut stats);

        let orders = &stats["ORDERS"];
        assert_eq!(orders.table_type, "Partitioned");
        assert_eq!(orders.min_rows, 100);
        assert_eq!(orders.max_rows, 300);
        assert_eq!(orders.avg_rows, 200);
        assert_eq!(orders.tuple_count, 600);
    }

    #[test]
    fn replicated_tables_count_one_copy() {
        // Every host reports the same partition for a replicated table.
        let table = stats_table(json!([
            [0, "COUNTRIES", 16383, "PersistentTable", 250],
            [1, "COUNTRIES", 16383, "PersistentTable", 250]
        ]));

        let mut stats = HashMap::new();
        extract_stats(&table, &mut stats);

        let countries = &stats["COUNTRIES"];
        assert_eq!(countries.table_type, "Replicated");
        assert_eq!(countries.tuple_count, 250);
    }

    #[test]
    fn streamed_tables_are_classified_as_streams() {
        let table = stats_table(json!([
            [0, "CLICKS", 0, "StreamedTable", 10],
            [0, "CLICKS", 1, "StreamedTable", 20]
        ]));
        let mut stats = HashMap::new();
        extract_stats(&table, &mut stats);
        assert_eq!(stats["CLICKS"].table_type, "Stream");
    }

    #[test]
    fn catalog_assembles_relations_columns_and_indexes() {
        let mut catalog = SchemaCatalog::default();

        let relations: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "TABLE_NAME", "type": 9},
                {"name": "TABLE_TYPE", "type": 9},
                {"name": "REMARKS", "type": 9}
            ],
            "data": [
                ["ORDERS", "TABLE", ""],
                ["ORDER_TOTALS", "VIEW", ""],
                ["CLICKS", "EXPORT", ""]
            ]
        }))
        .unwrap();
        extract_relations(&relations, &mut catalog);

        let cols: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "TABLE_NAME", "type": 9},
                {"name": "COLUMN_NAME", "type": 9},
                {"name": "TYPE_NAME", "type": 9},
                {"name": "COLUMN_SIZE", "type": 5},
                {"name": "IS_NULLABLE", "type": 9},
                {"name": "ORDINAL_POSITION", "type": 5}
            ],
            "data": [
                ["ORDERS", "TOTAL", "FLOAT", 8, "YES", 2],
                ["ORDERS", "ID", "INTEGER", 4, "NO", 1]
            ]
        }))
        .unwrap();
        extract_columns(&cols, &mut catalog);

        let indexes: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "INDEX_NAME", "type": 9},
                {"name": "TABLE_NAME", "type": 9},
                {"name": "ENTRY_COUNT", "type": 6},
                {"name": "MEMORY_ESTIMATE", "type": 6},
                {"name": "INDEX_TYPE", "type": 9},
                {"name": "IS_UNIQUE", "type": 3}
            ],
            "data": [["PK_ORDERS", "ORDERS", 500, 64, "COMPACTING_TREE", 1]]
        }))
        .unwrap();
        extract_indexes(&indexes, &mut catalog);

        let orders = &catalog.relations["ORDERS"];
        assert_eq!(orders.kind, RelationKind::Table);
        // Sorted by ordinal, not arrival order.
        assert_eq!(orders.columns[0].name, "ID");
        assert!(orders.indexes[0].is_unique);
        assert_eq!(catalog.relations["CLICKS"].kind, RelationKind::Stream);
    }

    #[test]
    fn exporters_sum_over_partitions() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "SOURCE", "type": 9},
                {"name": "TUPLE_COUNT", "type": 6},
                {"name": "TUPLE_PENDING", "type": 6},
                {"name": "ACTIVE", "type": 9}
            ],
            "data": [
                ["CLICKS", 100, 5, "TRUE"],
                ["CLICKS", 200, 10, "TRUE"]
            ]
        }))
        .unwrap();

        let mut exporters = HashMap::new();
        extract_exporters(&table, &mut exporters);
        assert_eq!(exporters["CLICKS"].tuple_count, 300);
        assert_eq!(exporters["CLICKS"].tuple_pending, 15);
        assert!(exporters["CLICKS"].active);
    }
}
