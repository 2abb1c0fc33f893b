//! Schema catalog view models, built from `@SystemCatalog` and
//! `@Statistics INDEX` results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Classification of a relation in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    Table,
    View,
    /// Export-only stream (a "table" whose tuples leave through an export
    /// connector).
    Stream,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnCatalogEntry {
    pub name: String,
    pub type_name: String,
    pub size: i64,
    pub nullable: bool,
    /// Position reported by the catalog, kept for display ordering only.
    pub ordinal: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub index_name: String,
    pub table_name: String,
    pub entry_count: i64,
    pub memory_estimate: i64,
    pub index_type: String,
    pub is_unique: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCatalogEntry {
    pub name: String,
    pub kind: RelationKind,
    pub remarks: String,
    pub columns: Vec<ColumnCatalogEntry>,
    pub indexes: Vec<IndexStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureCatalogEntry {
    pub name: String,
    pub remarks: String,
    pub parameter_types: Vec<String>,
}

/// The whole browsable schema, rebuilt per poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    pub relations: HashMap<String, TableCatalogEntry>,
    pub procedures: Vec<ProcedureCatalogEntry>,
}
