//! Procedure-call parameter encoding.
//!
//! Every administrative procedure has a fixed signature: one or more
//! arity-keyed ordered type lists. Encoding validates the call against the
//! signature and renders the parameters as the bracketed literal the
//! endpoint's `Parameters` query key expects.

use std::collections::{BTreeMap, HashMap};

use common::errors::{AppError, AppResult};

/// Declared parameter types. Anything not listed numerically or as a known
/// special case encodes as a quoted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Decimal,
    Bit,
    VarBinary,
    VarChar,
    Xml,
    StatisticsComponent,
    CatalogComponent,
    SysInfoSelector,
}

/// A parameter value supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    /// The value's bare textual form, as it would appear unquoted on the
    /// wire. Also used to derive metadata keys.
    pub fn token(&self) -> String {
        match self {
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Str(s) => s.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Signature table: procedure name -> arity -> ordered type list.
/// Arity variants are kept ordered so mismatch messages are deterministic.
pub type SignatureTable = HashMap<&'static str, BTreeMap<usize, Vec<ParamType>>>;

/// The fixed set of administrative procedures and their signatures.
pub fn default_signatures() -> SignatureTable {
    use ParamType::*;

    let mut table = SignatureTable::new();
    let mut insert = |name: &'static str, variants: Vec<Vec<ParamType>>| {
        let mut by_arity = BTreeMap::new();
        for types in variants {
            by_arity.insert(types.len(), types);
        }
        table.insert(name, by_arity);
    };

    insert("@AdHoc", vec![vec![VarChar]]);
    insert("@Explain", vec![vec![VarChar]]);
    insert("@ExplainProc", vec![vec![VarChar]]);
    insert("@Pause", vec![vec![]]);
    insert("@Promote", vec![vec![]]);
    insert("@Quiesce", vec![vec![]]);
    insert("@Resume", vec![vec![]]);
    insert("@Shutdown", vec![vec![]]);
    insert("@SnapshotDelete", vec![vec![VarChar, VarChar]]);
    insert("@SnapshotRestore", vec![vec![VarChar], vec![VarChar, VarChar]]);
    insert("@SnapshotSave", vec![vec![VarChar, VarChar, Bit], vec![VarChar]]);
    insert("@SnapshotScan", vec![vec![VarChar]]);
    insert("@SnapshotStatus", vec![vec![]]);
    insert("@Statistics", vec![vec![StatisticsComponent, Bit]]);
    insert("@SystemCatalog", vec![vec![CatalogComponent]]);
    insert("@SystemInformation", vec![vec![SysInfoSelector]]);
    insert("@UpdateApplicationCatalog", vec![vec![VarChar, VarChar]]);
    insert("@UpdateLogging", vec![vec![Xml]]);
    insert("@ValidatePartitioning", vec![vec![Int, VarBinary]]);
    insert("@GetPartitionKeys", vec![vec![VarChar]]);
    insert("@GC", vec![vec![]]);
    insert("@StopNode", vec![vec![Int]]);

    table
}

/// Encodes a procedure call into query pairs: `Procedure`, `Parameters`, and
/// `admin=true` when the connection targets the admin interface. The
/// transport layer percent-encodes the values.
pub fn encode(
    signatures: &SignatureTable,
    procedure: &str,
    parameters: &[ParamValue],
    admin: bool,
) -> AppResult<Vec<(String, String)>> {
    let variants = signatures
        .get(procedure)
        .ok_or_else(|| AppError::UnknownProcedure(procedure.to_string()))?;

    let signature = variants.get(&parameters.len()).ok_or_else(|| {
        let expected = variants
            .keys()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        AppError::ArityMismatch {
            procedure: procedure.to_string(),
            received: parameters.len(),
            expected,
        }
    })?;

    let mut rendered = Vec::with_capacity(parameters.len());
    for (value, param_type) in parameters.iter().zip(signature) {
        rendered.push(encode_one(procedure, value, *param_type));
    }

    let mut pairs = vec![
        ("Procedure".to_string(), procedure.to_string()),
        ("Parameters".to_string(), format!("[{}]", rendered.join(","))),
    ];
    if admin {
        pairs.push(("admin".to_string(), "true".to_string()));
    }
    Ok(pairs)
}

/// The zero-argument cluster-lifecycle procedures that bypass full encoding.
pub fn is_lifecycle(procedure: &str) -> bool {
    matches!(procedure, "@Pause" | "@Resume" | "@Shutdown" | "@Promote")
}

/// Reduced encoder for the cluster-lifecycle procedures: no `Parameters`
/// key at all, just the procedure name and the admin flag.
pub fn encode_lifecycle(procedure: &str, admin: bool) -> Vec<(String, String)> {
    let mut pairs = vec![("Procedure".to_string(), procedure.to_string())];
    if admin {
        pairs.push(("admin".to_string(), "true".to_string()));
    }
    pairs
}

fn encode_one(procedure: &str, value: &ParamValue, param_type: ParamType) -> String {
    use ParamType::*;

    match param_type {
        TinyInt | SmallInt | Int | BigInt | Float => bare_token(value),
        Decimal => format!("\"{}\"", bare_token(value)),
        Bit => if is_truthy(value) { "1" } else { "0" }.to_string(),
        // Caller supplies a pre-formatted byte representation.
        VarBinary => bare_token(value),
        _ => match value {
            ParamValue::Str(s) => {
                let stripped = strip_outer_quotes(s);
                if procedure == "@SnapshotDelete" {
                    // The delete endpoint parses this argument as a
                    // one-element array literal.
                    format!("[\"{stripped}\"]")
                } else {
                    format!("\"{stripped}\"").replace("''", "'")
                }
            }
            other => bare_token(other),
        },
    }
}

fn bare_token(value: &ParamValue) -> String {
    value.token()
}

fn is_truthy(value: &ParamValue) -> bool {
    match value {
        ParamValue::Bool(b) => *b,
        ParamValue::Int(i) => *i == 1,
        ParamValue::Float(f) => *f == 1.0,
        ParamValue::Str(s) => {
            matches!(s.as_str(), "true" | "'true'" | "yes" | "'yes'" | "1")
        }
    }
}

/// Removes one leading and one trailing single quote, if present.
fn strip_outer_quotes(s: &str) -> String {
    let s = s.strip_prefix('\'').unwrap_or(s);
    let s = s.strip_suffix('\'').unwrap_or(s);
    s.to_string()
}
