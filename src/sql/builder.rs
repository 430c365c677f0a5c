//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for admin models.
//!
//! Identifiers come from the validated config or from introspection and are always quoted.
//! Values are bound as text and cast to the column type in SQL.

use crate::config::AdminModel;
use crate::hooks::Record;
use crate::resolver::ColumnInfo;
use serde_json::Value;
use std::collections::HashMap;

/// Columns of a table with their type, key kind and (via the second subquery) constraint role.
pub const COLUMNS_SQL: &str = r#"
SELECT c.column_name::text,
       c.data_type::text,
       c.is_nullable::text = 'YES',
       c.column_default::text,
       c.udt_schema::text,
       c.udt_name::text,
       COALESCE((
           SELECT CASE tc.constraint_type
                      WHEN 'PRIMARY KEY' THEN 'PRI'
                      WHEN 'UNIQUE' THEN 'UNI'
                      ELSE 'MUL'
                  END
           FROM information_schema.key_column_usage k
           JOIN information_schema.table_constraints tc
             ON tc.constraint_name = k.constraint_name
            AND tc.constraint_schema = k.constraint_schema
           WHERE k.table_schema = c.table_schema
             AND k.table_name = c.table_name
             AND k.column_name = c.column_name
           ORDER BY CASE tc.constraint_type WHEN 'PRIMARY KEY' THEN 0 WHEN 'UNIQUE' THEN 1 ELSE 2 END
           LIMIT 1
       ), '')
FROM information_schema.columns c
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position
"#;

pub const FOREIGN_KEYS_SQL: &str = r#"
SELECT kcu.column_name::text,
       ccu.table_schema::text,
       ccu.table_name::text,
       ccu.column_name::text,
       tc.constraint_name::text
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON tc.constraint_name = kcu.constraint_name
 AND tc.table_schema = kcu.table_schema
JOIN information_schema.constraint_column_usage ccu
  ON ccu.constraint_name = tc.constraint_name
 AND ccu.constraint_schema = tc.table_schema
WHERE tc.constraint_type = 'FOREIGN KEY'
  AND tc.table_schema = $1
  AND tc.table_name = $2
ORDER BY kcu.ordinal_position
"#;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(model: &AdminModel) -> String {
    format!("{}.{}", quoted(&model.schema_name), quoted(&model.table_name))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Sort, search and window of an index listing. Already vetted against the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub order_by: String,
    pub descending: bool,
    pub search: Option<String>,
    pub per_page: u64,
    pub page: u64,
}

/// Largest OFFSET PostgreSQL accepts (bigint).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

impl ListQuery {
    /// Rows skipped before this page, capped at `MAX_OFFSET` so far-out pages come back empty.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
            .min(MAX_OFFSET)
    }
}

/// Quoted, comma-separated, first occurrence of each field only.
fn column_list(fields: &[String]) -> String {
    let mut seen = std::collections::HashSet::new();
    fields
        .iter()
        .filter(|f| seen.insert(f.as_str()))
        .map(|f| quoted(f))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wrap a SELECT so each row decodes as one JSON value. `t.*` keeps a column named `t` from
/// shadowing the row.
fn json_rows(inner: &str, order: Option<&str>) -> String {
    match order {
        Some(order) => format!("SELECT row_to_json(t.*) FROM ({}) t ORDER BY {}", inner, order),
        None => format!("SELECT row_to_json(t.*) FROM ({}) t", inner),
    }
}

fn order_clause(model: &AdminModel, list: &ListQuery, alias: Option<&str>) -> String {
    let col = |f: &str| match alias {
        Some(a) => format!("{}.{}", a, quoted(f)),
        None => quoted(f),
    };
    let dir = if list.descending { "DESC" } else { "ASC" };
    let mut order = format!("{} {}", col(&list.order_by), dir);
    if list.order_by != model.key_name() {
        order.push_str(&format!(", {} {}", col(model.key_name()), dir));
    }
    order
}

/// Escape LIKE wildcards and wrap in `%...%`.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// ` WHERE ("a"::text ILIKE $n OR "b"::text ILIKE $n)` or empty.
fn search_clause(q: &mut QueryBuf, search_fields: &[String], search: Option<&str>) -> String {
    let Some(term) = search.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    if search_fields.is_empty() {
        return String::new();
    }
    let n = q.push_param(Value::String(like_pattern(term)));
    let ors: Vec<String> = search_fields
        .iter()
        .map(|f| format!("{}::text ILIKE ${}", quoted(f), n))
        .collect();
    format!(" WHERE ({})", ors.join(" OR "))
}

fn key_placeholder(model: &AdminModel, n: usize) -> String {
    format!("${}::{}", n, model.key_type.cast())
}

/// One page of rows: selected fields, optional search over `search_fields`, ordered.
/// Ties on a non-key sort column are broken by the key so pages stay stable.
/// `fields` must contain the sort column and the key.
pub fn select_page(model: &AdminModel, fields: &[String], list: &ListQuery, search_fields: &[String]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(&mut q, search_fields, list.search.as_deref());
    let inner = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        column_list(fields),
        qualified_table(model),
        where_clause,
        order_clause(model, list, None),
        list.per_page,
        list.offset()
    );
    q.sql = json_rows(&inner, Some(&order_clause(model, list, Some("t"))));
    q
}

/// Total rows matching the same search as `select_page`.
pub fn count_matching(model: &AdminModel, search_fields: &[String], search: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(&mut q, search_fields, search);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", qualified_table(model), where_clause);
    q
}

/// Selected fields of one row by key. Caller adds the id as sole param.
pub fn select_by_key(model: &AdminModel, fields: &[String]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let inner = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list(fields),
        qualified_table(model),
        quoted(model.key_name()),
        key_placeholder(model, 1)
    );
    q.sql = json_rows(&inner, None);
    q
}

/// Whole row by key. Caller adds the id as sole param.
pub fn select_row_by_key(model: &AdminModel) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT row_to_json(r.*) FROM {} r WHERE r.{} = {}",
        qualified_table(model),
        quoted(model.key_name()),
        key_placeholder(model, 1)
    );
    q
}

/// Wrap a data-modifying statement so the affected row comes back as one JSON value.
fn returning_json(statement: String) -> String {
    format!(
        "WITH changed AS ({} RETURNING *) SELECT row_to_json(changed.*) FROM changed",
        statement
    )
}

/// INSERT of the record's fields that are known columns. Columns missing from the record
/// are omitted so the database default applies.
pub fn insert(model: &AdminModel, record: &Record, columns: &[ColumnInfo]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let by_field: HashMap<&str, &ColumnInfo> = columns.iter().map(|c| (c.field.as_str(), c)).collect();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for (k, v) in record {
        let Some(c) = by_field.get(k.as_str()) else { continue };
        let n = q.push_param(v.clone());
        cols.push(quoted(k));
        values.push(format!("${}::{}", n, c.cast));
    }
    if model.timestamps {
        for ts in ["created_at", "updated_at"] {
            if !record.contains_key(ts) {
                cols.push(quoted(ts));
                values.push("NOW()".into());
            }
        }
    }
    let table = qualified_table(model);
    let statement = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", table)
    } else {
        format!("INSERT INTO {} ({}) VALUES ({})", table, cols.join(", "), values.join(", "))
    };
    q.sql = returning_json(statement);
    q
}

/// UPDATE by key: SET only record fields that are known columns (never the key).
/// With nothing to set this degrades to `select_row_by_key`.
pub fn update(model: &AdminModel, id: &Value, record: &Record, columns: &[ColumnInfo]) -> QueryBuf {
    let by_field: HashMap<&str, &ColumnInfo> = columns.iter().map(|c| (c.field.as_str(), c)).collect();
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in record {
        if k == model.key_name() {
            continue;
        }
        let Some(c) = by_field.get(k.as_str()) else { continue };
        let n = q.push_param(v.clone());
        sets.push(format!("{} = ${}::{}", quoted(k), n, c.cast));
    }
    if sets.is_empty() {
        let mut q = select_row_by_key(model);
        q.params.push(id.clone());
        return q;
    }
    if model.timestamps && !record.contains_key("updated_at") {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    let n = q.push_param(id.clone());
    let statement = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        qualified_table(model),
        sets.join(", "),
        quoted(model.key_name()),
        key_placeholder(model, n)
    );
    q.sql = returning_json(statement);
    q
}

/// DELETE every row whose key is in `ids`. Callers reject an empty list first.
pub fn delete_where_in(model: &AdminModel, ids: &[Value]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders: Vec<String> = ids
        .iter()
        .map(|id| {
            let n = q.push_param(id.clone());
            key_placeholder(model, n)
        })
        .collect();
    q.sql = format!(
        "DELETE FROM {} WHERE {} IN ({})",
        qualified_table(model),
        quoted(model.key_name()),
        placeholders.join(", ")
    );
    q
}
