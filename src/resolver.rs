//! Column and foreign-key metadata for admin models, read from the live schema.

use crate::config::AdminModel;
use crate::error::AdminError;
use crate::sql::{quoted, COLUMNS_SQL, FOREIGN_KEYS_SQL};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

/// Foreign key constraint on one column of a model's table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub column_name: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub constraint_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub field: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    /// "PRI", "UNI", "MUL" or "" (same vocabulary as MySQL's SHOW COLUMNS).
    pub key: String,
    /// Type used to cast text binds, e.g. "int4" or "\"public\".\"mood\"".
    #[serde(skip)]
    pub cast: String,
    /// Filled by `wrap_foreign_columns` for form views.
    pub foreign: Option<ForeignKey>,
}

impl ColumnInfo {
    pub fn new(field: &str, data_type: &str, cast: &str) -> Self {
        ColumnInfo {
            field: field.to_string(),
            data_type: data_type.to_string(),
            nullable: true,
            default: None,
            key: String::new(),
            cast: cast.to_string(),
            foreign: None,
        }
    }
}

/// Source of column metadata for admin models.
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    /// Editable columns of the model (see `select_fillable`).
    async fn columns(&self, model: &AdminModel) -> Result<Vec<ColumnInfo>, AdminError>;

    async fn foreign_keys(&self, model: &AdminModel) -> Result<Vec<ForeignKey>, AdminError>;
}

/// Reads `information_schema` through the admin pool.
#[derive(Clone)]
pub struct PgSchemaResolver {
    pool: PgPool,
}

impl PgSchemaResolver {
    pub fn new(pool: PgPool) -> Self {
        PgSchemaResolver { pool }
    }

    /// All columns of the table in ordinal order.
    pub async fn table_columns(&self, model: &AdminModel) -> Result<Vec<ColumnInfo>, AdminError> {
        tracing::debug!(sql = COLUMNS_SQL, table = %model.table_name, "introspect columns");
        let rows = sqlx::query_as::<_, (String, String, bool, Option<String>, String, String, String)>(COLUMNS_SQL)
            .bind(&model.schema_name)
            .bind(&model.table_name)
            .fetch_all(&self.pool)
            .await?;
        if rows.is_empty() {
            return Err(AdminError::NotFound(format!(
                "table {}.{} has no columns",
                model.schema_name, model.table_name
            )));
        }
        Ok(rows
            .into_iter()
            .map(|(field, data_type, nullable, default, udt_schema, udt_name, key)| ColumnInfo {
                cast: cast_type(&udt_schema, &udt_name),
                field,
                data_type,
                nullable,
                default,
                key,
                foreign: None,
            })
            .collect())
    }
}

#[async_trait]
impl SchemaResolver for PgSchemaResolver {
    async fn columns(&self, model: &AdminModel) -> Result<Vec<ColumnInfo>, AdminError> {
        let all = self.table_columns(model).await?;
        Ok(select_fillable(model, all))
    }

    async fn foreign_keys(&self, model: &AdminModel) -> Result<Vec<ForeignKey>, AdminError> {
        tracing::debug!(sql = FOREIGN_KEYS_SQL, table = %model.table_name, "introspect foreign keys");
        let rows = sqlx::query_as::<_, (String, String, String, String, String)>(FOREIGN_KEYS_SQL)
            .bind(&model.schema_name)
            .bind(&model.table_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(
                |(column_name, referenced_schema, referenced_table, referenced_column, constraint_name)| ForeignKey {
                    column_name,
                    referenced_schema,
                    referenced_table,
                    referenced_column,
                    constraint_name,
                },
            )
            .collect())
    }
}

/// Built-in types cast by bare name; user-defined ones (enums, domains) schema-qualified.
fn cast_type(udt_schema: &str, udt_name: &str) -> String {
    if udt_schema == "pg_catalog" {
        udt_name.to_string()
    } else {
        format!("{}.{}", quoted(udt_schema), quoted(udt_name))
    }
}

/// Fillable columns in fillable order when the model declares any; otherwise every
/// column except the primary key.
pub fn select_fillable(model: &AdminModel, table_columns: Vec<ColumnInfo>) -> Vec<ColumnInfo> {
    if model.fillable().is_empty() {
        return table_columns
            .into_iter()
            .filter(|c| c.field != model.key_name())
            .collect();
    }
    let mut by_field: std::collections::HashMap<String, ColumnInfo> =
        table_columns.into_iter().map(|c| (c.field.clone(), c)).collect();
    model
        .fillable()
        .iter()
        .filter_map(|f| by_field.remove(f))
        .collect()
}

/// Attach to each column the first foreign key declared on it.
pub fn wrap_foreign_columns(columns: Vec<ColumnInfo>, foreign_keys: &[ForeignKey]) -> Vec<ColumnInfo> {
    columns
        .into_iter()
        .map(|mut column| {
            column.foreign = foreign_keys
                .iter()
                .find(|fk| fk.column_name == column.field)
                .cloned();
            column
        })
        .collect()
}
