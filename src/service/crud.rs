//! Generic admin CRUD execution against PostgreSQL.

use crate::config::AdminModel;
use crate::error::AdminError;
use crate::hooks::Record;
use crate::resolver::ColumnInfo;
use crate::sql::{
    count_matching, delete_where_in, insert, select_by_key, select_page, select_row_by_key, update,
    ListQuery, QueryBuf, SqlParam,
};
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres};

/// One page of an index listing.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub data: Vec<Value>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// 1-based position of the first row on this page; None when the page is empty.
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl Page {
    pub fn new(data: Vec<Value>, total: u64, list: &ListQuery) -> Self {
        let per_page = list.per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let first = list.offset() + 1;
            (Some(first), Some(first + data.len() as u64 - 1))
        };
        Page {
            data,
            current_page: list.page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

pub struct AdminService;

impl AdminService {
    /// Sorted, searched, paginated listing of `fields` (search runs over `search_fields`).
    pub async fn paginate(
        pool: &PgPool,
        model: &AdminModel,
        fields: &[String],
        search_fields: &[String],
        list: &ListQuery,
    ) -> Result<Page, AdminError> {
        let count = count_matching(model, search_fields, list.search.as_deref());
        tracing::debug!(sql = %count.sql, params = ?count.params, "query");
        let total = bind_all(sqlx::query_scalar::<Postgres, i64>(&count.sql), &count.params)
            .fetch_one(pool)
            .await?;

        let q = select_page(model, fields, list, search_fields);
        let rows = Self::query_many(pool, &q).await?;
        Ok(Page::new(rows, total.max(0) as u64, list))
    }

    /// Selected fields of one row, or None.
    pub async fn find(
        pool: &PgPool,
        model: &AdminModel,
        id: &Value,
        fields: &[String],
    ) -> Result<Option<Value>, AdminError> {
        let mut q = select_by_key(model, fields);
        q.params.push(id.clone());
        Self::query_optional(pool, &q).await
    }

    /// The full stored row, or None.
    pub async fn find_row(pool: &PgPool, model: &AdminModel, id: &Value) -> Result<Option<Value>, AdminError> {
        let mut q = select_row_by_key(model);
        q.params.push(id.clone());
        Self::query_optional(pool, &q).await
    }

    /// Insert one row. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        model: &AdminModel,
        record: &Record,
        columns: &[ColumnInfo],
    ) -> Result<Value, AdminError> {
        let q = insert(model, record, columns);
        let row = Self::query_optional(pool, &q)
            .await?
            .ok_or(AdminError::Db(sqlx::Error::RowNotFound))?;
        tracing::info!(model = %model.alias, "row created");
        Ok(row)
    }

    /// Update one row by key. Returns the updated row, or None when no row has that key.
    pub async fn update(
        pool: &PgPool,
        model: &AdminModel,
        id: &Value,
        record: &Record,
        columns: &[ColumnInfo],
    ) -> Result<Option<Value>, AdminError> {
        let q = update(model, id, record, columns);
        let row = Self::query_optional(pool, &q).await?;
        if row.is_some() {
            tracing::info!(model = %model.alias, id = %id, "row updated");
        }
        Ok(row)
    }

    /// Delete every row whose key is in `ids`. Returns the number of rows removed.
    pub async fn destroy(pool: &PgPool, model: &AdminModel, ids: &[Value]) -> Result<u64, AdminError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let q = delete_where_in(model, ids);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let result = bind_all(sqlx::query::<Postgres>(&q.sql), &q.params).execute(pool).await?;
        tracing::info!(model = %model.alias, deleted = result.rows_affected(), "rows destroyed");
        Ok(result.rows_affected())
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AdminError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query_scalar::<Postgres, Value>(&q.sql), &q.params)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    async fn query_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AdminError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query_scalar::<Postgres, Value>(&q.sql), &q.params)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }
}

/// Bind every param as optional text. Implemented for the sqlx query shapes used here.
trait BindText: Sized {
    fn bind_text(self, value: Option<String>) -> Self;
}

impl<'q> BindText for sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    fn bind_text(self, value: Option<String>) -> Self {
        self.bind(value)
    }
}

impl<'q, O> BindText for sqlx::query::QueryScalar<'q, Postgres, O, sqlx::postgres::PgArguments> {
    fn bind_text(self, value: Option<String>) -> Self {
        self.bind(value)
    }
}

fn bind_all<Q: BindText>(query: Q, params: &[Value]) -> Q {
    params
        .iter()
        .fold(query, |q, p| q.bind_text(SqlParam::from_json(p).0))
}
