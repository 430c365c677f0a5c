//! Request parameter shaping: ids, listing options and form input.

use crate::config::{AdminModel, AdminSettings, PkType};
use crate::error::AdminError;
use crate::hooks::Record;
use crate::resolver::ColumnInfo;
use crate::sql::ListQuery;
use serde::Deserialize;
use serde_json::Value;

pub fn parse_id(id_str: &str, pk_type: PkType) -> Result<Value, AdminError> {
    let id_str = id_str.trim();
    Ok(match pk_type {
        PkType::Uuid => {
            let u = uuid::Uuid::parse_str(id_str).map_err(|_| AdminError::BadRequest(format!("invalid uuid '{}'", id_str)))?;
            Value::String(u.to_string())
        }
        PkType::BigInt | PkType::Int => {
            let n: i64 = id_str
                .parse()
                .map_err(|_| AdminError::BadRequest(format!("invalid id '{}'", id_str)))?;
            if pk_type == PkType::Int && i32::try_from(n).is_err() {
                return Err(AdminError::BadRequest(format!("id out of range '{}'", id_str)));
            }
            Value::Number(n.into())
        }
        PkType::Text => Value::String(id_str.to_string()),
    })
}

/// `?ids=1,2,3`
#[derive(Debug, Default, Deserialize)]
pub struct IdsQuery {
    #[serde(default)]
    pub ids: Option<String>,
}

/// Parse the comma-separated id list, dropping blanks. An empty result is a 404.
pub fn parse_ids(query: &IdsQuery, pk_type: PkType) -> Result<Vec<Value>, AdminError> {
    let ids = query
        .ids
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, pk_type))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(AdminError::NotFound("no ids given".into()));
    }
    Ok(ids)
}

/// Index listing options as they arrive on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    pub by: Option<String>,
    pub order: Option<String>,
    pub q: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub page: Option<String>,
}

impl IndexParams {
    /// Vet sort column and direction against the model and clamp paging. The sort column
    /// must be the key or one of the listed `index_fields`.
    pub fn to_list_query(
        &self,
        model: &AdminModel,
        index_fields: &[String],
        settings: &AdminSettings,
    ) -> Result<ListQuery, AdminError> {
        let order_by = match self.by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => model.key_name().to_string(),
            Some(by) if by == model.key_name() || index_fields.iter().any(|f| f == by) => by.to_string(),
            Some(by) => return Err(AdminError::BadRequest(format!("cannot sort {} by '{}'", model.alias, by))),
        };
        let descending = match self.order.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(o) if o.eq_ignore_ascii_case("desc") => true,
            Some(o) if o.eq_ignore_ascii_case("asc") => false,
            Some(o) => return Err(AdminError::BadRequest(format!("invalid sort order '{}'", o))),
        };
        let per_page = parse_positive(self.per_page.as_deref(), "perPage")?
            .unwrap_or(settings.per_page)
            .clamp(1, settings.max_per_page.max(1));
        let page = parse_positive(self.page.as_deref(), "page")?.unwrap_or(1);
        let search = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(ListQuery {
            order_by,
            descending,
            search,
            per_page,
            page,
        })
    }
}

fn parse_positive(raw: Option<&str>, name: &str) -> Result<Option<u64>, AdminError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => match s.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(AdminError::BadRequest(format!("{} must be a positive integer", name))),
        },
    }
}

pub fn body_to_record(value: Value) -> Result<Record, AdminError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AdminError::BadRequest("body must be a JSON object".into())),
    }
}

/// Keep only the input fields that name one of `columns`.
pub fn only(record: Record, columns: &[ColumnInfo]) -> Record {
    record
        .into_iter()
        .filter(|(k, _)| columns.iter().any(|c| &c.field == k))
        .collect()
}
