//! Admin controller: welcome, index, show, create/store, edit/update, delete/destroy.
//!
//! Every handler resolves the route type to a model and checks the privilege first.
//! Store, update and destroy answer failures with the error message as plain text.

use crate::config::{AdminModel, ModelSummary};
use crate::error::AdminError;
use crate::extractors::AdminUser;
use crate::handlers::params::{body_to_record, only, parse_id, parse_ids, IdsQuery, IndexParams};
use crate::hooks::Record;
use crate::privilege::{ensure_privilege, Action};
use crate::resolver::{wrap_foreign_columns, ColumnInfo};
use crate::response::{failure, plain_view, view};
use crate::service::{AdminService, Page, RequestValidator};
use crate::sql::key_to_string;
use crate::state::AdminState;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct WelcomeBody {
    pub models: Vec<ModelSummary>,
}

#[derive(Serialize)]
pub struct IndexBody {
    pub data: Page,
    /// Columns of the listing.
    pub fillable: Vec<String>,
}

#[derive(Serialize)]
pub struct RecordBody {
    pub data: Option<Value>,
}

#[derive(Serialize)]
pub struct ColumnsBody {
    pub columns: Vec<ColumnInfo>,
}

#[derive(Serialize)]
pub struct EditBody {
    pub data: Option<Value>,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Serialize)]
pub struct IdsBody {
    pub ids: Vec<Value>,
}

fn authorize<'a>(
    state: &'a AdminState,
    user: &AdminUser,
    type_: &str,
    action: Action,
) -> Result<&'a AdminModel, AdminError> {
    let model = state.registry.resolve_type(type_)?;
    ensure_privilege(state.privileges.as_ref(), user, model, action)?;
    Ok(model)
}

async fn form_columns(state: &AdminState, model: &AdminModel, columns: Vec<ColumnInfo>) -> Result<Vec<ColumnInfo>, AdminError> {
    let foreign_keys = state.resolver.foreign_keys(model).await?;
    Ok(wrap_foreign_columns(columns, &foreign_keys))
}

fn with_key(mut fields: Vec<String>, model: &AdminModel) -> Vec<String> {
    if !fields.iter().any(|f| f == model.key_name()) {
        fields.push(model.key_name().to_string());
    }
    fields
}

fn redirect_to_row(state: &AdminState, model: &AdminModel, row: &Value, fallback_id: Option<&Value>) -> Response {
    let key = row
        .get(model.key_name())
        .or(fallback_id)
        .map(key_to_string)
        .unwrap_or_default();
    Redirect::to(&state.settings.url(&[model.alias.as_str(), key.as_str()])).into_response()
}

pub async fn welcome(State(state): State<AdminState>, user: AdminUser) -> impl IntoResponse {
    let models = state
        .registry
        .models
        .iter()
        .filter(|m| state.privileges.has_privilege(&user, m, Action::Index))
        .map(AdminModel::summary)
        .collect();
    plain_view("welcome", WelcomeBody { models })
}

pub async fn index(
    State(state): State<AdminState>,
    user: AdminUser,
    Path(type_): Path<String>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Index)?;
    let fillable = state.hooks.for_model(model).index_fields(model);
    let list = params.to_list_query(model, &fillable, &state.settings)?;
    let fields = with_key(fillable.clone(), model);
    let data = AdminService::paginate(&state.pool, model, &fields, &fillable, &list).await?;
    Ok(view("type.index", model, IndexBody { data, fillable }))
}

pub async fn show(
    State(state): State<AdminState>,
    user: AdminUser,
    Path((type_, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Index)?;
    let id = parse_id(&id_str, model.key_type)?;
    let data = AdminService::find(&state.pool, model, &id, &model.show_fields()).await?;
    Ok(view("type.show", model, RecordBody { data }))
}

pub async fn create(
    State(state): State<AdminState>,
    user: AdminUser,
    Path(type_): Path<String>,
) -> Result<impl IntoResponse, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Create)?;
    let columns = state.resolver.columns(model).await?;
    let columns = form_columns(&state, model, columns).await?;
    Ok(view("type.create", model, ColumnsBody { columns }))
}

pub async fn store(
    State(state): State<AdminState>,
    user: AdminUser,
    Path(type_): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Create)?;
    let columns = state.resolver.columns(model).await?;
    let input = body_to_record(body)?;

    match store_record(&state, model, only(input, &columns), &columns).await {
        Ok(row) => Ok(redirect_to_row(&state, model, &row, None)),
        Err(err) => {
            tracing::warn!(model = %model.alias, error = %err, "store failed");
            Ok(failure(err))
        }
    }
}

async fn store_record(
    state: &AdminState,
    model: &AdminModel,
    fields: Record,
    columns: &[ColumnInfo],
) -> Result<Value, AdminError> {
    RequestValidator::validate(&fields, &model.validation)?;
    let hooks = state.hooks.for_model(model);
    let fields = hooks.on_create(model, fields).await?;
    let row = AdminService::create(&state.pool, model, &fields, columns).await?;
    hooks.created(model, &row).await?;
    Ok(row)
}

pub async fn edit(
    State(state): State<AdminState>,
    user: AdminUser,
    Path((type_, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Edit)?;
    let id = parse_id(&id_str, model.key_type)?;
    let columns = state.resolver.columns(model).await?;
    let fields = with_key(columns.iter().map(|c| c.field.clone()).collect(), model);
    let data = AdminService::find(&state.pool, model, &id, &fields).await?;
    let columns = form_columns(&state, model, columns).await?;
    Ok(view("type.edit", model, EditBody { data, columns }))
}

pub async fn update(
    State(state): State<AdminState>,
    user: AdminUser,
    Path((type_, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Edit)?;
    let id = parse_id(&id_str, model.key_type)?;
    let columns = state.resolver.columns(model).await?;
    let input = body_to_record(body)?;

    match update_record(&state, model, &id, input, &columns).await {
        Ok(row) => Ok(redirect_to_row(&state, model, &row, Some(&id))),
        Err(err) => {
            tracing::warn!(model = %model.alias, id = %id, error = %err, "update failed");
            Ok(failure(err))
        }
    }
}

async fn update_record(
    state: &AdminState,
    model: &AdminModel,
    id: &Value,
    input: Record,
    columns: &[ColumnInfo],
) -> Result<Value, AdminError> {
    let missing = || AdminError::NotFound(format!("no {} with key {}", model.alias, key_to_string(id)));
    let current = AdminService::find_row(&state.pool, model, id)
        .await?
        .ok_or_else(missing)?;
    let fields = only(input, columns);
    RequestValidator::validate_partial(&fields, &model.validation)?;
    let hooks = state.hooks.for_model(model);
    let fields = hooks.on_edit(model, &current, fields).await?;
    let row = AdminService::update(&state.pool, model, id, &fields, columns)
        .await?
        .ok_or_else(missing)?;
    hooks.edited(model, &row).await?;
    Ok(row)
}

pub async fn delete(
    State(state): State<AdminState>,
    user: AdminUser,
    Path(type_): Path<String>,
    Query(query): Query<IdsQuery>,
) -> Result<impl IntoResponse, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Delete)?;
    let ids = parse_ids(&query, model.key_type)?;
    Ok(view("type.delete", model, IdsBody { ids }))
}

pub async fn destroy(
    State(state): State<AdminState>,
    user: AdminUser,
    Path(type_): Path<String>,
    Query(query): Query<IdsQuery>,
) -> Result<Response, AdminError> {
    let model = authorize(&state, &user, &type_, Action::Delete)?;
    let ids = parse_ids(&query, model.key_type)?;

    match AdminService::destroy(&state.pool, model, &ids).await {
        Ok(_) => Ok(Redirect::to(&state.settings.url(&[model.alias.as_str()])).into_response()),
        Err(err) => {
            tracing::warn!(model = %model.alias, error = %err, "destroy failed");
            Ok(failure(err))
        }
    }
}
