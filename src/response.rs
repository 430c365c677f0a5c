//! View payloads and the plain-text failure response of write actions.

use crate::config::{AdminModel, ModelSummary};
use crate::error::AdminError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A rendered admin screen: the view name, the model it belongs to and its body fields.
#[derive(Serialize)]
pub struct View<T> {
    pub view: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSummary>,
    #[serde(flatten)]
    pub body: T,
}

pub fn view<T: Serialize>(name: &'static str, model: &AdminModel, body: T) -> Json<View<T>> {
    Json(View {
        view: name,
        model: Some(model.summary()),
        body,
    })
}

/// View not tied to a single model (e.g. the welcome screen).
pub fn plain_view<T: Serialize>(name: &'static str, body: T) -> Json<View<T>> {
    Json(View {
        view: name,
        model: None,
        body,
    })
}

/// Failed store / update / destroy: the error message verbatim as the body.
pub fn failure(err: AdminError) -> Response {
    let message = match err {
        AdminError::Db(sqlx::Error::Database(db)) => db.message().to_string(),
        other => other.to_string(),
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}
