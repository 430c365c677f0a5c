//! Router-level tests for the paths that answer before any query reaches the database.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use seamless_admin::{
    admin_routes, resolve, AdminConfig, AdminError, AdminHooks, AdminModel, AdminSettings, AdminState, ColumnInfo,
    ForeignKey, HookRegistry, Record, SchemaResolver,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

struct FixedResolver;

#[async_trait]
impl SchemaResolver for FixedResolver {
    async fn columns(&self, model: &AdminModel) -> Result<Vec<ColumnInfo>, AdminError> {
        Ok(match model.alias.as_str() {
            "users" => vec![ColumnInfo::new("name", "text", "text"), ColumnInfo::new("email", "text", "text")],
            _ => vec![
                ColumnInfo::new("title", "text", "text"),
                ColumnInfo::new("user_id", "bigint", "int8"),
            ],
        })
    }

    async fn foreign_keys(&self, model: &AdminModel) -> Result<Vec<ForeignKey>, AdminError> {
        if model.alias != "posts" {
            return Ok(vec![]);
        }
        Ok(vec![ForeignKey {
            column_name: "user_id".into(),
            referenced_schema: "public".into(),
            referenced_table: "users".into(),
            referenced_column: "id".into(),
            constraint_name: "posts_user_id_fkey".into(),
        }])
    }
}

struct RejectDrafts;

#[async_trait]
impl AdminHooks for RejectDrafts {
    async fn on_create(&self, _model: &AdminModel, fields: Record) -> Result<Record, AdminError> {
        if fields.get("title").and_then(Value::as_str) == Some("draft") {
            return Err(AdminError::Hook("drafts cannot be published".into()));
        }
        Ok(fields)
    }
}

fn config() -> AdminConfig {
    serde_json::from_value(json!({
        "models": [
            {
                "alias": "users",
                "label": "Users",
                "table": "users",
                "fillable": ["name", "email"],
                "validation": { "email": { "required": true, "format": "email" } }
            },
            {
                "alias": "posts",
                "table": "posts",
                "fillable": ["title", "user_id"],
                "privileges": ["index", "create", "edit"]
            }
        ]
    }))
    .unwrap()
}

fn app_with(settings: AdminSettings) -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/seamless_admin_test")
        .unwrap();
    let state = AdminState::new(pool, resolve(&config()).unwrap(), settings)
        .with_resolver(FixedResolver)
        .with_hooks(HookRegistry::new().register("posts", RejectDrafts));
    admin_routes(state)
}

fn app() -> Router {
    app_with(AdminSettings::default())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn welcome_lists_models() {
    let (status, body) = send(app(), get("/admin")).await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["view"], "welcome");
    let aliases: Vec<&str> = v["models"].as_array().unwrap().iter().map(|m| m["alias"].as_str().unwrap()).collect();
    assert_eq!(aliases, vec!["users", "posts"]);
}

#[tokio::test]
async fn unknown_type_is_not_found() {
    let (status, body) = send(app(), get("/admin/comments")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["error"]["code"], "not_found");
}

#[tokio::test]
async fn missing_privilege_is_forbidden() {
    let (status, _) = send(app(), get("/admin/posts/delete?ids=1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_view_echoes_parsed_ids() {
    let (status, body) = send(app(), get("/admin/users/delete?ids=3,,7")).await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["view"], "type.delete");
    assert_eq!(v["type"]["alias"], "users");
    assert_eq!(v["ids"], json!([3, 7]));
}

#[tokio::test]
async fn empty_ids_are_not_found() {
    let (status, _) = send(app(), get("/admin/users/delete")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/admin/users?ids=")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_view_wraps_foreign_columns() {
    let (status, body) = send(app(), get("/admin/posts/create")).await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["view"], "type.create");
    assert_eq!(v["columns"][0]["field"], "title");
    assert!(v["columns"][0]["foreign"].is_null());
    assert_eq!(v["columns"][1]["foreign"]["referenced_table"], "users");
}

#[tokio::test]
async fn bad_listing_options_are_rejected() {
    let (status, _) = send(app(), get("/admin/users?order=sideways")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(), get("/admin/users?by=password")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let (status, _) = send(app(), get("/admin/users/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_validation_failure_returns_message() {
    let req = json_request(Method::POST, "/admin/users", json!({ "name": "Ada" }));
    let res = app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"validation: email is required");
}

#[tokio::test]
async fn hook_rejection_returns_hook_message() {
    let req = json_request(Method::POST, "/admin/posts", json!({ "title": "draft" }));
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, "drafts cannot be published");
}

#[tokio::test]
async fn non_object_body_is_bad_request() {
    let req = json_request(Method::POST, "/admin/users", json!(["not", "a", "record"]));
    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_is_required_when_configured() {
    let settings = AdminSettings {
        token: Some("s3cret".into()),
        ..AdminSettings::default()
    };

    let (status, _) = send(app_with(settings.clone()), get("/admin")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/admin")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app_with(settings.clone()), wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let right = Request::builder()
        .uri("/admin")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app_with(settings), right).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn root_prefix_mounts_at_slash() {
    let settings = AdminSettings {
        prefix: String::new(),
        ..AdminSettings::default()
    };
    let (status, body) = send(app_with(settings), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"view\":\"welcome\""));
}
