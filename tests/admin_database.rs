//! End-to-end admin flows against a live PostgreSQL. Each test works in its own schema.
//! Skipped unless `DATABASE_URL` is set.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use seamless_admin::{admin_routes, resolve, AdminConfig, AdminSettings, AdminState};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

struct TestDb {
    pool: PgPool,
    schema: String,
}

impl TestDb {
    async fn connect() -> Option<TestDb> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        };
        let pool = PgPoolOptions::new().max_connections(4).connect(&url).await.unwrap();
        let schema = format!("admin_test_{}", uuid::Uuid::new_v4().simple());
        let wide_columns: Vec<String> = (0..60).map(|i| format!("c{} TEXT", i)).collect();
        let statements = [
            format!("CREATE SCHEMA {}", schema),
            format!(
                "CREATE TABLE {}.users (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE,
                    password_hash TEXT,
                    created_at TIMESTAMPTZ,
                    updated_at TIMESTAMPTZ
                )",
                schema
            ),
            format!(
                "CREATE TABLE {0}.posts (
                    id BIGSERIAL PRIMARY KEY,
                    title TEXT NOT NULL,
                    user_id BIGINT REFERENCES {0}.users(id)
                )",
                schema
            ),
            format!("CREATE TABLE {}.wide (id BIGSERIAL PRIMARY KEY, {})", schema, wide_columns.join(", ")),
        ];
        for sql in &statements {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }
        Some(TestDb { pool, schema })
    }

    fn app(&self) -> Router {
        let config: AdminConfig = serde_json::from_value(json!({
            "models": [
                {
                    "alias": "users",
                    "schema": self.schema,
                    "table": "users",
                    "fillable": ["name", "email"],
                    "hidden": ["password_hash"],
                    "timestamps": true,
                    "validation": { "email": { "format": "email" } }
                },
                { "alias": "posts", "schema": self.schema, "table": "posts", "fillable": ["title", "user_id"] },
                { "alias": "wide", "schema": self.schema, "table": "wide" }
            ]
        }))
        .unwrap();
        let state = AdminState::new(self.pool.clone(), resolve(&config).unwrap(), AdminSettings::default());
        admin_routes(state)
    }

    async fn seed_user(&self, name: &str, email: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!(
            "INSERT INTO {}.users (name, email, password_hash) VALUES ($1, $2, 'x') RETURNING id",
            self.schema
        ))
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}.{}", self.schema, table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    async fn cleanup(self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .unwrap();
    }
}

async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    };
    app.oneshot(req.unwrap()).await.unwrap()
}

async fn json_body(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(res: &Response) -> &str {
    res.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn index_lists_seeded_rows_with_search_and_paging() {
    let Some(db) = TestDb::connect().await else { return };
    db.seed_user("Ada", "ada@example.com").await;
    db.seed_user("Grace", "grace@example.com").await;

    let res = call(db.app(), Method::GET, "/admin/users?by=name&order=asc", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let v = json_body(res).await;
    assert_eq!(v["view"], "type.index");
    assert_eq!(v["fillable"], json!(["name", "email"]));
    assert_eq!(v["data"]["total"], 2);
    assert_eq!(v["data"]["data"][0]["name"], "Ada");
    assert_eq!(v["data"]["data"][1]["name"], "Grace");
    assert!(v["data"]["data"][0].get("password_hash").is_none());

    let v = json_body(call(db.app(), Method::GET, "/admin/users?q=GRA", None).await).await;
    assert_eq!(v["data"]["total"], 1);
    assert_eq!(v["data"]["data"][0]["email"], "grace@example.com");

    let res = call(db.app(), Method::GET, "/admin/users?page=1000000000000000000", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let v = json_body(res).await;
    assert_eq!(v["data"]["data"], json!([]));
    assert_eq!(v["data"]["total"], 2);

    db.cleanup().await;
}

#[tokio::test]
async fn store_update_and_destroy_redirect() {
    let Some(db) = TestDb::connect().await else { return };

    let body = json!({ "name": "Ada", "email": "ada@example.com", "password_hash": "ignored" });
    let res = call(db.app(), Method::POST, "/admin/users", Some(body)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let id: i64 = sqlx::query_scalar(&format!("SELECT id FROM {}.users", db.schema))
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(location(&res), format!("/admin/users/{}", id));
    let hash: Option<String> = sqlx::query_scalar(&format!("SELECT password_hash FROM {}.users", db.schema))
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(hash, None);

    let uri = format!("/admin/users/{}", id);
    let res = call(db.app(), Method::PUT, &uri, Some(json!({ "name": "Ada Lovelace" }))).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), uri);
    let name: String = sqlx::query_scalar(&format!("SELECT name FROM {}.users", db.schema))
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(name, "Ada Lovelace");

    let res = call(db.app(), Method::DELETE, &format!("/admin/users?ids={}", id), None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/admin/users");
    assert_eq!(db.count("users").await, 0);

    db.cleanup().await;
}

#[tokio::test]
async fn show_and_edit_return_the_row() {
    let Some(db) = TestDb::connect().await else { return };
    let id = db.seed_user("Ada", "ada@example.com").await;

    let v = json_body(call(db.app(), Method::GET, &format!("/admin/users/{}", id), None).await).await;
    assert_eq!(v["view"], "type.show");
    assert_eq!(v["data"], json!({ "name": "Ada", "email": "ada@example.com", "password_hash": "x", "id": id }));

    let v = json_body(call(db.app(), Method::GET, &format!("/admin/users/{}/edit", id), None).await).await;
    assert_eq!(v["view"], "type.edit");
    assert_eq!(v["data"], json!({ "name": "Ada", "email": "ada@example.com", "id": id }));
    let fields: Vec<&str> = v["columns"].as_array().unwrap().iter().map(|c| c["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["name", "email"]);

    let v = json_body(call(db.app(), Method::GET, "/admin/users/999999", None).await).await;
    assert!(v["data"].is_null());

    let v = json_body(call(db.app(), Method::GET, "/admin/posts/create", None).await).await;
    assert_eq!(v["columns"][1]["field"], "user_id");
    assert_eq!(v["columns"][1]["foreign"]["referenced_table"], "users");

    db.cleanup().await;
}

#[tokio::test]
async fn database_errors_come_back_as_their_message() {
    let Some(db) = TestDb::connect().await else { return };
    db.seed_user("Ada", "ada@example.com").await;

    let body = json!({ "name": "Other Ada", "email": "ada@example.com" });
    let res = call(db.app(), Method::POST, "/admin/users", Some(body)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        text_body(res).await,
        "duplicate key value violates unique constraint \"users_email_key\""
    );

    let res = call(db.app(), Method::PUT, "/admin/users/999999", Some(json!({ "name": "Nobody" }))).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(text_body(res).await, "not found: no users with key 999999");

    db.cleanup().await;
}

#[tokio::test]
async fn wide_tables_load_every_column() {
    let Some(db) = TestDb::connect().await else { return };
    let id: i64 = sqlx::query_scalar(&format!("INSERT INTO {}.wide (c59) VALUES ('last') RETURNING id", db.schema))
        .fetch_one(&db.pool)
        .await
        .unwrap();

    let res = call(db.app(), Method::GET, &format!("/admin/wide/{}/edit", id), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let v = json_body(res).await;
    assert_eq!(v["columns"].as_array().unwrap().len(), 60);
    assert_eq!(v["data"]["c59"], "last");
    assert_eq!(v["data"]["id"], id);

    db.cleanup().await;
}
