//! Admin panel routes mounted under the configured prefix.

use crate::handlers::{create, delete, destroy, edit, index, show, store, update, welcome};
use crate::middleware::require_token;
use crate::state::AdminState;
use axum::{
    middleware,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Controller routes under `prefix`. Every path also answers with a trailing slash.
fn controller_routes(prefix: &str) -> Router<AdminState> {
    let table: [(&str, MethodRouter<AdminState>); 6] = [
        ("", get(welcome)),
        ("/:type", get(index).post(store).delete(destroy)),
        ("/:type/create", get(create)),
        ("/:type/delete", get(delete)),
        ("/:type/:id", get(show).put(update).patch(update)),
        ("/:type/:id/edit", get(edit)),
    ];
    table.into_iter().fold(Router::new(), |router, (path, handler)| {
        let path = format!("{}{}", prefix, path);
        if path.is_empty() {
            return router.route("/", handler);
        }
        router
            .route(&path, handler.clone())
            .route(&format!("{}/", path), handler)
    })
}

/// All admin routes under `settings.prefix`, behind the bearer-token gate, with request
/// tracing and a 2 MiB body limit.
pub fn admin_routes(state: AdminState) -> Router {
    controller_routes(&state.settings.prefix)
        .layer(middleware::from_fn_with_state(state.settings.clone(), require_token))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
