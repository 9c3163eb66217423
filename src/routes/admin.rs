use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// The account console, nested under `/admin`.
///
/// Access Control:
/// The listing is gated by the admin rule inside the request gate: the body's
/// credentials are verified (401) and the account must hold the administrator role (403).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/users
        // Every account profile. Credentials travel in the body of the GET.
        .route("/users", get(handlers::list_accounts))
        // GET /admin/users/{id}
        // One profile by id. Open: a profile carries no secret.
        .route("/users/{id}", get(handlers::get_account))
}

/// Category mutations. Same admin rule, mounted at the root beside the open category reads.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        // POST /categories
        .route("/categories", post(handlers::create_category))
        // PUT/DELETE /categories/{id}
        // Delete detaches the category from every post first; the posts stay.
        .route(
            "/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
}
