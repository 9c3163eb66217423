use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Authenticated Router Module
///
/// Endpoints that create a resource or act on one the caller owns.
///
/// Access Control Strategy:
/// No layer guards this router. Each handler passes the body's credentials to the
/// request gate, which verifies them (401), looks up the target (404) and applies the
/// owner rule (403) before touching the store. The owner of a new post or comment is
/// always the verified caller, never a value from the payload.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Accounts ---
        // PUT/DELETE /users/{id}
        // Self-service profile edit and account removal. Only the account itself qualifies.
        // Removal is refused with a 409 while the account still owns posts or comments.
        .route(
            "/users/{id}",
            put(handlers::update_account).delete(handlers::delete_account),
        )
        // --- Posts ---
        // POST /posts
        .route("/posts", post(handlers::create_post))
        // PUT/DELETE /posts/{id}
        // Delete runs the cascade: comments, then category links, then the post.
        .route(
            "/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        // POST /posts/{id}/categories
        // Attaches categories. Repeated ids and already-attached pairs are absorbed.
        .route("/posts/{id}/categories", post(handlers::attach_categories))
        // --- Comments ---
        // POST /posts/{id}/comments
        // Any verified caller may comment on an existing post.
        .route("/posts/{id}/comments", post(handlers::add_comment))
        // PUT/DELETE /posts/{id}/comments/{comment_id}
        // The comment must belong to the post in the path.
        .route(
            "/posts/{id}/comments/{comment_id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}
