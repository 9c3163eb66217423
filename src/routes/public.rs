use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no credentials. Everything here is a read, apart from the
/// identity entry points (`/register`, `/login`).
///
/// Account reads go through `AccountProfile`, so the stored secret never leaves the
/// repository through this router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Creates an account. All fields are required; a used email is a 409.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Checks an email/password pair and answers with the account's role name.
        .route("/login", post(handlers::login))
        // GET / , /home , /posts
        // The post listing, newest first. The landing page and `/home` serve the same data.
        .route("/", get(handlers::get_posts))
        .route("/home", get(handlers::get_posts))
        .route("/posts", get(handlers::get_posts))
        // POST /posts/search
        // Title substring search. The fragment travels in the body.
        .route("/posts/search", post(handlers::search_posts))
        // GET /posts/{id}
        .route("/posts/{id}", get(handlers::get_post))
        // GET /posts/{id}/categories
        // Categories attached to a post, in the order they were attached.
        .route("/posts/{id}/categories", get(handlers::get_post_categories))
        // GET /posts/{id}/comments
        // Comments on a post, oldest first. An empty thread is a 404.
        .route("/posts/{id}/comments", get(handlers::get_comments))
        // GET /categories , /categories/{id}
        .route("/categories", get(handlers::get_categories))
        .route("/categories/{id}", get(handlers::get_category))
        // GET /categories/{id}/posts
        // Posts tagged with the category.
        .route("/categories/{id}/posts", get(handlers::get_posts_by_category))
}
