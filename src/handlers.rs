use crate::{
    AppState,
    auth::Credentials,
    error::{ApiError, ApiResult},
    gate::{self, Outcome},
    models::{
        AccountProfile, AttachCategoriesRequest, Category, CategoryRequest, Comment,
        CommentRequest, LoginResponse, Post, PostRequest, RegisterRequest, RegisteredAccount,
        SearchPostsRequest, UpdateAccountRequest,
    },
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

// Extractor results are taken as `Result` so that malformed bodies and ids surface as
// `ValidationFailed` in the shared error shape instead of axum's plain-text rejections.
type Body<T> = Result<Json<T>, JsonRejection>;
type Id<T> = Result<Path<T>, PathRejection>;

// --- Accounts ---

/// register_user
///
/// [Open Route] Creates an account. Returns 201 with the new profile.
pub async fn register_user(
    State(state): State<AppState>,
    payload: Body<RegisterRequest>,
) -> ApiResult<Outcome<RegisteredAccount>> {
    let Json(payload) = payload?;
    gate::register(state.repo.as_ref(), payload).await
}

/// login
///
/// [Open Route] Checks an email/password pair and reports the role name.
pub async fn login(
    State(state): State<AppState>,
    payload: Body<Credentials>,
) -> ApiResult<Outcome<LoginResponse>> {
    let Json(credentials) = payload?;
    gate::login(state.repo.as_ref(), credentials).await
}

/// get_account
///
/// [Open Route] Public profile of one account. The password is never part of it.
pub async fn get_account(
    State(state): State<AppState>,
    id: Id<i64>,
) -> ApiResult<Json<AccountProfile>> {
    let Path(id) = id?;
    state
        .repo
        .get_account(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// list_accounts
///
/// [Admin Route] Every account profile. Credentials travel in the request body.
pub async fn list_accounts(
    State(state): State<AppState>,
    payload: Body<Credentials>,
) -> ApiResult<Outcome<Vec<AccountProfile>>> {
    let Json(credentials) = payload?;
    gate::list_accounts(state.repo.as_ref(), credentials).await
}

/// update_account
///
/// [Owner Route] Self-service profile edit.
pub async fn update_account(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<UpdateAccountRequest>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    gate::update_account(state.repo.as_ref(), id, payload).await
}

/// delete_account
///
/// [Owner Route] Removes the caller's own account.
pub async fn delete_account(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<Credentials>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(credentials) = payload?;
    gate::delete_account(state.repo.as_ref(), id, credentials).await
}

// --- Posts ---

/// get_posts
///
/// [Open Route] Every post, newest first. Served at `/`, `/home` and `/posts`.
pub async fn get_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.repo.list_posts().await?))
}

/// get_post
///
/// [Open Route] A single post.
pub async fn get_post(State(state): State<AppState>, id: Id<i64>) -> ApiResult<Json<Post>> {
    let Path(id) = id?;
    state
        .repo
        .get_post(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

/// search_posts
///
/// [Open Route] Posts whose title contains the given fragment.
/// No match is a `NotFound`.
pub async fn search_posts(
    State(state): State<AppState>,
    payload: Body<SearchPostsRequest>,
) -> ApiResult<Json<Vec<Post>>> {
    let Json(payload) = payload?;
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Missing required field: title"));
    }

    let posts = state.repo.search_posts(title).await?;
    if posts.is_empty() {
        return Err(ApiError::not_found("No posts match that title"));
    }
    Ok(Json(posts))
}

/// get_posts_by_category
///
/// [Open Route] Posts tagged with a category. Untagged and unknown categories both
/// give an empty list.
pub async fn get_posts_by_category(
    State(state): State<AppState>,
    id: Id<i64>,
) -> ApiResult<Json<Vec<Post>>> {
    let Path(category_id) = id?;
    Ok(Json(state.repo.posts_by_category(category_id).await?))
}

/// create_post
///
/// [Owner Route] The verified caller becomes the post's owner.
pub async fn create_post(
    State(state): State<AppState>,
    payload: Body<PostRequest>,
) -> ApiResult<Outcome<Post>> {
    let Json(payload) = payload?;
    gate::create_post(state.repo.as_ref(), payload).await
}

/// update_post
pub async fn update_post(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<PostRequest>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    gate::update_post(state.repo.as_ref(), id, payload).await
}

/// delete_post
///
/// [Owner Route] Removes the post together with its comments and category links.
pub async fn delete_post(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<Credentials>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(credentials) = payload?;
    gate::delete_post(state.repo.as_ref(), id, credentials).await
}

/// get_post_categories
///
/// [Open Route] Categories attached to a post, in attachment order.
pub async fn get_post_categories(
    State(state): State<AppState>,
    id: Id<i64>,
) -> ApiResult<Json<Vec<Category>>> {
    let Path(post_id) = id?;
    if state.repo.get_post(post_id).await?.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }
    Ok(Json(state.repo.categories_for_post(post_id).await?))
}

/// attach_categories
///
/// [Owner Route] Tags a post with one or more categories.
pub async fn attach_categories(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<AttachCategoriesRequest>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    gate::attach_categories(state.repo.as_ref(), id, payload).await
}

// --- Comments ---

/// get_comments
///
/// [Open Route] Comments on a post, oldest first. A post without comments is a `NotFound`.
pub async fn get_comments(
    State(state): State<AppState>,
    id: Id<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    let Path(post_id) = id?;
    let comments = state.repo.comments_for_post(post_id).await?;
    if comments.is_empty() {
        return Err(ApiError::not_found("No comments found for this post"));
    }
    Ok(Json(comments))
}

/// add_comment
pub async fn add_comment(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<CommentRequest>,
) -> ApiResult<Outcome<Comment>> {
    let Path(post_id) = id?;
    let Json(payload) = payload?;
    gate::create_comment(state.repo.as_ref(), post_id, payload).await
}

/// update_comment
pub async fn update_comment(
    State(state): State<AppState>,
    ids: Id<(i64, i64)>,
    payload: Body<CommentRequest>,
) -> ApiResult<Outcome> {
    let Path((post_id, comment_id)) = ids?;
    let Json(payload) = payload?;
    gate::update_comment(state.repo.as_ref(), post_id, comment_id, payload).await
}

/// delete_comment
///
/// [Owner Route] The comment must belong to the post named in the path.
pub async fn delete_comment(
    State(state): State<AppState>,
    ids: Id<(i64, i64)>,
    payload: Body<Credentials>,
) -> ApiResult<Outcome> {
    let Path((post_id, comment_id)) = ids?;
    let Json(credentials) = payload?;
    gate::delete_comment(state.repo.as_ref(), post_id, comment_id, credentials).await
}

// --- Categories ---

/// get_categories
pub async fn get_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.repo.list_categories().await?))
}

/// get_category
pub async fn get_category(
    State(state): State<AppState>,
    id: Id<i64>,
) -> ApiResult<Json<Category>> {
    let Path(id) = id?;
    state
        .repo
        .get_category(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

/// create_category
///
/// [Admin Route] Returns 201 with the new category.
pub async fn create_category(
    State(state): State<AppState>,
    payload: Body<CategoryRequest>,
) -> ApiResult<Outcome<Category>> {
    let Json(payload) = payload?;
    gate::create_category(state.repo.as_ref(), payload).await
}

/// update_category
pub async fn update_category(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<CategoryRequest>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    gate::update_category(state.repo.as_ref(), id, payload).await
}

/// delete_category
///
/// [Admin Route] Detaches the category from every post, then removes it.
pub async fn delete_category(
    State(state): State<AppState>,
    id: Id<i64>,
    payload: Body<Credentials>,
) -> ApiResult<Outcome> {
    let Path(id) = id?;
    let Json(credentials) = payload?;
    gate::delete_category(state.repo.as_ref(), id, credentials).await
}
