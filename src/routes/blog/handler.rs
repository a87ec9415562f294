use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    database::models::NewBlog,
    error::AppError,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::CurrentUser,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{self, BlogView, HotQuery, ScrollQuery, ScrollResult, UserSummary};

#[axum::debug_handler]
pub async fn save_blog(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<NewBlog>,
) -> Result<Json<ApiResponse<i64>>, AppError> {
    let author_id = user.require()?;
    let id = model::save_blog(&state, author_id, &req).await?;
    Ok(success_to_api_response(id))
}

#[axum::debug_handler]
pub async fn hot_blogs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<HotQuery>,
) -> Result<Json<ApiResponse<Vec<BlogView>>>, AppError> {
    let blogs = model::hot_blogs(&state, query.current.unwrap_or(1), user).await?;
    Ok(success_to_api_response(blogs))
}

#[axum::debug_handler]
pub async fn get_blog(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<BlogView>>, AppError> {
    let blog = model::blog_by_id(&state, id, user).await?;
    Ok(success_to_api_response(blog))
}

#[axum::debug_handler]
pub async fn like_blog(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let user_id = user.require()?;
    let liked = state.like_ledger().toggle(id, user_id).await?;
    Ok(success_to_api_response(liked))
}

#[axum::debug_handler]
pub async fn likes_of_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, AppError> {
    let users = model::top_likers(&state, id).await?;
    Ok(success_to_api_response(users))
}

#[axum::debug_handler]
pub async fn of_follow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<ScrollQuery>,
) -> Result<Json<ApiResponse<ScrollResult>>, AppError> {
    let user_id = user.require()?;
    let cursor = query.cursor()?;
    let page = model::scroll_follow_feed(&state, user_id, cursor).await?;
    Ok(success_to_api_response(page))
}
