use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    error::AppError,
    extractors::ApiPath,
    middleware::CurrentUser,
    routes::blog::UserSummary,
    utils::{ApiResponse, success_to_api_response},
};

use super::model;

#[axum::debug_handler]
pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((target_id, is_follow)): ApiPath<(i64, bool)>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let user_id = user.require()?;
    state
        .follow_sets()
        .follow(user_id, target_id, is_follow)
        .await?;
    Ok(success_to_api_response(is_follow))
}

#[axum::debug_handler]
pub async fn is_follow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(target_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let user_id = user.require()?;
    let following = state.follow_sets().is_following(user_id, target_id).await?;
    Ok(success_to_api_response(following))
}

#[axum::debug_handler]
pub async fn common_follows(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(subject_id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, AppError> {
    let user_id = user.require()?;
    let users = model::common_follows(&state, user_id, subject_id).await?;
    Ok(success_to_api_response(users))
}
