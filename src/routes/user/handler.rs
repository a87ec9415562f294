use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    error::AppError,
    extractors::ApiJson,
    middleware::CurrentUser,
    routes::blog::UserSummary,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{self, LoginRequest, LoginResponse, SendCodeRequest, SignResponse};

#[axum::debug_handler]
pub async fn send_code(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendCodeRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    model::send_code(&state, &req.phone).await?;
    Ok(success_to_api_response(()))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let resp = model::login(&state, &req).await?;
    Ok(success_to_api_response(resp))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserSummary>>, AppError> {
    let user_id = user.require()?;
    let summary = model::me(&state, user_id).await?;
    Ok(success_to_api_response(summary))
}

#[axum::debug_handler]
pub async fn sign(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<SignResponse>>, AppError> {
    let user_id = user.require()?;
    let resp = model::sign(&state, user_id, model::today()).await?;
    Ok(success_to_api_response(resp))
}

#[axum::debug_handler]
pub async fn sign_streak(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<u32>>, AppError> {
    let user_id = user.require()?;
    let streak = state
        .attendance()
        .current_streak(user_id, model::today())
        .await?;
    Ok(success_to_api_response(streak))
}
