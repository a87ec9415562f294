use axum::extract::{Json, State};

use crate::{
    AppState,
    database::models::{ShopEntity, ShopUpdate},
    error::AppError,
    extractors::{ApiJson, ApiPath, ApiQuery},
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{self, ShopTypeQuery};

#[axum::debug_handler]
pub async fn get_shop(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<ShopEntity>>, AppError> {
    let shop = model::find_shop(&state, id).await?;
    Ok(success_to_api_response(shop))
}

#[axum::debug_handler]
pub async fn shops_of_type(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ShopTypeQuery>,
) -> Result<Json<ApiResponse<Vec<ShopEntity>>>, AppError> {
    let shops = model::shops_of_type(&state, query.type_id, query.current.unwrap_or(1)).await?;
    Ok(success_to_api_response(shops))
}

#[axum::debug_handler]
pub async fn update_shop(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ShopUpdate>,
) -> Result<Json<ApiResponse<i64>>, AppError> {
    let id = model::update_shop(&state, &req).await?;
    Ok(success_to_api_response(id))
}
