use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    middleware::{auth_context, log_errors},
    routes,
};

// 店铺路由
fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", put(routes::shop::update_shop))
        .route("/shops/of/type", get(routes::shop::shops_of_type))
        .route("/shops/{id}", get(routes::shop::get_shop))
}

// 探店笔记路由
fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", post(routes::blog::save_blog))
        .route("/blogs/hot", get(routes::blog::hot_blogs))
        .route("/blogs/of/follow", get(routes::blog::of_follow))
        .route("/blogs/{id}", get(routes::blog::get_blog))
        .route("/blogs/{id}/like", post(routes::blog::like_blog))
        .route("/blogs/{id}/likes", get(routes::blog::likes_of_blog))
}

// 关注路由
fn follow_routes() -> Router<AppState> {
    Router::new()
        .route("/follows/{id}/{is_follow}", put(routes::follow::follow))
        .route("/follows/or/not/{id}", get(routes::follow::is_follow))
        .route("/follows/common/{id}", get(routes::follow::common_follows))
}

// 用户路由
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/code", post(routes::user::send_code))
        .route("/users/login", post(routes::user::login))
        .route("/users/me", get(routes::user::me))
        .route("/users/sign", post(routes::user::sign))
        .route("/users/sign/streak", get(routes::user::sign_streak))
}

/// 创建主路由，所有接口挂在 `api_base_uri` 下
///
/// 是否需要登录由各接口自己判断，认证中间件只负责识别调用者。
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(shop_routes())
        .merge(blog_routes())
        .merge(follow_routes())
        .merge(user_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_context,
        ));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
