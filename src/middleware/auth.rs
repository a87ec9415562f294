use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, utils::verify_token};

/// 当前请求的调用者，只在请求范围内有效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentUser {
    Anonymous,
    Authenticated(i64),
}

impl CurrentUser {
    pub fn id(&self) -> Option<i64> {
        match self {
            CurrentUser::Anonymous => None,
            CurrentUser::Authenticated(id) => Some(*id),
        }
    }

    /// 需要登录的操作调用，未登录返回 `Unauthenticated`
    pub fn require(&self) -> Result<i64, AppError> {
        self.id().ok_or(AppError::Unauthenticated)
    }
}

/// 解析 `Authorization: Bearer <token>`，把调用者写入请求扩展
///
/// 不拦截请求：没有令牌或令牌无效都按匿名用户处理，由具体接口决定是否需要登录。
pub async fn auth_context(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim());

    let user = match token {
        Some(token) if !token.is_empty() => match verify_token(token, &state.config) {
            Ok(claims) => claims
                .user_id()
                .map(CurrentUser::Authenticated)
                .unwrap_or(CurrentUser::Anonymous),
            Err(e) => {
                tracing::debug!("Invalid token: {}", e);
                CurrentUser::Anonymous
            }
        },
        _ => CurrentUser::Anonymous,
    };

    req.extensions_mut().insert(user);
    next.run(req).await
}
