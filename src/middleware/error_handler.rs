use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};

/// 日志里最多记录的响应体字节数
const LOGGED_BODY_LIMIT: usize = 1024;

/// 记录 5xx 响应，响应体原样返回给客户端
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(
                "{} {} -> {}, failed to read response body: {}",
                method,
                uri,
                parts.status,
                e
            );
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let shown = &bytes[..bytes.len().min(LOGGED_BODY_LIMIT)];
    tracing::error!(
        "{} {} -> {} ({} bytes): {}",
        method,
        uri,
        parts.status,
        bytes.len(),
        String::from_utf8_lossy(shown)
    );

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/large",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "x".repeat(2000)) }),
            )
            .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
            .layer(axum::middleware::from_fn(log_errors))
    }

    async fn call(uri: &str) -> (StatusCode, usize) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.len())
    }

    #[tokio::test]
    async fn large_server_error_body_is_passed_through() {
        assert_eq!(call("/large").await, (StatusCode::SERVICE_UNAVAILABLE, 2000));
    }

    #[tokio::test]
    async fn client_errors_are_untouched() {
        assert_eq!(call("/missing").await, (StatusCode::NOT_FOUND, 4));
    }
}
