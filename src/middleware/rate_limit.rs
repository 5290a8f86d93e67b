use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{AppState, cache::keys::rate_limit_key, error::AppError};

/// 客户端 IP：x-real-ip，其次 x-forwarded-for 的第一项，再次连接地址
pub fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

/// 固定窗口限流，计数存放在键值缓存中；缓存不可用时放行
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.rate_limit_requests;
    if limit == 0 {
        return Ok(next.run(req).await);
    }

    let ip = client_ip(&req);
    let window = state.config.rate_limit_window();

    match state.cache.incr(&rate_limit_key(&ip), window).await {
        Ok(count) if count > u64::from(limit) => {
            tracing::info!(ip, count, "rate limit exceeded");
            return Err(AppError::TooManyRequests {
                retry_after: window.as_secs(),
            });
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(ip, error = %e, "rate limit check failed, allowing request"),
    }

    Ok(next.run(req).await)
}
