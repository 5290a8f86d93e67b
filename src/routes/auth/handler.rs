use axum::{
    body::Bytes,
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::{hash_password, verify_password},
    cache::TokenCacheOperations,
    database::models::{NewUser, Role},
    error::AppError,
    middleware::AuthContext,
};

use super::model::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshTokenRequest, RefreshTokenResponse,
    RegisterRequest, RegisterResponse, TOKEN_TYPE,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    // bcrypt 计算较慢，放到阻塞线程池
    let cost = state.config.bcrypt_cost;
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

    let user = state
        .users
        .insert(NewUser {
            username: req.username,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!(username = %user.username, "registered user");
    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(user) = state.users.find_by_username(&req.username).await? else {
        tracing::info!(username = %req.username, "login for unknown user");
        return Err(AppError::Unauthorized);
    };

    let password = req.password;
    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(format!("failed to verify password: {e}")))?;
    if !valid {
        tracing::info!(username = %user.username, "login with invalid password");
        return Err(AppError::Unauthorized);
    }

    let pair = state.tokens.issue(&user.username, user.role)?;
    tracing::info!(username = %user.username, role = %user.role, "user logged in");

    Ok(Json(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.tokens.access_ttl_secs(),
    }))
}

#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = state.tokens.verify_refresh(&req.refresh_token).map_err(|e| {
        tracing::debug!(error = %e, "rejected refresh token");
        AppError::Unauthorized
    })?;

    if TokenCacheOperations::is_revoked(state.cache.as_ref(), &claims.jti).await {
        return Err(AppError::Unauthorized);
    }

    let access_token = state.tokens.issue_access(&claims.username, claims.role)?;

    Ok(Json(RefreshTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.tokens.access_ttl_secs(),
    }))
}

/// 吊销当前访问令牌；请求体中带上同一用户的刷新令牌时一并吊销
#[axum::debug_handler]
pub async fn logout(
    Extension(context): Extension<AuthContext>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    // 先校验刷新令牌，校验失败时不改变任何状态
    let refresh = match req.refresh_token {
        Some(refresh_token) => {
            let claims = state
                .tokens
                .verify_refresh(&refresh_token)
                .map_err(|_| AppError::BadRequest("Invalid refresh token".into()))?;
            if claims.username != context.username {
                return Err(AppError::Forbidden);
            }
            Some(claims)
        }
        None => None,
    };

    let cache = state.cache.as_ref();
    TokenCacheOperations::revoke(cache, &context.jti, context.expires_at)
        .await
        .map_err(|e| AppError::TransientStore(e.to_string()))?;
    if let Some(claims) = refresh {
        TokenCacheOperations::revoke(cache, &claims.jti, claims.exp)
            .await
            .map_err(|e| AppError::TransientStore(e.to_string()))?;
    }

    tracing::info!(username = %context.username, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}
