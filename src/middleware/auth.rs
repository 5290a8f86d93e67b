// 认证与角色校验中间件
// Authorization 头必须使用 Bearer 方案；所有失败都返回相同的 401

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    AppState,
    auth::Claims,
    cache::TokenCacheOperations,
    database::models::Role,
    error::AppError,
};

/// 认证成功后挂在请求扩展上的身份信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
    pub jti: String,
    pub expires_at: i64,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            role: claims.role,
            jti: claims.jti,
            expires_at: claims.exp,
        }
    }
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !request.headers().contains_key(AUTHORIZATION) {
        tracing::debug!(uri = %request.uri(), "missing authorization header");
        return Err(AppError::Unauthorized);
    }

    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        tracing::debug!(uri = %request.uri(), "authorization header is not a bearer token");
        return Err(AppError::Unauthorized);
    };

    let claims = state.tokens.verify_access(bearer.token()).map_err(|e| {
        tracing::debug!(error = %e, "rejected access token");
        AppError::Unauthorized
    })?;

    if TokenCacheOperations::is_revoked(state.cache.as_ref(), &claims.jti).await {
        tracing::debug!(username = %claims.username, "rejected revoked access token");
        return Err(AppError::Unauthorized);
    }

    let context = AuthContext::from(claims);
    tracing::debug!(username = %context.username, role = %context.role, "authenticated request");
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// 没有认证上下文时一律拒绝
pub fn authorize(context: Option<&AuthContext>, required: Role) -> Result<(), AppError> {
    match context {
        Some(context) if context.role == required => Ok(()),
        Some(context) => {
            tracing::debug!(
                username = %context.username,
                role = %context.role,
                required = %required,
                "insufficient role"
            );
            Err(AppError::Forbidden)
        }
        None => Err(AppError::Forbidden),
    }
}

/// 必须放在 `authenticate` 之后
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    authorize(request.extensions().get::<AuthContext>(), Role::Admin)?;
    Ok(next.run(request).await)
}
