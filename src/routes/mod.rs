pub mod auth;
pub mod book;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    middleware::{authenticate, log_errors, rate_limit, require_admin},
};

/// 构建完整路由：公开路由、需要认证的路由、需要管理员角色的路由
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .route("/books", get(book::list_books))
        .route("/books/{id}", get(book::get_book));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/books", post(book::create_book))
        .route("/books/{id}", put(book::update_book))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    // 后添加的层先执行：先认证，再检查角色
    let admin_routes = Router::new()
        .route("/books/{id}", delete(book::delete_book))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    let router = router
        .layer(from_fn(log_errors))
        .layer(from_fn_with_state(state.clone(), rate_limit));

    // 开发模式下允许所有来源跨域
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
