use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    database::StoreError,
    error::AppError,
    middleware::AuthContext,
};

use super::model::{CreateBookRequest, DeleteBookResponse, UpdateBookRequest};

fn book_error(id: i64, err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::NotFound(format!("Book {id} not found")),
        other => other.into(),
    }
}

/// 没有图书时返回空数组，响应始终是同一种结构
#[axum::debug_handler]
pub async fn list_books(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let books = state.books.list().await?;
    Ok(Json(books))
}

/// 先查缓存，未命中再查数据库
#[axum::debug_handler]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let book = state
        .book_cache
        .fetch(id)
        .await
        .map_err(|e| book_error(id, e))?;
    Ok(Json(book))
}

#[axum::debug_handler]
pub async fn create_book(
    Extension(context): Extension<AuthContext>,
    State(state): State<AppState>,
    Json(req): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_book = req.into_new_book().map_err(AppError::BadRequest)?;
    let book = state.books.insert(new_book).await?;

    tracing::info!(book_id = book.id, username = %context.username, "created book");
    Ok((StatusCode::CREATED, Json(book)))
}

/// 写入成功后立即删除缓存快照
#[axum::debug_handler]
pub async fn update_book(
    Extension(context): Extension<AuthContext>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let book = state
        .books
        .update(id, req.into())
        .await
        .map_err(|e| book_error(id, e))?;
    state.book_cache.invalidate(id).await;

    tracing::info!(book_id = id, username = %context.username, "updated book");
    Ok(Json(book))
}

#[axum::debug_handler]
pub async fn delete_book(
    Extension(context): Extension<AuthContext>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state
        .books
        .delete(id)
        .await
        .map_err(|e| book_error(id, e))?;
    state.book_cache.invalidate(id).await;

    tracing::info!(book_id = id, username = %context.username, "deleted book");
    Ok(Json(DeleteBookResponse {
        message: format!("Book {id} deleted"),
    }))
}
