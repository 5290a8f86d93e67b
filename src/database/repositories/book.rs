use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{Book, BookChanges, NewBook};
use crate::database::{BookStore, StoreError};

/// 图书存储库的 Postgres 实现
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author_id, isbn, publication_year, description
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author_id, isbn, publication_year, description
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, isbn, publication_year, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author_id, isbn, publication_year, description
            "#,
        )
        .bind(book.title)
        .bind(book.author_id)
        .bind(book.isbn)
        .bind(book.publication_year)
        .bind(book.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, StoreError> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                author_id = COALESCE($2, author_id),
                isbn = COALESCE($3, isbn),
                publication_year = COALESCE($4, publication_year),
                description = COALESCE($5, description)
            WHERE id = $6
            RETURNING id, title, author_id, isbn, publication_year, description
            "#,
        )
        .bind(changes.title)
        .bind(changes.author_id)
        .bind(changes.isbn)
        .bind(changes.publication_year)
        .bind(changes.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
