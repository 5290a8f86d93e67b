use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 图书实体，同时也是缓存中保存的快照格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub isbn: String,
    pub publication_year: i32,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author_id: i64,
    pub isbn: String,
    pub publication_year: i32,
    pub description: String,
}

/// 部分更新，`None` 的字段保持不变
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
}

impl BookChanges {
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author_id) = self.author_id {
            book.author_id = author_id;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(year) = self.publication_year {
            book.publication_year = year;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
    }
}
