use serde::{Deserialize, Serialize};

use crate::database::models::{BookChanges, NewBook};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author_id: i64,
    pub isbn: String,
    pub publication_year: i32,
    pub description: String,
}

impl CreateBookRequest {
    pub fn into_new_book(self) -> Result<NewBook, String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if self.isbn.trim().is_empty() {
            return Err("isbn must not be empty".into());
        }
        Ok(NewBook {
            title: self.title,
            author_id: self.author_id,
            isbn: self.isbn,
            publication_year: self.publication_year,
            description: self.description,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
}

impl From<UpdateBookRequest> for BookChanges {
    fn from(req: UpdateBookRequest) -> Self {
        BookChanges {
            // 空字符串视为未提供
            title: req.title.filter(|t| !t.trim().is_empty()),
            author_id: req.author_id,
            isbn: req.isbn.filter(|i| !i.trim().is_empty()),
            publication_year: req.publication_year,
            description: req.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteBookResponse {
    pub message: String,
}
