// 内存存储实现
// 供 STORAGE_BACKEND=memory 和测试使用

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::models::{Book, BookChanges, NewBook, NewUser, User};
use super::{BookStore, StoreError, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // 持锁期间不会 panic，中毒时直接取回数据
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<BTreeMap<String, User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users).get(username).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = lock(&self.users);
        if users.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        let created = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(created.username.clone(), created.clone());
        Ok(created)
    }
}

/// Book store that also counts primary lookups, so callers can observe
/// whether a read was served from cache.
#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<BTreeMap<i64, Book>>,
    next_id: AtomicI64,
    lookups: AtomicUsize,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a book with a caller-chosen id, replacing any existing one.
    pub fn seed(&self, book: Book) {
        self.next_id.fetch_max(book.id, Ordering::Relaxed);
        lock(&self.books).insert(book.id, book);
    }

    /// Number of `find_by_id` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.books).get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(lock(&self.books).values().cloned().collect())
    }

    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let created = Book {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            title: book.title,
            author_id: book.author_id,
            isbn: book.isbn,
            publication_year: book.publication_year,
            description: book.description,
        };
        lock(&self.books).insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, StoreError> {
        let mut books = lock(&self.books);
        let book = books.get_mut(&id).ok_or(StoreError::NotFound)?;
        changes.apply(book);
        Ok(book.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        lock(&self.books)
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let users = MemoryUserStore::new();
        let new_user = || NewUser {
            username: "alice".into(),
            password_hash: "hash".into(),
            role: Role::User,
        };

        let first = users.insert(new_user()).await.unwrap();
        assert_eq!(first.id, 1);
        assert!(matches!(
            users.insert(new_user()).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn seeded_ids_do_not_collide_with_new_books() {
        let books = MemoryBookStore::new();
        books.seed(Book {
            id: 42,
            title: "Seeded".into(),
            author_id: 1,
            isbn: "isbn".into(),
            publication_year: 2000,
            description: String::new(),
        });

        let created = books
            .insert(NewBook {
                title: "Next".into(),
                author_id: 1,
                isbn: "isbn-2".into(),
                publication_year: 2001,
                description: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 43);

        assert!(books.find_by_id(42).await.unwrap().is_some());
        assert_eq!(books.lookups(), 1);
        books.delete(42).await.unwrap();
        assert!(matches!(books.delete(42).await, Err(StoreError::NotFound)));
    }
}
