use std::sync::Arc;

use auth::TokenService;
use cache::{BookCache, KeyValueCache};
use config::Config;
use database::{BookStore, UserStore};

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub books: Arc<dyn BookStore>,
    pub cache: Arc<dyn KeyValueCache>,
    pub book_cache: Arc<BookCache>,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        books: Arc<dyn BookStore>,
        cache: Arc<dyn KeyValueCache>,
    ) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        );
        let book_cache = BookCache::new(
            books.clone(),
            cache.clone(),
            config.book_cache_ttl(),
            config.io_timeout(),
        );

        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users,
            books,
            cache,
            book_cache: Arc::new(book_cache),
        }
    }
}
