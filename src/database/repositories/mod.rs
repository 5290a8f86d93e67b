// Postgres 存储库实现

mod book;
mod user;

pub use book::PgBookStore;
pub use user::PgUserStore;
