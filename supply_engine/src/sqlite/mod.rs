//! SQLite backend for the Supply Gateway engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
