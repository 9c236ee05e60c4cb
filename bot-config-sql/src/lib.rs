//! SQL engines for the bot config store.
//!
//! This crate persists bot config records in a single `bot_config` table,
//! supporting SQLite, MySQL, and PostgreSQL through feature flags.
//!
//! # Features
//!
//! - **`sqlite`** - Enables SQLite database support
//! - **`mysql`** - Enables MySQL database support
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! All features are enabled by default. You can selectively enable only the databases you need:
//!
//! ```toml
//! [dependencies]
//! bot-config-sql = { version = "0.1", default-features = false, features = ["postgres"] }
//! ```
//!
//! # Usage
//!
//! The main type is [`Sql<DB>`], a generic wrapper around a SQLx connection pool that
//! implements the [`Engine`](bot_config::Engine) trait. Run the migrations of
//! `bot-config-sql-migrator` before using it.
//!
//! ```rust,ignore
//! use bot_config::{ConfigStore, PublishTarget};
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! let pool = SqlitePoolOptions::new()
//!     .connect("sqlite:bots.db")
//!     .await?;
//!
//! let store: ConfigStore = bot_config_sql::Sqlite::from(pool).into();
//!
//! store.create_draft("bot1").await?;
//! store.publish_snapshot("bot1", "v1.0", PublishTarget::Aiui).await?;
//! ```
//!
//! ## Type Aliases
//!
//! - [`Sqlite`] - `Sql<sqlx::Sqlite>`
//! - [`MySql`] - `Sql<sqlx::MySql>`
//! - [`Postgres`] - `Sql<sqlx::Postgres>`
//!
//! # Storage
//!
//! Configuration payloads are stored as JSON text. Publish status is a
//! `SMALLINT` bitmask updated in place with bitwise expressions.

mod sql;

pub use sql::*;
