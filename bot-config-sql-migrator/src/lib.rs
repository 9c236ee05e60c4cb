//! SQL schema migrations for the bot config store.
//!
//! This crate provides the migrations that create and evolve the `bot_config`
//! table used by `bot-config-sql`. It supports SQLite, MySQL, and PostgreSQL
//! through feature flags.
//!
//! # Features
//!
//! - **`sqlite`** - Enables SQLite database support
//! - **`mysql`** - Enables MySQL database support
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! All features are enabled by default.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlx_migrator::{Migrate, Plan};
//!
//! let mut conn = pool.acquire().await?;
//!
//! let migrator = bot_config_sql_migrator::new::<sqlx::Sqlite>()?;
//! migrator.run(&mut *conn, &Plan::apply_all()).await?;
//! ```
//!
//! # Migrations
//!
//! - [`InitMigration`] - Creates the `bot_config` table, one row per bot
//! - [`M0002`] - Adds the `version` column and the (`bot_id`, `version`) unique index
//! - [`M0003`] - Adds `publish_status`, `publish_data` and their lookup index
//!
//! # Database Schema
//!
//! After running all migrations:
//!
//! | Column | Type | Description |
//! |--------|------|-------------|
//! | `id` | INTEGER / BIGINT | Auto-increment row identifier |
//! | `bot_id` | VARCHAR(64) | Bot identifier |
//! | `config` | TEXT | Configuration payload (JSON) |
//! | `version` | VARCHAR(32) | `-1` for the draft, the published version otherwise |
//! | `publish_status` | SMALLINT | Bitmask of publish targets |
//! | `publish_data` | TEXT NULL | Configuration captured at publish time (JSON) |

use sqlx_migrator::{Info, Migrator};

mod m0001;
mod m0002;
mod m0003;

pub use m0001::InitMigration;
pub use m0002::M0002;
pub use m0003::M0003;

/// Creates a new [`Migrator`] instance with all bot config migrations registered.
///
/// # Example
///
/// ```rust,ignore
/// use sqlx_migrator::{Migrate, Plan};
///
/// let migrator = bot_config_sql_migrator::new::<sqlx::Postgres>()?;
/// migrator.run(&mut *conn, &Plan::apply_all()).await?;
/// ```
///
/// # Errors
///
/// Returns an error if migration registration fails.
pub fn new<DB: sqlx::Database>() -> Result<Migrator<DB>, sqlx_migrator::Error>
where
    InitMigration: sqlx_migrator::Migration<DB>,
    M0002: sqlx_migrator::Migration<DB>,
    M0003: sqlx_migrator::Migration<DB>,
{
    let mut migrator = Migrator::default();
    migrator.add_migration(Box::new(InitMigration))?;
    migrator.add_migration(Box::new(M0002))?;
    migrator.add_migration(Box::new(M0003))?;

    Ok(migrator)
}
