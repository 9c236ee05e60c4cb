//! Initial schema migration.
//!
//! Creates the `bot_config` table in its pre-versioning shape: one row per bot.

mod bot_config;

use sqlx_migrator::vec_box;

/// Initial migration that creates the `bot_config` table.
///
/// ## Table
///
/// - `id` - Auto-increment row identifier (INTEGER on SQLite, BIGINT elsewhere)
/// - `bot_id` - Bot identifier (VARCHAR(64))
/// - `config` - Configuration payload as JSON text
///
/// ## Indexes
///
/// - `uk_bot_config_bot_id` - Unique constraint on `bot_id` (replaced in [`M0002`](crate::M0002))
pub struct InitMigration;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    InitMigration,
    "main",
    "init_migration",
    vec_box![],
    vec_box![
        bot_config::create_table::Operation,
        bot_config::create_bot_id_uk::Operation,
    ]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    InitMigration,
    "main",
    "init_migration",
    vec_box![],
    vec_box![
        bot_config::create_table::Operation,
        bot_config::create_bot_id_uk::Operation,
    ]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    InitMigration,
    "main",
    "init_migration",
    vec_box![],
    vec_box![
        bot_config::create_table::Operation,
        bot_config::create_bot_id_uk::Operation,
    ]
);
