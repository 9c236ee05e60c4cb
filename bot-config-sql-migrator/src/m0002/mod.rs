//! Migration adding versions.
//!
//! Lets a bot own several rows: the draft plus its published snapshots.

mod bot_config;

use sqlx_migrator::vec_box;

/// Migration that adds the `version` column.
///
/// ## Changes
///
/// - Adds `version` column (VARCHAR(32), NOT NULL, DEFAULT `'-1'`); existing
///   rows become drafts
/// - Drops the unique `uk_bot_config_bot_id` index
/// - Creates the unique `uk_bot_config_bot_id_version` index on (`bot_id`, `version`)
///
/// ## Dependencies
///
/// This migration depends on [`InitMigration`](crate::InitMigration).
pub struct M0002;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    M0002,
    "main",
    "m0002",
    vec_box![crate::InitMigration],
    vec_box![
        bot_config::add_column_version::Operation,
        bot_config::drop_bot_id_uk::Operation,
        bot_config::create_bot_id_version_uk::Operation,
    ]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    M0002,
    "main",
    "m0002",
    vec_box![crate::InitMigration],
    vec_box![
        bot_config::add_column_version::Operation,
        bot_config::drop_bot_id_uk::Operation,
        bot_config::create_bot_id_version_uk::Operation,
    ]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    M0002,
    "main",
    "m0002",
    vec_box![crate::InitMigration],
    vec_box![
        bot_config::add_column_version::Operation,
        bot_config::drop_bot_id_uk::Operation,
        bot_config::create_bot_id_version_uk::Operation,
    ]
);
