//! Migration adding publish state.

mod bot_config;

use sqlx_migrator::vec_box;

/// Migration that adds the publish status bitmask and the published snapshot.
///
/// ## Changes
///
/// - Adds `publish_status` column (SMALLINT, NOT NULL, DEFAULT 0)
/// - Adds `publish_data` column (TEXT, NULL)
/// - Creates the `idx_bot_config_bot_id_publish_status` index
///
/// ## Database-Specific Notes
///
/// - **SQLite**: dropping a column requires SQLite 3.35 or later, so
///   reverting this migration does too.
///
/// ## Dependencies
///
/// This migration depends on [`M0002`](crate::M0002).
pub struct M0003;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    M0003,
    "main",
    "m0003",
    vec_box![crate::M0002],
    vec_box![
        bot_config::add_column_publish_status::Operation,
        bot_config::add_column_publish_data::Operation,
        bot_config::create_bot_id_publish_status_idx::Operation,
    ]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    M0003,
    "main",
    "m0003",
    vec_box![crate::M0002],
    vec_box![
        bot_config::add_column_publish_status::Operation,
        bot_config::add_column_publish_data::Operation,
        bot_config::create_bot_id_publish_status_idx::Operation,
    ]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    M0003,
    "main",
    "m0003",
    vec_box![crate::M0002],
    vec_box![
        bot_config::add_column_publish_status::Operation,
        bot_config::add_column_publish_data::Operation,
        bot_config::create_bot_id_publish_status_idx::Operation,
    ]
);
