pub mod add_column_version;
pub mod create_bot_id_version_uk;
pub mod drop_bot_id_uk;
