pub mod create_bot_id_uk;
pub mod create_table;
