pub mod add_column_publish_data;
pub mod add_column_publish_status;
pub mod create_bot_id_publish_status_idx;
