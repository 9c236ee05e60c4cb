use bot_config::{BotConfig, ConfigStore, Engine, NewRecord, PublishTarget, StatusOp, Version};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};

mod pool;

#[tokio::test]
async fn sqlite_create_draft() -> anyhow::Result<()> {
    let store = create_sqlite_store("create_draft").await?;

    bot_config_test::create_draft(&store).await
}

#[tokio::test]
async fn sqlite_publish_then_list() -> anyhow::Result<()> {
    let store = create_sqlite_store("publish_then_list").await?;

    bot_config_test::publish_then_list(&store).await
}

#[tokio::test]
async fn sqlite_publish_duplicate_version() -> anyhow::Result<()> {
    let store = create_sqlite_store("publish_duplicate_version").await?;

    bot_config_test::publish_duplicate_version(&store).await
}

#[tokio::test]
async fn sqlite_publish_without_draft() -> anyhow::Result<()> {
    let store = create_sqlite_store("publish_without_draft").await?;

    bot_config_test::publish_without_draft(&store).await
}

#[tokio::test]
async fn sqlite_snapshot_fidelity() -> anyhow::Result<()> {
    let store = create_sqlite_store("snapshot_fidelity").await?;

    bot_config_test::snapshot_fidelity(&store).await
}

#[tokio::test]
async fn sqlite_concurrent_publish() -> anyhow::Result<()> {
    let store = create_sqlite_store("concurrent_publish").await?;

    bot_config_test::concurrent_publish(&store).await
}

#[tokio::test]
async fn sqlite_concurrent_create_draft() -> anyhow::Result<()> {
    let store = create_sqlite_store("concurrent_create_draft").await?;

    bot_config_test::concurrent_create_draft(&store).await
}

#[tokio::test]
async fn sqlite_toggle_status() -> anyhow::Result<()> {
    let store = create_sqlite_store("toggle_status").await?;

    bot_config_test::toggle_status(&store).await
}

#[tokio::test]
async fn sqlite_clear_last_target() -> anyhow::Result<()> {
    let store = create_sqlite_store("clear_last_target").await?;

    bot_config_test::clear_last_target(&store).await
}

#[tokio::test]
async fn sqlite_republish_after_clear() -> anyhow::Result<()> {
    let store = create_sqlite_store("republish_after_clear").await?;

    bot_config_test::republish_after_clear(&store).await
}

#[tokio::test]
async fn sqlite_update_status_not_found() -> anyhow::Result<()> {
    let store = create_sqlite_store("update_status_not_found").await?;

    bot_config_test::update_status_not_found(&store).await
}

#[tokio::test]
async fn sqlite_published_queries() -> anyhow::Result<()> {
    let store = create_sqlite_store("published_queries").await?;

    bot_config_test::published_queries(&store).await
}

#[tokio::test]
async fn sqlite_delete_bot() -> anyhow::Result<()> {
    let store = create_sqlite_store("delete_bot").await?;

    bot_config_test::delete_bot(&store).await
}

#[tokio::test]
async fn sqlite_delete_while_publishing() -> anyhow::Result<()> {
    let store = create_sqlite_store("delete_while_publishing").await?;

    bot_config_test::delete_while_publishing(&store).await
}

#[tokio::test]
async fn sqlite_validation() -> anyhow::Result<()> {
    let store = create_sqlite_store("validation").await?;

    bot_config_test::validation(&store).await
}

#[tokio::test]
async fn sqlite_stored_columns() -> anyhow::Result<()> {
    let pool = create_sqlite_pool("stored_columns").await?;
    let store: ConfigStore = bot_config_sql::Sqlite::from(pool.clone()).into();

    store.create_draft("stored_columns").await?;
    store
        .publish_snapshot("stored_columns", "v1.0", PublishTarget::Xingchen)
        .await?;

    let (status, publish_data): (i16, Option<String>) = sqlx::query_as(
        "SELECT publish_status, publish_data FROM bot_config WHERE bot_id = ? AND version = ?",
    )
    .bind("stored_columns")
    .bind("v1.0")
    .fetch_one(&pool)
    .await?;

    assert_eq!(status, 1);
    assert!(publish_data.is_some());

    assert!(
        store
            .is_published("stored_columns", "v1.0", Some(PublishTarget::Xingchen))
            .await?
    );

    Ok(())
}

#[tokio::test]
async fn sqlite_undefined_status_bits() -> anyhow::Result<()> {
    let pool = create_sqlite_pool("undefined_status_bits").await?;
    let store: ConfigStore = bot_config_sql::Sqlite::from(pool.clone()).into();

    store.create_draft("undefined_bits").await?;

    sqlx::query("UPDATE bot_config SET publish_status = 2 WHERE bot_id = ?")
        .bind("undefined_bits")
        .execute(&pool)
        .await?;

    let err = store.get_draft("undefined_bits").await.unwrap_err();
    assert!(matches!(err, bot_config::Error::Validation(_)), "{err}");

    Ok(())
}

#[tokio::test]
async fn sqlite_closed_pool() -> anyhow::Result<()> {
    let pool = create_sqlite_pool("closed_pool").await?;
    let store: ConfigStore = bot_config_sql::Sqlite::from(pool.clone()).into();

    pool.close().await;

    let err = store.create_draft("closed_pool").await.unwrap_err();
    assert!(err.is_retryable(), "{err}");

    Ok(())
}

#[tokio::test]
async fn sqlite_engine_delete_keeps_published() -> anyhow::Result<()> {
    let engine: bot_config_sql::Sqlite = create_sqlite_pool("engine_delete").await?.into();

    let draft = engine
        .insert(NewRecord::draft("engine_delete", BotConfig::new("app")))
        .await?;
    engine
        .insert(NewRecord::snapshot(
            &draft,
            Version::published("v1.0"),
            PublishTarget::Xingchen,
        ))
        .await?;

    assert_eq!(engine.delete("engine_delete").await?, 0);
    assert_eq!(engine.list("engine_delete", None).await?.len(), 2);

    engine
        .update_status(
            "engine_delete",
            &Version::published("v1.0"),
            PublishTarget::Xingchen,
            StatusOp::Clear,
        )
        .await?;

    assert_eq!(engine.delete("engine_delete").await?, 2);
    assert_eq!(engine.delete("engine_delete").await?, 0);

    Ok(())
}

#[tokio::test]
async fn sqlite_busy_database() -> anyhow::Result<()> {
    let pool = create_sqlite_pool("busy_database").await?;

    let options = SqliteConnectOptions::from_str(&sqlite_url("busy_database"))?
        .busy_timeout(Duration::ZERO);
    let busy_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    let store: ConfigStore = bot_config_sql::Sqlite::from(busy_pool).into();

    let mut lock = pool.acquire().await?;
    sqlx::query("BEGIN EXCLUSIVE").execute(&mut *lock).await?;

    let err = store.create_draft("busy_database").await.unwrap_err();

    sqlx::query("ROLLBACK").execute(&mut *lock).await?;

    assert!(err.is_retryable(), "{err}");
    assert!(matches!(err, bot_config::Error::StorageUnavailable(_)), "{err}");

    store.create_draft("busy_database").await?;

    Ok(())
}

async fn create_sqlite_store(key: impl Into<String>) -> anyhow::Result<ConfigStore> {
    let engine: bot_config_sql::Sqlite = create_sqlite_pool(key).await?.into();

    Ok(engine.into())
}

async fn create_sqlite_pool(key: impl Into<String>) -> anyhow::Result<SqlitePool> {
    pool::create_pool(sqlite_url(&key.into())).await
}

fn sqlite_url(key: &str) -> String {
    format!("sqlite:../target/tmp/test_bot_config_{key}.db")
}
