use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use sqlx_migrator::{Migrate, Plan};

async fn create_sqlite_pool(key: &str) -> anyhow::Result<SqlitePool> {
    let url = format!("sqlite:../target/tmp/test_migrator_{key}.db");

    let _ = Sqlite::drop_database(&url).await;
    Sqlite::create_database(&url).await?;

    Ok(SqlitePool::connect(&url).await?)
}

async fn table_exists(pool: &SqlitePool) -> anyhow::Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'bot_config'",
    )
    .fetch_one(pool)
    .await?;

    Ok(count == 1)
}

#[tokio::test]
async fn sqlite_apply_all() -> anyhow::Result<()> {
    let pool = create_sqlite_pool("apply_all").await?;
    let mut conn = pool.acquire().await?;

    bot_config_sql_migrator::new::<Sqlite>()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    sqlx::query("INSERT INTO bot_config (bot_id, config) VALUES (?, ?)")
        .bind("bot1")
        .bind("{}")
        .execute(&mut *conn)
        .await?;

    let (version, status, publish_data): (String, i16, Option<String>) = sqlx::query_as(
        "SELECT version, publish_status, publish_data FROM bot_config WHERE bot_id = ?",
    )
    .bind("bot1")
    .fetch_one(&mut *conn)
    .await?;

    assert_eq!(version, bot_config::DRAFT_VERSION);
    assert_eq!(status, 0);
    assert_eq!(publish_data, None);

    let duplicate = sqlx::query("INSERT INTO bot_config (bot_id, config) VALUES (?, ?)")
        .bind("bot1")
        .bind("{}")
        .execute(&mut *conn)
        .await
        .unwrap_err();

    assert!(duplicate
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation()));

    sqlx::query("INSERT INTO bot_config (bot_id, version, config) VALUES (?, ?, ?)")
        .bind("bot1")
        .bind("v1.0")
        .bind("{}")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[tokio::test]
async fn sqlite_revert_all() -> anyhow::Result<()> {
    let pool = create_sqlite_pool("revert_all").await?;
    let mut conn = pool.acquire().await?;
    let migrator = bot_config_sql_migrator::new::<Sqlite>()?;

    migrator.run(&mut *conn, &Plan::apply_all()).await?;
    assert!(table_exists(&pool).await?);

    migrator.run(&mut *conn, &Plan::revert_all()).await?;
    assert!(!table_exists(&pool).await?);

    migrator.run(&mut *conn, &Plan::apply_all()).await?;
    assert!(table_exists(&pool).await?);

    Ok(())
}
