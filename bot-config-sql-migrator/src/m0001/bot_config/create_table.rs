use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use bot_config_sql::BotConfig;

pub struct Operation;

fn up_statement(mut id: ColumnDef) -> TableCreateStatement {
    Table::create()
        .table(BotConfig::Table)
        .if_not_exists()
        .col(id.not_null().auto_increment().primary_key())
        .col(
            ColumnDef::new(BotConfig::BotId)
                .string()
                .string_len(64)
                .not_null(),
        )
        .col(ColumnDef::new(BotConfig::Config).text().not_null())
        .to_owned()
}

fn down_statement() -> TableDropStatement {
    Table::drop().table(BotConfig::Table).to_owned()
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        // AUTOINCREMENT is only accepted on an INTEGER PRIMARY KEY
        let id = ColumnDef::new(BotConfig::Id).integer().to_owned();
        let statment = up_statement(id).to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statment = down_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }
}

#[cfg(feature = "mysql")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::MySql> for Operation {
    async fn up(&self, connection: &mut sqlx::MySqlConnection) -> Result<(), sqlx_migrator::Error> {
        let id = ColumnDef::new(BotConfig::Id).big_integer().to_owned();
        let statment = up_statement(id).to_string(sea_query::MysqlQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::MySqlConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statment = down_statement().to_string(sea_query::MysqlQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }
}

#[cfg(feature = "postgres")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Postgres> for Operation {
    async fn up(&self, connection: &mut sqlx::PgConnection) -> Result<(), sqlx_migrator::Error> {
        let id = ColumnDef::new(BotConfig::Id).big_integer().to_owned();
        let statment = up_statement(id).to_string(sea_query::PostgresQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }

    async fn down(&self, connection: &mut sqlx::PgConnection) -> Result<(), sqlx_migrator::Error> {
        let statment = down_statement().to_string(sea_query::PostgresQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }
}
