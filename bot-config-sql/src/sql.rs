//! Core SQL implementation of the config store engine.

#[cfg(feature = "mysql")]
use sea_query::MysqlQueryBuilder;
#[cfg(feature = "postgres")]
use sea_query::PostgresQueryBuilder;
#[cfg(feature = "sqlite")]
use sea_query::SqliteQueryBuilder;
use sea_query::{Alias, Expr, ExprTrait, Func, Iden, Order, Query, SelectStatement};
use sea_query_sqlx::SqlxBinder;
use sqlx::{error::DatabaseError, Database, Pool};

use bot_config::{
    BotConfig as Payload, BotConfigRecord, ConfigStore, Engine, Error, NewRecord, PublishStatus,
    PublishTarget, StatusOp, Version,
};

/// Column identifiers for the `bot_config` table.
///
/// Used with sea-query for type-safe SQL query construction.
///
/// # Columns
///
/// - `Id` - Auto-increment row identifier
/// - `BotId` - Stable bot identifier (VARCHAR(64))
/// - `Version` - `"-1"` for the draft, the published version otherwise (VARCHAR(32))
/// - `PublishStatus` - Bitmask of publish targets (SMALLINT)
/// - `Config` - Configuration payload (JSON text)
/// - `PublishData` - Configuration captured at publish time (JSON text, nullable)
#[derive(Iden, Clone)]
pub enum BotConfig {
    /// The table name: `bot_config`
    Table,
    /// Row ID column
    Id,
    /// Bot identifier
    BotId,
    /// Version identifier
    Version,
    /// Publish target bitmask
    PublishStatus,
    /// Configuration payload
    Config,
    /// Published snapshot
    PublishData,
}

/// Raw `bot_config` row.
///
/// Decoded into a [`BotConfigRecord`] through `TryFrom`, which checks the
/// bitmask and parses the JSON payloads.
#[derive(Debug, Clone)]
pub struct SqlRecord {
    pub id: i64,
    pub bot_id: String,
    pub version: String,
    pub publish_status: i16,
    pub config: String,
    pub publish_data: Option<String>,
}

impl<R: sqlx::Row> sqlx::FromRow<'_, R> for SqlRecord
where
    i16: sqlx::Type<R::Database> + for<'r> sqlx::Decode<'r, R::Database>,
    i64: sqlx::Type<R::Database> + for<'r> sqlx::Decode<'r, R::Database>,
    String: sqlx::Type<R::Database> + for<'r> sqlx::Decode<'r, R::Database>,
    for<'r> &'r str: sqlx::ColumnIndex<R>,
{
    fn from_row(row: &R) -> Result<Self, sqlx::Error> {
        Ok(SqlRecord {
            id: sqlx::Row::try_get(row, "id")?,
            bot_id: sqlx::Row::try_get(row, "bot_id")?,
            version: sqlx::Row::try_get(row, "version")?,
            publish_status: sqlx::Row::try_get(row, "publish_status")?,
            config: sqlx::Row::try_get(row, "config")?,
            publish_data: sqlx::Row::try_get(row, "publish_data")?,
        })
    }
}

impl TryFrom<SqlRecord> for BotConfigRecord {
    type Error = Error;

    fn try_from(value: SqlRecord) -> Result<Self, Self::Error> {
        Ok(BotConfigRecord {
            id: value.id,
            bot_id: value.bot_id,
            version: Version::from_stored(value.version),
            publish_status: PublishStatus::from_bits(value.publish_status)?,
            config: Payload::from_json(&value.config)?,
            publish_data: value
                .publish_data
                .as_deref()
                .map(Payload::from_json)
                .transpose()?,
        })
    }
}

/// Type alias for MySQL engine.
///
/// Equivalent to `Sql<sqlx::MySql>`.
#[cfg(feature = "mysql")]
pub type MySql = Sql<sqlx::MySql>;

/// Type alias for PostgreSQL engine.
///
/// Equivalent to `Sql<sqlx::Postgres>`.
#[cfg(feature = "postgres")]
pub type Postgres = Sql<sqlx::Postgres>;

/// Type alias for SQLite engine.
///
/// Equivalent to `Sql<sqlx::Sqlite>`.
#[cfg(feature = "sqlite")]
pub type Sqlite = Sql<sqlx::Sqlite>;

/// SQL database engine for the config store.
///
/// A generic wrapper around a SQLx connection pool that implements
/// [`Engine`](bot_config::Engine). The schema is created by the
/// `bot-config-sql-migrator` crate.
///
/// # Example
///
/// ```rust,ignore
/// use bot_config::ConfigStore;
/// use sqlx::sqlite::SqlitePoolOptions;
///
/// let pool = SqlitePoolOptions::new()
///     .connect("sqlite:bots.db")
///     .await?;
///
/// let engine: bot_config_sql::Sqlite = pool.into();
/// let store: ConfigStore = engine.into();
/// ```
///
/// # Concurrency
///
/// Uniqueness of (`bot_id`, `version`) is enforced by the unique index of
/// the table: a losing insert surfaces as [`Error::Conflict`]. Status updates
/// are a single `UPDATE` with bitwise expressions, so concurrent toggles of
/// different targets on one row never overwrite each other. Deleting a bot is
/// one `DELETE` guarded by `NOT EXISTS` on its published rows.
pub struct Sql<DB: Database>(Pool<DB>);

impl<DB: Database> Sql<DB> {
    fn build_sqlx<S: SqlxBinder>(statement: S) -> (String, sea_query_sqlx::SqlxValues) {
        match DB::NAME {
            #[cfg(feature = "sqlite")]
            "SQLite" => statement.build_sqlx(SqliteQueryBuilder),
            #[cfg(feature = "mysql")]
            "MySQL" => statement.build_sqlx(MysqlQueryBuilder),
            #[cfg(feature = "postgres")]
            "PostgreSQL" => statement.build_sqlx(PostgresQueryBuilder),
            name => panic!("'{name}' not supported, consider using SQLite, PostgreSQL or MySQL"),
        }
    }

    fn select() -> SelectStatement {
        Query::select()
            .columns([
                BotConfig::Id,
                BotConfig::BotId,
                BotConfig::Version,
                BotConfig::PublishStatus,
                BotConfig::Config,
                BotConfig::PublishData,
            ])
            .from(BotConfig::Table)
            .to_owned()
    }

    fn select_one(bot_id: &str, version: &Version) -> SelectStatement {
        Self::select()
            .and_where(Expr::col(BotConfig::BotId).eq(bot_id))
            .and_where(Expr::col(BotConfig::Version).eq(version.as_str()))
            .limit(1)
            .to_owned()
    }

    pub fn pool(&self) -> &Pool<DB> {
        &self.0
    }
}

/// Number of rows changed by a statement, for every supported backend.
pub trait RowsAffected {
    fn rows_affected(&self) -> u64;
}

#[cfg(feature = "sqlite")]
impl RowsAffected for sqlx::sqlite::SqliteQueryResult {
    fn rows_affected(&self) -> u64 {
        sqlx::sqlite::SqliteQueryResult::rows_affected(self)
    }
}

#[cfg(feature = "mysql")]
impl RowsAffected for sqlx::mysql::MySqlQueryResult {
    fn rows_affected(&self) -> u64 {
        sqlx::mysql::MySqlQueryResult::rows_affected(self)
    }
}

#[cfg(feature = "postgres")]
impl RowsAffected for sqlx::postgres::PgQueryResult {
    fn rows_affected(&self) -> u64 {
        sqlx::postgres::PgQueryResult::rows_affected(self)
    }
}

/// SQLSTATE codes of serialization failures, deadlocks and lock timeouts.
const TRANSIENT_SQLSTATES: [&str; 3] = ["40001", "40P01", "55P03"];

/// Whether a database error reports contention rather than a bad request.
fn is_transient(err: &dyn DatabaseError) -> bool {
    #[cfg(feature = "sqlite")]
    if let Some(err) = err.try_downcast_ref::<sqlx::sqlite::SqliteError>() {
        // SQLITE_BUSY and SQLITE_LOCKED, including their extended codes
        return err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6));
    }

    err.code()
        .is_some_and(|code| TRANSIENT_SQLSTATES.iter().any(|state| *state == code))
}

/// Maps a sqlx failure to the store error kinds.
///
/// Unique violations become [`Error::Conflict`] for the row being written;
/// failures to reach the database, busy or locked databases and deadlocks
/// become [`Error::StorageUnavailable`].
pub fn map_sqlx_error(err: sqlx::Error, bot_id: &str, version: &Version) -> Error {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::conflict(bot_id, version.clone())
        }
        sqlx::Error::Database(ref db_err) if is_transient(&**db_err) => {
            Error::StorageUnavailable(err.into())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => Error::StorageUnavailable(err.into()),
        err => Error::Unknown(err.into()),
    }
}

#[async_trait::async_trait]
impl<DB> Engine for Sql<DB>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    sea_query_sqlx::SqlxValues: for<'q> sqlx::IntoArguments<'q, DB>,
    SqlRecord: for<'r> sqlx::FromRow<'r, DB::Row>,
    DB::QueryResult: RowsAffected,
{
    async fn insert(&self, record: NewRecord) -> bot_config::Result<BotConfigRecord> {
        let publish_data = match record.publish_data {
            Some(ref data) => Some(data.to_json()?),
            None => None,
        };

        let statement = Query::insert()
            .into_table(BotConfig::Table)
            .columns([
                BotConfig::BotId,
                BotConfig::Version,
                BotConfig::PublishStatus,
                BotConfig::Config,
                BotConfig::PublishData,
            ])
            .values_panic([
                record.bot_id.as_str().into(),
                record.version.as_str().into(),
                record.publish_status.bits().into(),
                record.config.to_json()?.into(),
                publish_data.into(),
            ])
            .to_owned();

        let (sql, values) = Self::build_sqlx(statement);

        sqlx::query_with::<DB, _>(&sql, values)
            .execute(&self.0)
            .await
            .map_err(|err| map_sqlx_error(err, &record.bot_id, &record.version))?;

        self.get(&record.bot_id, &record.version)
            .await?
            .ok_or_else(|| {
                Error::Unknown(anyhow::anyhow!(
                    "bot config `{}` version `{}` missing after insert",
                    record.bot_id,
                    record.version
                ))
            })
    }

    async fn get(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
    ) -> bot_config::Result<Option<BotConfigRecord>> {
        let (sql, values) = Self::build_sqlx(Self::select_one(bot_id, version));

        let row = sqlx::query_as_with::<DB, SqlRecord, _>(&sql, values)
            .fetch_optional(&self.0)
            .await
            .map_err(|err| map_sqlx_error(err, bot_id, version))?;

        row.map(BotConfigRecord::try_from).transpose()
    }

    async fn list(
        &self,
        bot_id: &'_ str,
        target: Option<PublishTarget>,
    ) -> bot_config::Result<Vec<BotConfigRecord>> {
        let mut statement = Self::select()
            .and_where(Expr::col(BotConfig::BotId).eq(bot_id))
            .order_by(BotConfig::Id, Order::Asc)
            .to_owned();

        if let Some(target) = target {
            statement.and_where(
                Expr::col(BotConfig::PublishStatus)
                    .bit_and(target.bit())
                    .ne(0i16),
            );
        }

        let (sql, values) = Self::build_sqlx(statement);

        let rows = sqlx::query_as_with::<DB, SqlRecord, _>(&sql, values)
            .fetch_all(&self.0)
            .await
            .map_err(|err| map_sqlx_error(err, bot_id, &Version::Draft))?;

        rows.into_iter().map(BotConfigRecord::try_from).collect()
    }

    async fn update_status(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
        target: PublishTarget,
        op: StatusOp,
    ) -> bot_config::Result<Option<BotConfigRecord>> {
        // MySQL evaluates SET assignments left to right, so publish_data has
        // to be computed before publish_status changes.
        let values = match op {
            StatusOp::Set => vec![
                (
                    BotConfig::PublishData,
                    Func::coalesce([
                        Expr::col(BotConfig::PublishData),
                        Expr::col(BotConfig::Config),
                    ])
                    .into(),
                ),
                (
                    BotConfig::PublishStatus,
                    Expr::col(BotConfig::PublishStatus).bit_or(target.bit()),
                ),
            ],
            StatusOp::Clear => {
                let keep = PublishStatus::MASK & !target.bit();

                vec![
                    (
                        BotConfig::PublishData,
                        Expr::case(
                            Expr::col(BotConfig::PublishStatus).bit_and(keep).eq(0i16),
                            Expr::cust("NULL"),
                        )
                        .finally(Expr::col(BotConfig::PublishData))
                        .into(),
                    ),
                    (
                        BotConfig::PublishStatus,
                        Expr::col(BotConfig::PublishStatus).bit_and(keep),
                    ),
                ]
            }
        };

        let statement = Query::update()
            .table(BotConfig::Table)
            .values(values)
            .and_where(Expr::col(BotConfig::BotId).eq(bot_id))
            .and_where(Expr::col(BotConfig::Version).eq(version.as_str()))
            .to_owned();

        let (sql, values) = Self::build_sqlx(statement);

        sqlx::query_with::<DB, _>(&sql, values)
            .execute(&self.0)
            .await
            .map_err(|err| map_sqlx_error(err, bot_id, version))?;

        self.get(bot_id, version).await
    }

    async fn update_config(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
        config: Payload,
    ) -> bot_config::Result<Option<BotConfigRecord>> {
        let statement = Query::update()
            .table(BotConfig::Table)
            .values([(BotConfig::Config, config.to_json()?.into())])
            .and_where(Expr::col(BotConfig::BotId).eq(bot_id))
            .and_where(Expr::col(BotConfig::Version).eq(version.as_str()))
            .to_owned();

        let (sql, values) = Self::build_sqlx(statement);

        sqlx::query_with::<DB, _>(&sql, values)
            .execute(&self.0)
            .await
            .map_err(|err| map_sqlx_error(err, bot_id, version))?;

        self.get(bot_id, version).await
    }

    async fn delete(&self, bot_id: &'_ str) -> bot_config::Result<u64> {
        let published = Query::select()
            .column(BotConfig::Id)
            .from(BotConfig::Table)
            .and_where(Expr::col(BotConfig::BotId).eq(bot_id))
            .and_where(Expr::col(BotConfig::PublishStatus).ne(0i16))
            .to_owned();

        // MySQL rejects a subquery on the table being deleted from unless it
        // goes through a derived table.
        let statement = Query::delete()
            .from_table(BotConfig::Table)
            .and_where(Expr::col(BotConfig::BotId).eq(bot_id))
            .and_where(
                Expr::exists(
                    Query::select()
                        .expr(Expr::val(1))
                        .from_subquery(published, Alias::new("published"))
                        .to_owned(),
                )
                .not(),
            )
            .to_owned();

        let (sql, values) = Self::build_sqlx(statement);

        let result = sqlx::query_with::<DB, _>(&sql, values)
            .execute(&self.0)
            .await
            .map_err(|err| map_sqlx_error(err, bot_id, &Version::Draft))?;

        Ok(result.rows_affected())
    }
}

impl<D: Database> Clone for Sql<D> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<D: Database> From<Pool<D>> for Sql<D> {
    fn from(value: Pool<D>) -> Self {
        Self(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<Sqlite> for ConfigStore {
    fn from(value: Sqlite) -> Self {
        ConfigStore::new(value)
    }
}

#[cfg(feature = "mysql")]
impl From<MySql> for ConfigStore {
    fn from(value: MySql) -> Self {
        ConfigStore::new(value)
    }
}

#[cfg(feature = "postgres")]
impl From<Postgres> for ConfigStore {
    fn from(value: Postgres) -> Self {
        ConfigStore::new(value)
    }
}
