use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{
    error::Result,
    record::{BotConfig, BotConfigRecord, NewRecord, PublishTarget, StatusOp, Version},
};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::*;

/// Storage backend of a [`ConfigStore`](crate::ConfigStore).
///
/// Engines persist rows as they are given; the store validates input and
/// orchestrates operations. An engine is still responsible for the
/// (`bot_id`, `version`) uniqueness of [`Engine::insert`], which must fail
/// with [`Error::Conflict`](crate::Error::Conflict) when the pair exists.
#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    /// Inserts a row and returns it with its assigned id.
    async fn insert(&self, record: NewRecord) -> Result<BotConfigRecord>;

    async fn get(&self, bot_id: &'_ str, version: &'_ Version) -> Result<Option<BotConfigRecord>>;

    /// Rows of a bot ordered by id, optionally only those published to `target`.
    async fn list(
        &self,
        bot_id: &'_ str,
        target: Option<PublishTarget>,
    ) -> Result<Vec<BotConfigRecord>>;

    /// Sets or clears one bit of a row's status, dropping the publish data
    /// when no bit is left. Returns `None` when the row does not exist.
    async fn update_status(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
        target: PublishTarget,
        op: StatusOp,
    ) -> Result<Option<BotConfigRecord>>;

    /// Replaces a row's configuration. Returns `None` when the row does not exist.
    async fn update_config(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
        config: BotConfig,
    ) -> Result<Option<BotConfigRecord>>;

    /// Deletes every row of a bot and returns how many were removed.
    ///
    /// Nothing is removed, and `0` is returned, while any row of the bot has
    /// a non-empty status. The check and the removal are one atomic step.
    async fn delete(&self, bot_id: &'_ str) -> Result<u64>;
}

dyn_clone::clone_trait_object!(Engine);
