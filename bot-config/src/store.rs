use tracing::field::Empty;

use crate::{
    config::StoreConfig,
    engine::Engine,
    error::{Error, Result},
    record::{
        BotConfig, BotConfigRecord, NewRecord, PublishTarget, StatusOp, Version, DRAFT_VERSION,
    },
};

/// Versioning and publish-state store for bot configurations.
///
/// Every bot has exactly one draft (version `"-1"`), the only record whose
/// configuration can change. Publishing copies the draft into a new immutable
/// record. Uniqueness of (`bot_id`, `version`) is left to the engine, so two
/// concurrent creations of the same pair end with one success and one
/// [`Error::Conflict`].
///
/// ```rust,ignore
/// let store: ConfigStore = Memory::new().into();
///
/// store.create_draft("bot1").await?;
/// store.publish_snapshot("bot1", "v1.0", PublishTarget::Xingchen).await?;
///
/// let versions = store.list_versions("bot1").await?;
/// assert_eq!(versions.len(), 2);
/// ```
#[derive(Clone)]
pub struct ConfigStore {
    engine: Box<dyn Engine>,
    config: StoreConfig,
}

impl ConfigStore {
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates the draft of a new bot with an empty configuration.
    pub async fn create_draft(&self, bot_id: &str) -> Result<BotConfigRecord> {
        self.create_draft_with(bot_id, BotConfig::default()).await
    }

    #[tracing::instrument(skip_all, fields(bot_id = bot_id))]
    pub async fn create_draft_with(
        &self,
        bot_id: &str,
        config: BotConfig,
    ) -> Result<BotConfigRecord> {
        self.validate_bot_id(bot_id)?;

        let record = self.engine.insert(NewRecord::draft(bot_id, config)).await?;

        tracing::debug!(id = record.id, "draft created");

        Ok(record)
    }

    /// Freezes the current draft into a new record published to `target`.
    #[tracing::instrument(skip_all, fields(bot_id = bot_id, version = Empty, target = %target))]
    pub async fn publish_snapshot(
        &self,
        bot_id: &str,
        version: impl Into<String>,
        target: PublishTarget,
    ) -> Result<BotConfigRecord> {
        let version = version.into();
        tracing::Span::current().record("version", version.as_str());

        self.validate_bot_id(bot_id)?;
        self.validate_published_version(&version)?;

        let draft = self.get_draft(bot_id).await?;
        let record = self
            .engine
            .insert(NewRecord::snapshot(
                &draft,
                Version::Published(version),
                target,
            ))
            .await?;

        tracing::debug!(id = record.id, draft_id = draft.id, "snapshot published");

        Ok(record)
    }

    /// Sets or clears `target` in the status of one record.
    ///
    /// Other records and fields are left untouched, except that clearing the
    /// last target also drops the record's publish data.
    #[tracing::instrument(skip_all, fields(bot_id = bot_id, version = Empty, target = %target, op = %op))]
    pub async fn update_publish_status(
        &self,
        bot_id: &str,
        version: impl Into<Version>,
        target: PublishTarget,
        op: StatusOp,
    ) -> Result<BotConfigRecord> {
        let version = version.into();
        tracing::Span::current().record("version", version.as_str());

        self.validate_bot_id(bot_id)?;

        let record = self
            .engine
            .update_status(bot_id, &version, target, op)
            .await?
            .ok_or_else(|| Error::not_found(bot_id, version))?;

        tracing::debug!(publish_status = %record.publish_status, "publish status updated");

        Ok(record)
    }

    pub async fn get_version(
        &self,
        bot_id: &str,
        version: impl Into<Version>,
    ) -> Result<BotConfigRecord> {
        let version = version.into();

        self.validate_bot_id(bot_id)?;

        self.engine
            .get(bot_id, &version)
            .await?
            .ok_or_else(|| Error::not_found(bot_id, version))
    }

    pub async fn get_draft(&self, bot_id: &str) -> Result<BotConfigRecord> {
        self.get_version(bot_id, Version::Draft).await
    }

    /// Every record of a bot in creation order.
    pub async fn list_versions(&self, bot_id: &str) -> Result<Vec<BotConfigRecord>> {
        self.validate_bot_id(bot_id)?;

        self.engine.list(bot_id, None).await
    }

    /// Records of a bot currently published to `target`, in creation order.
    pub async fn list_published(
        &self,
        bot_id: &str,
        target: PublishTarget,
    ) -> Result<Vec<BotConfigRecord>> {
        self.validate_bot_id(bot_id)?;

        self.engine.list(bot_id, Some(target)).await
    }

    /// Checks whether a record is published to `target`, or to any target
    /// when `None`.
    pub async fn is_published(
        &self,
        bot_id: &str,
        version: impl Into<Version>,
        target: Option<PublishTarget>,
    ) -> Result<bool> {
        let record = self.get_version(bot_id, version).await?;

        Ok(match target {
            Some(target) => record.publish_status.contains(target),
            None => record.is_published(),
        })
    }

    /// Replaces the configuration of the draft. Published records are immutable.
    #[tracing::instrument(skip_all, fields(bot_id = bot_id))]
    pub async fn update_draft(&self, bot_id: &str, config: BotConfig) -> Result<BotConfigRecord> {
        self.validate_bot_id(bot_id)?;

        let record = self
            .engine
            .update_config(bot_id, &Version::Draft, config)
            .await?
            .ok_or_else(|| Error::not_found(bot_id, Version::Draft))?;

        tracing::debug!(id = record.id, "draft updated");

        Ok(record)
    }

    /// Deletes a bot with all of its versions.
    ///
    /// Refused while any version is still published to a target.
    #[tracing::instrument(skip_all, fields(bot_id = bot_id))]
    pub async fn delete_bot(&self, bot_id: &str) -> Result<u64> {
        self.validate_bot_id(bot_id)?;

        loop {
            let deleted = self.engine.delete(bot_id).await?;

            if deleted > 0 {
                tracing::debug!(deleted, "bot deleted");

                return Ok(deleted);
            }

            let records = self.engine.list(bot_id, None).await?;

            if records.is_empty() {
                return Err(Error::not_found(bot_id, Version::Draft));
            }

            if let Some(published) = records.iter().find(|r| r.is_published()) {
                tracing::debug!(
                    version = %published.version,
                    publish_status = %published.publish_status,
                    "refusing to delete a published bot"
                );

                return Err(Error::StillPublished {
                    bot_id: bot_id.to_owned(),
                    version: published.version.clone(),
                });
            }

            // unpublished between the delete and the list
        }
    }

    fn validate_bot_id(&self, bot_id: &str) -> Result<()> {
        if bot_id.is_empty() {
            return Err(Error::Validation("bot id must not be empty".to_owned()));
        }

        if bot_id.chars().count() > self.config.max_bot_id_len {
            return Err(Error::Validation(format!(
                "bot id longer than {} characters",
                self.config.max_bot_id_len
            )));
        }

        Ok(())
    }

    fn validate_published_version(&self, version: &str) -> Result<()> {
        if version.is_empty() {
            return Err(Error::Validation("version must not be empty".to_owned()));
        }

        if version == DRAFT_VERSION {
            return Err(Error::Validation(format!(
                "version `{DRAFT_VERSION}` is reserved for the draft"
            )));
        }

        if version.chars().count() > self.config.max_version_len {
            return Err(Error::Validation(format!(
                "version longer than {} characters",
                self.config.max_version_len
            )));
        }

        Ok(())
    }
}
