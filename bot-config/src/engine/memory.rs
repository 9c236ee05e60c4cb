use async_trait::async_trait;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

use crate::{
    engine::Engine,
    error::{Error, Result},
    record::{BotConfig, BotConfigRecord, NewRecord, PublishTarget, StatusOp, Version},
    store::ConfigStore,
};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    bots: HashMap<String, Vec<BotConfigRecord>>,
}

/// In-process engine.
///
/// Rows of a bot are kept in insertion order, which is also id order since
/// ids come from a counter that never goes back, even after deletes.
#[derive(Debug, Clone, Default)]
pub struct Memory(Arc<RwLock<State>>);

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<Memory> for ConfigStore {
    fn from(value: Memory) -> Self {
        ConfigStore::new(value)
    }
}

#[async_trait]
impl Engine for Memory {
    async fn insert(&self, record: NewRecord) -> Result<BotConfigRecord> {
        let mut state = self.0.write();

        let exists = state
            .bots
            .get(&record.bot_id)
            .is_some_and(|rows| rows.iter().any(|row| row.version == record.version));

        if exists {
            return Err(Error::conflict(record.bot_id, record.version));
        }

        state.last_id += 1;
        let record = record.into_record(state.last_id);

        state
            .bots
            .entry(record.bot_id.to_owned())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn get(&self, bot_id: &'_ str, version: &'_ Version) -> Result<Option<BotConfigRecord>> {
        let state = self.0.read();

        Ok(state
            .bots
            .get(bot_id)
            .and_then(|rows| rows.iter().find(|row| &row.version == version))
            .cloned())
    }

    async fn list(
        &self,
        bot_id: &'_ str,
        target: Option<PublishTarget>,
    ) -> Result<Vec<BotConfigRecord>> {
        let state = self.0.read();
        let Some(rows) = state.bots.get(bot_id) else {
            return Ok(vec![]);
        };

        Ok(rows
            .iter()
            .filter(|row| target.map_or(true, |t| row.publish_status.contains(t)))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
        target: PublishTarget,
        op: StatusOp,
    ) -> Result<Option<BotConfigRecord>> {
        let mut state = self.0.write();
        let Some(row) = find_mut(&mut state, bot_id, version) else {
            return Ok(None);
        };

        row.publish_status = row.publish_status.with(target, op);

        if row.publish_status.is_empty() {
            row.publish_data = None;
        } else {
            row.publish_data.get_or_insert_with(|| row.config.clone());
        }

        Ok(Some(row.clone()))
    }

    async fn update_config(
        &self,
        bot_id: &'_ str,
        version: &'_ Version,
        config: BotConfig,
    ) -> Result<Option<BotConfigRecord>> {
        let mut state = self.0.write();
        let Some(row) = find_mut(&mut state, bot_id, version) else {
            return Ok(None);
        };

        row.config = config;

        Ok(Some(row.clone()))
    }

    async fn delete(&self, bot_id: &'_ str) -> Result<u64> {
        let mut state = self.0.write();

        let published = state
            .bots
            .get(bot_id)
            .is_some_and(|rows| rows.iter().any(BotConfigRecord::is_published));

        if published {
            return Ok(0);
        }

        let removed = state.bots.remove(bot_id).unwrap_or_default();

        u64::try_from(removed.len()).map_err(|e| Error::Unknown(e.into()))
    }
}

fn find_mut<'a>(
    state: &'a mut State,
    bot_id: &str,
    version: &Version,
) -> Option<&'a mut BotConfigRecord> {
    state
        .bots
        .get_mut(bot_id)
        .and_then(|rows| rows.iter_mut().find(|row| &row.version == version))
}
