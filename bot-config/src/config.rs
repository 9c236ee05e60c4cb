//! Configuration constants and defaults for the config store.

/// Limits applied by [`ConfigStore`](crate::ConfigStore) before touching the engine.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum length of a bot identifier
    pub max_bot_id_len: usize,

    /// Maximum length of a published version string
    pub max_version_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_bot_id_len: MAX_BOT_ID_LEN,
            max_version_len: MAX_VERSION_LEN,
        }
    }
}

/// Default maximum bot identifier length.
pub const MAX_BOT_ID_LEN: usize = 64;

/// Default maximum version length.
///
/// Matches the width of the `version` column, so it should only be raised
/// together with a schema migration.
pub const MAX_VERSION_LEN: usize = 32;

/// Builder for [`StoreConfig`]
#[derive(Debug)]
pub struct ConfigBuilder {
    config: StoreConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
        }
    }

    pub fn max_bot_id_len(mut self, len: usize) -> Self {
        self.config.max_bot_id_len = len;
        self
    }

    pub fn max_version_len(mut self, len: usize) -> Self {
        self.config.max_version_len = len;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
