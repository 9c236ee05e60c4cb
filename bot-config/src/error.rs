use crate::record::Version;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bot config `{bot_id}` version `{version}` already exists")]
    Conflict { bot_id: String, version: Version },

    #[error("bot config `{bot_id}` version `{version}` not found")]
    NotFound { bot_id: String, version: Version },

    #[error("bot config `{bot_id}` is still published as `{version}`, unpublish it first")]
    StillPublished { bot_id: String, version: Version },

    #[error("validation `{0}`")]
    Validation(String),

    #[error("storage unavailable `{0}`")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

impl Error {
    pub fn conflict(bot_id: impl Into<String>, version: Version) -> Self {
        Self::Conflict {
            bot_id: bot_id.into(),
            version,
        }
    }

    pub fn not_found(bot_id: impl Into<String>, version: Version) -> Self {
        Self::NotFound {
            bot_id: bot_id.into(),
            version,
        }
    }

    /// Whether the caller may retry the operation with backoff.
    ///
    /// Only transient storage failures qualify; every other kind reflects a
    /// mismatch between the request and the stored state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::StillPublished { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
