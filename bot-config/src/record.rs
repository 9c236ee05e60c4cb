//! Bot configuration records and their publish state.
//!
//! A bot owns one mutable draft ([`Version::Draft`]) and any number of
//! immutable published snapshots ([`Version::Published`]). Which targets a
//! record is published to is tracked by [`PublishStatus`], a set of
//! [`PublishTarget`]s that is only turned into an integer bitmask at the
//! storage boundary.

use std::fmt;

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Storage encoding of [`Version::Draft`].
pub const DRAFT_VERSION: &str = "-1";

/// External platform a bot version can be published to.
///
/// The discriminant is the bit the target occupies in the stored
/// `publish_status` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, FromStr)]
#[display(style = "SNAKE_CASE")]
#[repr(i16)]
pub enum PublishTarget {
    Xingchen = 1,
    Kaifang = 4,
    Aiui = 16,
}

impl PublishTarget {
    /// Every target, in bit order.
    pub const ALL: [PublishTarget; 3] = [Self::Xingchen, Self::Kaifang, Self::Aiui];

    pub fn bit(self) -> i16 {
        self as i16
    }

    /// Human readable platform name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Xingchen => "XINGCHEN platform",
            Self::Kaifang => "KAIFANG platform",
            Self::Aiui => "AIUI platform",
        }
    }

    pub fn from_bit(bit: i16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|target| target.bit() == bit)
            .ok_or_else(|| Error::Validation(format!("unknown publish target `{bit}`")))
    }
}

/// Set of targets a record is published to.
///
/// Undefined bits can not be represented: [`PublishStatus::from_bits`] rejects
/// them and every other constructor starts from known targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PublishStatus(i16);

impl PublishStatus {
    /// Union of every defined target bit.
    pub const MASK: i16 = PublishTarget::Xingchen as i16
        | PublishTarget::Kaifang as i16
        | PublishTarget::Aiui as i16;

    pub fn empty() -> Self {
        Self(0)
    }

    /// Decodes a stored bitmask.
    pub fn from_bits(bits: i16) -> Result<Self> {
        if bits < 0 || bits & !Self::MASK != 0 {
            return Err(Error::Validation(format!(
                "publish status `{bits}` contains undefined bits"
            )));
        }

        Ok(Self(bits))
    }

    pub fn bits(&self) -> i16 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, target: PublishTarget) -> bool {
        self.0 & target.bit() != 0
    }

    pub fn insert(&mut self, target: PublishTarget) {
        self.0 |= target.bit();
    }

    pub fn remove(&mut self, target: PublishTarget) {
        self.0 &= !target.bit();
    }

    /// Returns a copy with `op` applied for `target`.
    pub fn with(mut self, target: PublishTarget, op: StatusOp) -> Self {
        match op {
            StatusOp::Set => self.insert(target),
            StatusOp::Clear => self.remove(target),
        }

        self
    }

    pub fn iter(&self) -> impl Iterator<Item = PublishTarget> + '_ {
        PublishTarget::ALL
            .into_iter()
            .filter(|target| self.contains(*target))
    }
}

impl From<PublishTarget> for PublishStatus {
    fn from(value: PublishTarget) -> Self {
        Self(value.bit())
    }
}

impl FromIterator<PublishTarget> for PublishStatus {
    fn from_iter<T: IntoIterator<Item = PublishTarget>>(iter: T) -> Self {
        let mut status = Self::empty();
        for target in iter {
            status.insert(target);
        }

        status
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("UNPUBLISHED");
        }

        let names = self.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        f.write_str(&names.join("|"))
    }
}

/// Operation applied to one bit of a [`PublishStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromStr)]
#[display(style = "snake_case")]
pub enum StatusOp {
    Set,
    Clear,
}

/// Identity of a record within a bot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    /// The live, editable configuration (stored as `"-1"`).
    Draft,
    /// An immutable published snapshot.
    Published(String),
}

impl Version {
    /// Version of a published record. `"-1"` still decodes to [`Version::Draft`],
    /// so every engine sees the same identity for it.
    pub fn published(value: impl Into<String>) -> Self {
        Self::from_stored(value)
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Storage encoding of the version.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => DRAFT_VERSION,
            Self::Published(value) => value,
        }
    }

    /// Decodes a stored version string.
    pub fn from_stored(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == DRAFT_VERSION {
            Self::Draft
        } else {
            Self::Published(value)
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::from_stored(value)
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self::from_stored(value)
    }
}

/// Configuration payload of a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Application owning the bot.
    #[serde(default)]
    pub app_id: String,
    #[serde(default = "empty_object")]
    pub knowledge_config: Value,
    #[serde(default = "empty_object")]
    pub model_config: Value,
    #[serde(default = "empty_object")]
    pub regular_config: Value,
    #[serde(default)]
    pub tool_ids: Vec<String>,
    #[serde(default)]
    pub mcp_server_ids: Vec<String>,
    #[serde(default)]
    pub mcp_server_urls: Vec<String>,
    #[serde(default)]
    pub flow_ids: Vec<String>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            app_id: String::default(),
            knowledge_config: empty_object(),
            model_config: empty_object(),
            regular_config: empty_object(),
            tool_ids: Vec::new(),
            mcp_server_ids: Vec::new(),
            mcp_server_urls: Vec::new(),
            flow_ids: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Unknown(e.into()))
    }

    pub fn from_json(value: &str) -> Result<Self> {
        serde_json::from_str(value).map_err(|e| Error::Unknown(e.into()))
    }
}

/// A stored row of the `bot_config` table.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfigRecord {
    /// Internal auto-increment identifier.
    pub id: i64,
    pub bot_id: String,
    pub version: Version,
    pub publish_status: PublishStatus,
    /// Live configuration for the draft, the frozen copy for a snapshot.
    pub config: BotConfig,
    /// Configuration captured when the record was published.
    pub publish_data: Option<BotConfig>,
}

impl BotConfigRecord {
    pub fn is_draft(&self) -> bool {
        self.version.is_draft()
    }

    pub fn is_published(&self) -> bool {
        !self.publish_status.is_empty()
    }
}

/// Record about to be inserted; the engine assigns the `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub bot_id: String,
    pub version: Version,
    pub publish_status: PublishStatus,
    pub config: BotConfig,
    pub publish_data: Option<BotConfig>,
}

impl NewRecord {
    pub fn draft(bot_id: impl Into<String>, config: BotConfig) -> Self {
        Self {
            bot_id: bot_id.into(),
            version: Version::Draft,
            publish_status: PublishStatus::empty(),
            config,
            publish_data: None,
        }
    }

    /// Snapshot of `draft` published to `target` under `version`.
    pub fn snapshot(draft: &BotConfigRecord, version: Version, target: PublishTarget) -> Self {
        Self {
            bot_id: draft.bot_id.to_owned(),
            version,
            publish_status: target.into(),
            config: draft.config.clone(),
            publish_data: Some(draft.config.clone()),
        }
    }

    pub fn into_record(self, id: i64) -> BotConfigRecord {
        BotConfigRecord {
            id,
            bot_id: self.bot_id,
            version: self.version,
            publish_status: self.publish_status,
            config: self.config,
            publish_data: self.publish_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rejects_undefined_bits() {
        assert!(PublishStatus::from_bits(2).is_err());
        assert!(PublishStatus::from_bits(-1).is_err());
        assert!(PublishStatus::from_bits(32).is_err());

        let status = PublishStatus::from_bits(21).unwrap();
        assert_eq!(
            status.iter().collect::<Vec<_>>(),
            PublishTarget::ALL.to_vec()
        );
    }

    #[test]
    fn status_toggle() {
        let status = PublishStatus::from(PublishTarget::Xingchen);
        let published = status.with(PublishTarget::Kaifang, StatusOp::Set);

        assert_eq!(published.bits(), 5);
        assert_eq!(published.to_string(), "XINGCHEN|KAIFANG");
        assert_eq!(
            published.with(PublishTarget::Kaifang, StatusOp::Clear),
            status
        );
        assert_eq!(status.with(PublishTarget::Aiui, StatusOp::Clear), status);
    }

    #[test]
    fn target_string_forms() {
        assert_eq!(PublishTarget::Aiui.to_string(), "AIUI");
        assert_eq!(
            "KAIFANG".parse::<PublishTarget>().unwrap(),
            PublishTarget::Kaifang
        );
        assert_eq!(PublishTarget::from_bit(4).unwrap(), PublishTarget::Kaifang);
        assert!(PublishTarget::from_bit(2).is_err());
        assert_eq!("clear".parse::<StatusOp>().unwrap(), StatusOp::Clear);
    }

    #[test]
    fn version_encoding() {
        assert_eq!(Version::from("-1"), Version::Draft);
        assert_eq!(Version::Draft.as_str(), "-1");
        assert_eq!(
            Version::from("v1.0"),
            Version::Published("v1.0".to_owned())
        );
        assert_eq!(Version::published("-1"), Version::Draft);
        assert_eq!(Version::published("v1.0").as_str(), "v1.0");
    }

    #[test]
    fn config_json_defaults() {
        let config = BotConfig::from_json(r#"{"app_id":"app"}"#).unwrap();

        assert_eq!(config, BotConfig::new("app"));
        assert_eq!(BotConfig::from_json(&config.to_json().unwrap()).unwrap(), config);
    }
}
