//! Versioning and publish-state store for bot configurations.
//!
//! Every bot is identified by a stable `bot_id`. Its live configuration is the
//! draft, stored under the reserved version `"-1"`; publishing the draft to a
//! target freezes a copy of it into a new, immutable record with its own
//! version string. Each record tracks the targets it is published to as a
//! [`PublishStatus`].
//!
//! # Features
//!
//! - **`memory`** (default) - In-process [`Memory`] engine
//!
//! SQL engines live in the `bot-config-sql` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use bot_config::{ConfigStore, Memory, PublishTarget, StatusOp};
//!
//! let store: ConfigStore = Memory::new().into();
//!
//! store.create_draft("bot1").await?;
//! store.publish_snapshot("bot1", "v1.0", PublishTarget::Xingchen).await?;
//! store
//!     .update_publish_status("bot1", "v1.0", PublishTarget::Kaifang, StatusOp::Set)
//!     .await?;
//! ```

#![forbid(unsafe_code)]

pub mod config;
mod engine;
mod error;
mod record;
mod store;

pub use config::{ConfigBuilder, StoreConfig};
pub use engine::*;
pub use error::*;
pub use record::*;
pub use store::*;
